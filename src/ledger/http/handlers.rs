use std::str::FromStr;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    http_err::{ApiError, ApiResponse, Envelope},
    ledger::{
        domain::{
            reports::Timeframe,
            transactions::{TransactionFilter, TransactionKind},
        },
        services::LedgerService,
    },
    server::AppState,
};

use super::reps;

pub const INVALID_ENDPOINT_MESSAGE: &str = "Invalid endpoint specified";
pub const INVALID_TIMEFRAME_MESSAGE: &str = "Invalid timeframe specified";
pub const INVALID_TRANSACTION_TYPE_MESSAGE: &str = "Invalid transaction type specified";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/revolut", get(get_records))
        .route("/summary", get(get_summary))
        .route("/analytics", get(get_analytics))
}

/// The collections that the records endpoint can serve.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endpoint {
    Accounts,
    Transactions,
    Dashboard,
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unknown endpoint: {0:?}")]
pub struct EndpointParseError(String);

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accounts" => Ok(Self::Accounts),
            "transactions" => Ok(Self::Transactions),
            "dashboard" => Ok(Self::Dashboard),
            other => Err(EndpointParseError(other.to_owned())),
        }
    }
}

#[derive(Deserialize)]
struct GetRecordsParams {
    endpoint: Option<String>,
    #[serde(rename = "accountId")]
    account_id: Option<String>,
    search: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    category: Option<String>,
}

impl GetRecordsParams {
    fn transaction_filter(&self) -> Result<TransactionFilter, ApiError> {
        let kind = match non_empty(&self.kind) {
            None => None,
            Some(raw) => Some(raw.parse::<TransactionKind>().map_err(|_| {
                ApiError::BadRequestReason(INVALID_TRANSACTION_TYPE_MESSAGE.to_owned())
            })?),
        };

        Ok(TransactionFilter {
            account_id: non_empty(&self.account_id).map(String::from),
            search: non_empty(&self.search).map(String::from),
            kind,
            category: non_empty(&self.category).map(String::from),
        })
    }
}

/// Treat blank query parameters the same as missing ones.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

pub enum GetRecordsResponse {
    Accounts(Vec<reps::Account>),
    Transactions(Vec<reps::Transaction>),
    Dashboard(reps::DashboardRecords),
}

impl IntoResponse for GetRecordsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accounts(accounts) => Envelope::ok(accounts).into_response(),
            Self::Transactions(transactions) => Envelope::ok(transactions).into_response(),
            Self::Dashboard(records) => Envelope::ok(records).into_response(),
        }
    }
}

async fn get_records(
    State(ledger_service): State<LedgerService>,
    params: Result<Query<GetRecordsParams>, QueryRejection>,
) -> ApiResponse<GetRecordsResponse> {
    let Query(params) = params.map_err(|rejection| {
        debug!(%rejection, "Rejected malformed records query.");

        ApiError::BadRequestReason(INVALID_ENDPOINT_MESSAGE.to_owned())
    })?;

    let endpoint = match params.endpoint.as_deref().map(Endpoint::from_str) {
        Some(Ok(endpoint)) => endpoint,
        _ => {
            debug!(endpoint = ?params.endpoint, "Rejected request for unknown endpoint.");

            return Err(ApiError::BadRequestReason(
                INVALID_ENDPOINT_MESSAGE.to_owned(),
            ));
        }
    };

    debug!(?endpoint, "Serving records.");

    match endpoint {
        Endpoint::Accounts => match ledger_service.list_accounts().await {
            Ok(accounts) => Ok(GetRecordsResponse::Accounts(
                accounts.iter().map(reps::Account::from).collect(),
            )),
            Err(error) => {
                error!(?error, "Failed to list accounts.");

                Err(ApiError::InternalServerError)
            }
        },
        Endpoint::Transactions => {
            let filter = params.transaction_filter()?;

            match ledger_service.list_transactions(filter).await {
                Ok(transactions) => Ok(GetRecordsResponse::Transactions(
                    transactions.iter().map(reps::Transaction::from).collect(),
                )),
                Err(error) => {
                    error!(?error, "Failed to list transactions.");

                    Err(ApiError::InternalServerError)
                }
            }
        }
        Endpoint::Dashboard => match ledger_service.dashboard_records().await {
            Ok((accounts, transactions)) => {
                Ok(GetRecordsResponse::Dashboard(reps::DashboardRecords {
                    accounts: accounts.iter().map(reps::Account::from).collect(),
                    transactions: transactions.iter().map(reps::Transaction::from).collect(),
                }))
            }
            Err(error) => {
                error!(?error, "Failed to list dashboard records.");

                Err(ApiError::InternalServerError)
            }
        },
    }
}

async fn get_summary(
    State(ledger_service): State<LedgerService>,
) -> ApiResponse<Envelope<reps::DashboardSummary>> {
    match ledger_service.dashboard_summary().await {
        Ok(summary) => Ok(Envelope::ok((&summary).into())),
        Err(error) => {
            error!(?error, "Failed to build dashboard summary.");

            Err(ApiError::InternalServerError)
        }
    }
}

#[derive(Deserialize)]
struct GetAnalyticsParams {
    timeframe: Option<String>,
}

async fn get_analytics(
    State(ledger_service): State<LedgerService>,
    params: Result<Query<GetAnalyticsParams>, QueryRejection>,
) -> ApiResponse<Envelope<reps::AnalyticsReport>> {
    let Query(params) = params.map_err(|rejection| {
        debug!(%rejection, "Rejected malformed analytics query.");

        ApiError::BadRequestReason(INVALID_TIMEFRAME_MESSAGE.to_owned())
    })?;

    let timeframe = match non_empty(&params.timeframe) {
        None => Timeframe::default(),
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::BadRequestReason(INVALID_TIMEFRAME_MESSAGE.to_owned())
        })?,
    };

    debug!(?timeframe, "Generating spending analytics.");

    match ledger_service.analytics(timeframe).await {
        Ok(report) => Ok(Envelope::ok((&report).into())),
        Err(error) => {
            error!(?error, ?timeframe, "Failed to build analytics report.");

            Err(ApiError::InternalServerError)
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        ledger::domain::{
            accounts::Account, currency::CurrencyAmount, reports::Period,
            transactions::Transaction,
        },
        repos::DataProvider,
        server::{self, test::test_state},
    };

    async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = server::app(state)
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes).expect("body should be JSON");

        (status, body)
    }

    #[test]
    fn endpoint_parse_is_exact() {
        assert_eq!(Ok(Endpoint::Dashboard), "dashboard".parse());
        assert!("Dashboard".parse::<Endpoint>().is_err());
        assert!(" accounts".parse::<Endpoint>().is_err());
        assert!("".parse::<Endpoint>().is_err());
    }

    #[tokio::test]
    async fn get_accounts() {
        let (status, body) = get(test_state(), "/api/revolut?endpoint=accounts").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!(true), body["success"]);
        assert_eq!(4, body["data"].as_array().expect("data should be a list").len());
        assert_eq!(json!("acc_1"), body["data"][0]["id"]);
        assert_eq!(json!("checking"), body["data"][0]["type"]);
        assert_eq!(json!("2547.83"), body["data"][0]["balance"]);
        assert_eq!(json!("$2,547.83"), body["data"][0]["formattedBalance"]);
    }

    #[tokio::test]
    async fn get_transactions_for_account() {
        let (status, body) = get(
            test_state(),
            "/api/revolut?endpoint=transactions&accountId=acc_2",
        )
        .await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(
            json!(["tx_8"]),
            json!(body["data"]
                .as_array()
                .expect("data should be a list")
                .iter()
                .map(|t| t["id"].clone())
                .collect::<Vec<_>>())
        );
        assert_eq!(json!("transfer"), body["data"][0]["type"]);
    }

    #[tokio::test]
    async fn get_transactions_account_filter_is_case_sensitive() {
        let (status, body) = get(
            test_state(),
            "/api/revolut?endpoint=transactions&accountId=ACC_2",
        )
        .await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!([]), body["data"]);
    }

    #[tokio::test]
    async fn get_transactions_blank_account_returns_all() {
        let (_, body) = get(test_state(), "/api/revolut?endpoint=transactions&accountId=").await;

        assert_eq!(8, body["data"].as_array().expect("data should be a list").len());
    }

    #[tokio::test]
    async fn get_transactions_search_and_type() {
        let (_, body) = get(
            test_state(),
            "/api/revolut?endpoint=transactions&search=netflix&type=expense",
        )
        .await;

        assert_eq!(1, body["data"].as_array().expect("data should be a list").len());
        assert_eq!(json!("tx_5"), body["data"][0]["id"]);
        assert_eq!(json!({"name": "Netflix"}), body["data"][0]["merchant"]);
        assert_eq!(json!("Netflix"), body["data"][0]["displayName"]);
        assert_eq!(json!("Mar 09, 2025"), body["data"][0]["formattedDate"]);
        assert_eq!(json!("-$9.99"), body["data"][0]["formattedAmount"]);
    }

    #[tokio::test]
    async fn get_transactions_invalid_type() {
        let (status, body) =
            get(test_state(), "/api/revolut?endpoint=transactions&type=refund").await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(
            json!({"success": false, "error": INVALID_TRANSACTION_TYPE_MESSAGE}),
            body
        );
    }

    #[tokio::test]
    async fn get_dashboard_records() {
        let (status, body) = get(test_state(), "/api/revolut?endpoint=dashboard").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(4, body["data"]["accounts"].as_array().map(Vec::len).unwrap_or(0));
        assert_eq!(8, body["data"]["transactions"].as_array().map(Vec::len).unwrap_or(0));
    }

    #[tokio::test]
    async fn unknown_endpoints_are_rejected() {
        for uri in [
            "/api/revolut",
            "/api/revolut?endpoint=",
            "/api/revolut?endpoint=account",
            "/api/revolut?endpoint=ACCOUNTS",
            "/api/revolut?endpoint=summary",
            "/api/revolut?endpoint=accounts&endpoint=bogus",
            "/api/revolut?endpoint=accounts&endpoint=accounts",
        ] {
            let (status, body) = get(test_state(), uri).await;

            assert_eq!(StatusCode::BAD_REQUEST, status, "{}", uri);
            assert_eq!(
                json!({"success": false, "error": "Invalid endpoint specified"}),
                body,
                "{}",
                uri
            );
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl DataProvider for BrokenProvider {
        async fn list_accounts(&self) -> anyhow::Result<Vec<Account>> {
            Err(anyhow::anyhow!("provider unavailable"))
        }

        async fn list_transactions(
            &self,
            _filter: TransactionFilter,
        ) -> anyhow::Result<Vec<Transaction>> {
            Err(anyhow::anyhow!("provider unavailable"))
        }

        async fn balance_snapshot(
            &self,
            _period: Period,
        ) -> anyhow::Result<Option<CurrencyAmount>> {
            Err(anyhow::anyhow!("provider unavailable"))
        }
    }

    #[tokio::test]
    async fn provider_failures_are_internal_errors() {
        let state = test_state().with_ledger_service(LedgerService::new(Arc::new(BrokenProvider)));

        for uri in [
            "/api/revolut?endpoint=accounts",
            "/api/revolut?endpoint=transactions",
            "/api/revolut?endpoint=dashboard",
            "/api/summary",
            "/api/analytics",
        ] {
            let (status, body) = get(state.clone(), uri).await;

            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status, "{}", uri);
            assert_eq!(
                json!({"success": false, "error": "Internal server error"}),
                body,
                "{}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn get_summary_seeded() {
        let (status, body) = get(test_state(), "/api/summary").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("26168.81"), body["data"]["totalBalance"]["value"]);
        assert_eq!(json!("$26,168.81"), body["data"]["totalBalance"]["formatted"]);
        assert_eq!(json!("766.61"), body["data"]["totalSpending"]["value"]);
        assert_eq!(json!("500.00"), body["data"]["balanceChange"]["amount"]["value"]);
        assert_eq!(json!("month"), body["data"]["balanceChange"]["period"]);
        assert_eq!(json!(1), body["data"]["pendingCount"]);
        assert_eq!(json!("Debt"), body["data"]["categories"][0]["category"]);
        assert_eq!(
            5,
            body["data"]["recentTransactions"]
                .as_array()
                .map(Vec::len)
                .unwrap_or(0)
        );
    }

    #[tokio::test]
    async fn get_analytics_year() {
        let (status, body) = get(test_state(), "/api/analytics?timeframe=year").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("year"), body["data"]["timeframe"]);
        assert_eq!(json!("2025-03"), body["data"]["spendingOverTime"][0]["key"]);
        assert_eq!(
            json!("766.61"),
            body["data"]["spendingOverTime"][0]["amount"]["value"]
        );
        assert_eq!(json!("on_track"), body["data"]["insights"]["savings"]);
        assert_eq!(
            json!("Debt"),
            body["data"]["insights"]["topCategory"]["category"]
        );
    }

    #[tokio::test]
    async fn get_analytics_defaults_to_month() {
        let (_, body) = get(test_state(), "/api/analytics").await;

        assert_eq!(json!("month"), body["data"]["timeframe"]);
        assert_eq!(
            6,
            body["data"]["spendingOverTime"]
                .as_array()
                .map(Vec::len)
                .unwrap_or(0)
        );
    }

    #[tokio::test]
    async fn get_analytics_invalid_timeframe() {
        for uri in [
            "/api/analytics?timeframe=decade",
            "/api/analytics?timeframe=year&timeframe=week",
        ] {
            let (status, body) = get(test_state(), uri).await;

            assert_eq!(StatusCode::BAD_REQUEST, status, "{}", uri);
            assert_eq!(
                json!({"success": false, "error": "Invalid timeframe specified"}),
                body,
                "{}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn get_analytics_blank_timeframe_defaults_to_month() {
        let (status, body) = get(test_state(), "/api/analytics?timeframe=").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("month"), body["data"]["timeframe"]);
    }
}
