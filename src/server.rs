use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context};
use axum::{extract::FromRef, Router};
use axum_extra::extract::cookie::Key;
use tracing::{info, warn};

use crate::{
    authentication::domain::credentials::DemoAccount,
    ledger::services::LedgerService,
    repos::{DynDataProvider, InMemoryStore},
};

/// Display name of the demo account.
pub const DEMO_USER_NAME: &str = "Demo User";

pub struct Options {
    pub bind_address: SocketAddr,
    pub data_file: Option<PathBuf>,

    pub demo_email: String,
    pub demo_password: String,

    pub secret_key: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    cookie_key: Key,
    demo_account: DemoAccount,
    ledger_service: LedgerService,
}

impl AppState {
    pub fn new(ledger_service: LedgerService, demo_account: DemoAccount, cookie_key: Key) -> Self {
        Self {
            cookie_key,
            demo_account,
            ledger_service,
        }
    }

    pub fn with_ledger_service(self, ledger_service: LedgerService) -> Self {
        Self {
            ledger_service,
            ..self
        }
    }
}

/// Build the data provider, from a fixture file if one is given.
pub fn data_provider(data_file: Option<&PathBuf>) -> anyhow::Result<DynDataProvider> {
    match data_file {
        Some(path) => Ok(Arc::new(InMemoryStore::from_json_file(path)?)),
        None => {
            info!("No data file provided. Serving seeded demo data.");

            Ok(Arc::new(InMemoryStore::seeded()))
        }
    }
}

/// Derive the key used to encrypt session cookies.
///
/// A missing secret produces a random key, so sessions do not survive a
/// restart.
pub fn cookie_key(secret_key: Option<&str>) -> anyhow::Result<Key> {
    match secret_key {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|_| anyhow!("The secret key must be at least 64 bytes long.")),
        None => {
            warn!("No secret key provided. Sessions will not persist across restarts.");

            Ok(Key::generate())
        }
    }
}

/// Assemble the full application around its state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", crate::ledger::http::routes())
        .nest("/authentication", crate::authentication::http::routes())
        .layer(crate::cors::layer())
        .with_state(state)
}

pub async fn serve(opts: Options) -> anyhow::Result<()> {
    let ledger_service = LedgerService::new(data_provider(opts.data_file.as_ref())?);
    let demo_account = DemoAccount::new(&opts.demo_email, DEMO_USER_NAME, &opts.demo_password)?;
    let cookie_key = cookie_key(opts.secret_key.as_deref())?;

    let state = AppState::new(ledger_service, demo_account, cookie_key);

    info!(bind_address = %opts.bind_address, "Starting server.");

    axum::Server::try_bind(&opts.bind_address)
        .with_context(|| format!("Failed to bind to {}.", opts.bind_address))?
        .serve(app(state).into_make_service())
        .await?;

    Ok(())
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for DemoAccount {
    fn from_ref(state: &AppState) -> Self {
        state.demo_account.clone()
    }
}

impl FromRef<AppState> for LedgerService {
    fn from_ref(state: &AppState) -> Self {
        state.ledger_service.clone()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use chrono::{TimeZone, Utc};

    use super::*;

    /// State serving the seeded records as of 2025-03-10, with the default
    /// demo login.
    pub(crate) fn test_state() -> AppState {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        AppState::new(
            LedgerService::new(Arc::new(InMemoryStore::seeded_at(now))),
            DemoAccount::new("demo@example.com", DEMO_USER_NAME, "password")
                .expect("demo account should be created"),
            Key::generate(),
        )
    }

    #[test]
    fn cookie_key_requires_64_bytes() {
        assert!(
            cookie_key(Some("too short")).is_err(),
            "short secrets should be rejected"
        );
        assert!(
            cookie_key(Some(&"k".repeat(64))).is_ok(),
            "64 byte secrets should be accepted"
        );
    }

    #[test]
    fn cookie_key_generates_when_missing() {
        assert!(cookie_key(None).is_ok(), "a random key should be generated");
    }

    #[test]
    fn data_provider_missing_file_errors() {
        let path = PathBuf::from("/nonexistent/fixture.json");

        assert!(data_provider(Some(&path)).is_err());
    }
}
