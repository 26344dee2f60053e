use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{cookie::Cookie, PrivateCookieJar};
use cookie::time::Duration;
use semval::prelude::*;
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    http_err::{ApiError, ApiResponse, Envelope},
    server::AppState,
};

use super::domain::{
    credentials::{Credentials, DemoAccount, EmailPasswordPair},
    session::{Session, SessionUser, SESSION_COOKIE},
};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cookie-sessions",
            post(create_cookie_session).delete(delete_cookie_session),
        )
        .route("/me", get(get_user_info))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        match session {
            Session::Anonymous => Self {
                authenticated: false,
                session_id: None,
                user: None,
            },
            Session::Authenticated { id, user } => Self {
                authenticated: true,
                session_id: Some(*id),
                user: Some(user.clone()),
            },
        }
    }
}

pub enum CreateSessionResponse {
    Created(PrivateCookieJar, SessionInfo),
}

impl IntoResponse for CreateSessionResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(cookie_jar, info) => {
                (StatusCode::CREATED, cookie_jar, Envelope::ok(info)).into_response()
            }
        }
    }
}

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .max_age(Duration::days(7))
        .finish()
}

async fn create_cookie_session(
    State(demo_account): State<DemoAccount>,
    cookies: PrivateCookieJar,
    pair: Result<Json<EmailPasswordPair>, JsonRejection>,
) -> ApiResponse<CreateSessionResponse> {
    let Json(pair) = pair.map_err(|rejection| {
        debug!(%rejection, "Rejected unreadable login body.");

        ApiError::BadRequestReason(INVALID_CREDENTIALS_MESSAGE.to_owned())
    })?;

    let credentials = match Credentials::validated_from(pair) {
        Ok(credentials) => credentials,
        Err((_, context)) => {
            let invalidities = context.into_iter().collect::<Vec<_>>();
            debug!(?invalidities, "Rejected malformed credentials.");

            return Err(ApiError::BadRequestReason(
                INVALID_CREDENTIALS_MESSAGE.to_owned(),
            ));
        }
    };

    match Session::login(&credentials, &demo_account) {
        Ok(session @ Session::Authenticated { .. }) => {
            let info = SessionInfo::from(&session);
            debug!(session_id = ?info.session_id, "Validated demo credentials.");

            let updated_cookies = cookies.add(session_cookie(session.serialized()?));

            Ok(CreateSessionResponse::Created(updated_cookies, info))
        }
        Ok(Session::Anonymous) => Err(ApiError::BadRequestReason(
            INVALID_CREDENTIALS_MESSAGE.to_owned(),
        )),
        Err(error) => {
            error!(?error, "Failed to compare password and hash.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn delete_cookie_session(
    session: Session,
    cookies: PrivateCookieJar,
) -> (StatusCode, PrivateCookieJar) {
    if let Session::Authenticated { id, .. } = &session {
        debug!(session_id = %id, "Ending cookie session.");
    }

    let session = session.logout();
    debug!(?session, "Cleared session cookie.");

    (
        StatusCode::NO_CONTENT,
        cookies.remove(session_cookie(String::new())),
    )
}

async fn get_user_info(session: Session) -> Envelope<SessionInfo> {
    Envelope::ok(SessionInfo::from(&session))
}
