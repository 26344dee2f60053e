use axum::{async_trait, extract::FromRef, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{cookie::Key, PrivateCookieJar};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{debug, warn};
use uuid::Uuid;

use super::credentials::{Credentials, DemoAccount};

/// Name of the private cookie holding the serialized session.
pub const SESSION_COOKIE: &str = "session";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
}

/// The login state of a client.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { id: Uuid, user: SessionUser },
}

impl Session {
    /// Attempt to log in as the demo account.
    ///
    /// # Returns
    ///
    /// A new [`Session::Authenticated`] if the credentials match the account,
    /// otherwise [`Session::Anonymous`]. An [`Err`] is only returned if the
    /// password comparison itself failed.
    pub fn login(credentials: &Credentials, account: &DemoAccount) -> anyhow::Result<Self> {
        if account.accepts(credentials)? {
            Ok(Self::Authenticated {
                id: Uuid::new_v4(),
                user: SessionUser {
                    email: account.email().to_owned(),
                    name: account.name().to_owned(),
                },
            })
        } else {
            Ok(Self::Anonymous)
        }
    }

    pub fn logout(self) -> Self {
        Self::Anonymous
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn serialized(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read the session stored in a cookie jar.
    ///
    /// A missing or malformed cookie is treated as an anonymous session.
    pub fn from_cookies(cookies: &PrivateCookieJar) -> Self {
        let Some(session_cookie) = cookies.get(SESSION_COOKIE) else {
            return Self::Anonymous;
        };

        match serde_json::from_str::<Session>(session_cookie.value()) {
            Ok(session @ Self::Authenticated { id, .. }) => {
                debug!(session_id = %id, "Parsed cookie session.");

                session
            }
            Ok(Self::Anonymous) => Self::Anonymous,
            Err(error) => {
                warn!(?error, "Received malformed session value.");

                Self::Anonymous
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;

        Ok(Self::from_cookies(&cookies))
    }
}

#[cfg(test)]
mod test {
    use axum_extra::extract::cookie::Cookie;

    use super::*;
    use crate::authentication::domain::credentials::test::credentials;

    fn demo_account() -> DemoAccount {
        DemoAccount::new("demo@example.com", "Demo User", "password")
            .expect("demo account should be created")
    }

    #[test]
    fn login_with_demo_credentials() {
        let session = Session::login(&credentials("demo@example.com", "password"), &demo_account())
            .expect("login should not error");

        match session {
            Session::Authenticated { user, .. } => assert_eq!(
                SessionUser {
                    email: "demo@example.com".to_owned(),
                    name: "Demo User".to_owned(),
                },
                user
            ),
            Session::Anonymous => panic!("demo credentials should authenticate"),
        }
    }

    #[test]
    fn login_with_wrong_password() {
        let session = Session::login(&credentials("demo@example.com", "hunter22"), &demo_account())
            .expect("login should not error");

        assert_eq!(Session::Anonymous, session);
    }

    #[test]
    fn logout_is_anonymous() {
        let session = Session::login(&credentials("demo@example.com", "password"), &demo_account())
            .expect("login should not error");
        assert!(session.is_authenticated());

        assert_eq!(Session::Anonymous, session.logout());
    }

    #[test]
    fn from_cookies_round_trips_session() {
        let session = Session::Authenticated {
            id: Uuid::new_v4(),
            user: SessionUser {
                email: "demo@example.com".to_owned(),
                name: "Demo User".to_owned(),
            },
        };
        let cookies = PrivateCookieJar::new(Key::generate()).add(Cookie::new(
            SESSION_COOKIE,
            session.serialized().expect("session should serialize"),
        ));

        assert_eq!(session, Session::from_cookies(&cookies));
    }

    #[test]
    fn from_cookies_malformed_is_anonymous() {
        let cookies =
            PrivateCookieJar::new(Key::generate()).add(Cookie::new(SESSION_COOKIE, "not json"));

        assert_eq!(Session::Anonymous, Session::from_cookies(&cookies));
    }

    #[test]
    fn from_cookies_missing_is_anonymous() {
        let cookies = PrivateCookieJar::new(Key::generate());

        assert_eq!(Session::Anonymous, Session::from_cookies(&cookies));
    }
}
