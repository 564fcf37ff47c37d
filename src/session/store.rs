use std::sync::Arc;

use tracing::{info, warn};

use super::state::{Session, SessionPhase, SessionSnapshot};
use crate::client::{ApiClient, OutboundRequest};
use crate::config::ApiConfig;
use crate::error::{ApiError, SessionError};
use crate::models::{LoginOutcome, LoginResponse, UserRecord};

const GENERIC_LOGIN_FAILURE: &str = "login failed";
const MISSING_TOKEN_FAILURE: &str = "login failed: no access token received";
const MISSING_USER_FAILURE: &str = "login failed: no user record received";

/// Login, profile refresh and logout on top of a shared [`Session`].
pub struct SessionStore {
    session: Arc<Session>,
    client: ApiClient,
    login_path: String,
    profile_path: String,
}

impl SessionStore {
    pub fn new(session: Arc<Session>, client: ApiClient, api: &ApiConfig) -> Self {
        SessionStore {
            session,
            client,
            login_path: api.login_path(),
            profile_path: api.profile_path(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Exchange credentials for a token and user record.
    ///
    /// On failure the session is left exactly as it was and the error carries
    /// the server's `detail` when there is one, a generic message when there
    /// is a response without one, and the transport error otherwise.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let request = OutboundRequest::post(&self.login_path)
            .with_form([("username", username), ("password", password)]);

        let body: LoginResponse = match self.client.send(request).await.and_then(|r| r.json()) {
            Ok(body) => body,
            Err(e) => {
                let message = login_failure_message(&e);
                warn!(
                    event_name = "session.login.failed",
                    event_domain = "session",
                    username,
                    reason = message.as_str(),
                    "login rejected"
                );
                return Err(SessionError::LoginFailed(message));
            }
        };

        let Some(token) = body.access_token.filter(|t| !t.is_empty()) else {
            warn!("Login response for '{}' carried no access token", username);
            return Err(SessionError::LoginFailed(MISSING_TOKEN_FAILURE.to_string()));
        };
        let Some(user) = body.user else {
            warn!("Login response for '{}' carried no user record", username);
            return Err(SessionError::LoginFailed(MISSING_USER_FAILURE.to_string()));
        };

        self.session.establish(token, user.clone())?;
        info!(
            event_name = "session.login.succeeded",
            event_domain = "session",
            username = user.identity(),
            is_admin = user.is_admin(),
            "user logged in"
        );
        Ok(LoginOutcome {
            success: true,
            user,
        })
    }

    /// Resolve the profile behind the current token.
    ///
    /// Any failure revokes the session before the error is returned.
    pub async fn fetch_current_user(&self) -> Result<UserRecord, SessionError> {
        let Some(token) = self.session.token() else {
            self.logout();
            return Err(SessionError::NotAuthenticated);
        };

        let user = match self.client.get_json::<UserRecord>(&self.profile_path).await {
            Ok(user) => user,
            Err(e) => {
                warn!(
                    event_name = "session.profile.failed",
                    event_domain = "session",
                    error = %e,
                    "profile fetch failed, logging out"
                );
                self.logout();
                return Err(e.into());
            }
        };

        match self.session.replace_user(&token, user.clone()) {
            Ok(_) => Ok(user),
            Err(e) => {
                warn!("Could not store fetched profile, logging out: {}", e);
                self.logout();
                Err(e)
            }
        }
    }

    /// Clear the session. Safe to call when already logged out.
    pub fn logout(&self) {
        self.session.clear();
    }
}

fn login_failure_message(error: &ApiError) -> String {
    match error {
        ApiError::Status {
            detail: Some(detail),
            ..
        } => detail.clone(),
        ApiError::Transport(message) => message.clone(),
        _ => GENERIC_LOGIN_FAILURE.to_string(),
    }
}
