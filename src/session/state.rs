use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::error::{SessionError, StorageError};
use crate::models::UserRecord;
use crate::storage::Storage;

/// Storage key of the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the JSON-encoded user record.
pub const USER_KEY: &str = "user";

/// Where the session stands, derived from which fields are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    /// A token is held but the profile has not been confirmed yet.
    AuthenticatedPendingProfile,
    AuthenticatedResolved,
}

/// A point-in-time copy of the session fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserRecord>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserRecord::is_admin)
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.token, &self.user) {
            (None, _) => SessionPhase::Unauthenticated,
            (Some(_), None) => SessionPhase::AuthenticatedPendingProfile,
            (Some(_), Some(_)) => SessionPhase::AuthenticatedResolved,
        }
    }
}

/// The authentication state of one console, mirrored to durable storage.
///
/// Invariant: `user` is never set while `token` is not. Every mutation
/// happens inside one write-lock section and never across an await point.
pub struct Session {
    state: RwLock<SessionSnapshot>,
    storage: Arc<dyn Storage>,
}

impl Session {
    /// Build a session from whatever the storage already holds.
    ///
    /// A stored user without a token is dropped, as is a user record that no
    /// longer decodes; in the latter case the token is kept and the profile
    /// will be fetched again.
    pub fn hydrate(storage: Arc<dyn Storage>) -> Self {
        let token = match storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Could not read stored token, starting logged out: {}", e);
                None
            }
        };

        let user = match storage.get_item(USER_KEY) {
            Ok(Some(raw)) if token.is_some() => match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Discarding malformed stored user record: {}", e);
                    Self::forget(storage.as_ref(), USER_KEY);
                    None
                }
            },
            Ok(Some(_)) => {
                warn!("Discarding stored user record that has no token");
                Self::forget(storage.as_ref(), USER_KEY);
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read stored user record: {}", e);
                None
            }
        };

        let snapshot = SessionSnapshot { token, user };
        info!(
            event_name = "session.hydrated",
            event_domain = "session",
            phase = ?snapshot.phase(),
            durable = storage.is_durable(),
            "session hydrated from storage"
        );
        Session {
            state: RwLock::new(snapshot),
            storage,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot().is_admin()
    }

    pub fn phase(&self) -> SessionPhase {
        self.snapshot().phase()
    }

    /// Install a freshly issued token and its user.
    ///
    /// Storage is written first; if that fails, whatever was written is
    /// rolled back and the in-memory state is left exactly as it was.
    pub(crate) fn establish(&self, token: String, user: UserRecord) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(&user).map_err(StorageError::from)?;
        let mut state = self.write();

        if let Err(e) = self.persist_pair(&token, &encoded) {
            self.restore_stored(&state);
            return Err(e.into());
        }

        state.token = Some(token);
        state.user = Some(user);
        debug!("Session established for '{}'", state.user.as_ref().map_or("", |u| u.identity()));
        Ok(())
    }

    /// Replace the profile of the session that issued `for_token`.
    ///
    /// Returns `Ok(false)` without touching anything when the session moved
    /// on to another token while the profile was being fetched.
    pub(crate) fn replace_user(&self, for_token: &str, user: UserRecord) -> Result<bool, SessionError> {
        let mut state = self.write();
        match state.token.as_deref() {
            None => return Err(SessionError::NotAuthenticated),
            Some(current) if current != for_token => {
                debug!("Ignoring profile fetched for a superseded token");
                return Ok(false);
            }
            Some(_) => {}
        }

        let encoded = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.storage.set_item(USER_KEY, &encoded)?;
        state.user = Some(user);
        Ok(true)
    }

    /// Drop token and user from memory and storage. Safe to call repeatedly.
    pub fn clear(&self) {
        let mut state = self.write();
        let was_authenticated = state.token.is_some();
        state.token = None;
        state.user = None;
        Self::forget(self.storage.as_ref(), TOKEN_KEY);
        Self::forget(self.storage.as_ref(), USER_KEY);
        if was_authenticated {
            info!(
                event_name = "session.cleared",
                event_domain = "session",
                "session cleared"
            );
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist_pair(&self, token: &str, encoded_user: &str) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, token)?;
        self.storage.set_item(USER_KEY, encoded_user)?;
        Ok(())
    }

    /// Put storage back in line with `state` after a failed write.
    fn restore_stored(&self, state: &SessionSnapshot) {
        match &state.token {
            Some(token) => {
                if let Err(e) = self.storage.set_item(TOKEN_KEY, token) {
                    warn!("Could not restore stored token: {}", e);
                }
            }
            None => Self::forget(self.storage.as_ref(), TOKEN_KEY),
        }
        match state.user.as_ref().map(serde_json::to_string) {
            Some(Ok(encoded)) => {
                if let Err(e) = self.storage.set_item(USER_KEY, &encoded) {
                    warn!("Could not restore stored user record: {}", e);
                }
            }
            _ => Self::forget(self.storage.as_ref(), USER_KEY),
        }
    }

    fn forget(storage: &dyn Storage, key: &str) {
        if let Err(e) = storage.remove_item(key) {
            warn!("Could not remove '{}' from storage: {}", key, e);
        }
    }
}
