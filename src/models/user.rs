use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The profile of the logged-in user, as served by the profile endpoint.
///
/// Only `username` is required. Fields this crate does not interpret are kept
/// in `extra` so the record survives a trip through durable storage unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Construct a record for `username` with no other fields set.
    pub fn new(username: impl Into<String>) -> Self {
        UserRecord {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }

    pub fn identity(&self) -> &str {
        &self.username
    }

    /// Only an explicit `true` grants admin; missing or null means no.
    pub fn is_admin(&self) -> bool {
        self.is_admin == Some(true)
    }
}
