use serde::{Deserialize, Serialize};

use super::user::UserRecord;

/// Body returned by the login endpoint.
///
/// Every field is optional on the wire: a 2xx answer without a token or user
/// is a failed login, not a decoding error.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

/// What a successful `login` hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub success: bool,
    pub user: UserRecord,
}
