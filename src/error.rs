//! Error types shared across the session, client and navigation layers.

use http::StatusCode;

/// Failures of the durable key/value storage backends.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of a single API call made through the interceptor pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// No response was received at all.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}{}", describe_detail(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    /// A 2xx response whose body did not match the expected shape.
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn describe_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl ApiError {
    /// The HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the session store operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The login attempt was rejected; the message is shown to the user verbatim.
    #[error("{0}")]
    LoginFailed(String),
    #[error("no active session")]
    NotAuthenticated,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures of the router itself. Guard failures never surface here, they
/// become redirects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(String),
    #[error("route '{route}' requires parameter '{param}'")]
    MissingParam { route: String, param: String },
    #[error("too many redirects while navigating to '{0}'")]
    RedirectLoop(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_detail_when_present() {
        let err = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            detail: Some("Not enough permissions".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 403 Forbidden: Not enough permissions"
        );
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn status_error_without_detail() {
        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            detail: None,
        };
        assert_eq!(err.to_string(), "request failed with status 502 Bad Gateway");
    }

    #[test]
    fn login_failure_message_is_verbatim() {
        let err = SessionError::LoginFailed("Incorrect username or password".to_string());
        assert_eq!(err.to_string(), "Incorrect username or password");
    }
}
