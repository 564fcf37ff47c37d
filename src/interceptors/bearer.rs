use std::sync::Arc;

use http::{HeaderValue, header};
use tracing::warn;

use super::OutboundInterceptor;
use crate::client::OutboundRequest;
use crate::session::Session;

/// Attaches the session's token as `Authorization: Bearer <token>`.
pub struct BearerAuth {
    session: Arc<Session>,
}

impl BearerAuth {
    pub fn new(session: Arc<Session>) -> Self {
        BearerAuth { session }
    }
}

impl OutboundInterceptor for BearerAuth {
    fn get_name(&self) -> &str {
        "bearer-auth"
    }

    fn apply(&self, request: &mut OutboundRequest) {
        let Some(token) = self.session.token() else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(header::AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored token is not a valid header value; sending request without it"),
        }
    }
}
