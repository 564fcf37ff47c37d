use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, warn};

use super::{ApiPrefixes, InboundInterceptor};
use crate::client::request::strip_query;
use crate::client::{ApiResponse, OutboundRequest};
use crate::navigation::{Location, Navigator, RouteName};
use crate::session::Session;

/// On 401, revoke the session and send the user to the login view.
///
/// A 401 from the login endpoint itself is left to the login caller, so a
/// rejected password is reported as such instead of as an expired session.
pub struct UnauthorizedHandler {
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    prefixes: ApiPrefixes,
}

impl UnauthorizedHandler {
    pub fn new(
        session: Arc<Session>,
        navigator: Arc<dyn Navigator>,
        login_path: &str,
        prefixes: ApiPrefixes,
    ) -> Self {
        let login_path = prefixes.rewrite(strip_query(login_path)).into_owned();
        UnauthorizedHandler {
            session,
            navigator,
            login_path,
            prefixes,
        }
    }

    fn is_login_request(&self, request: &OutboundRequest) -> bool {
        let path = self.prefixes.rewrite(request.route_path());
        path.trim_end_matches('/') == self.login_path.trim_end_matches('/')
    }
}

impl InboundInterceptor for UnauthorizedHandler {
    fn get_name(&self) -> &str {
        "unauthorized-handler"
    }

    fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn on_failure(&self, request: &OutboundRequest, _response: &ApiResponse) {
        if self.is_login_request(request) {
            debug!("401 from the login endpoint is left to the caller");
            return;
        }

        warn!(
            event_name = "session.revoked",
            event_domain = "session",
            method = %request.method,
            path = request.route_path(),
            "request was unauthorized, clearing session"
        );
        self.session.clear();

        if self.navigator.current_route() != Some(RouteName::Login) {
            self.navigator.request(Location::named(RouteName::Login));
        }
    }
}
