use std::sync::Arc;

use tracing::{debug, warn};

use super::location::Location;
use super::routes::{ResolvedRoute, RouteName};
use crate::session::{SessionPhase, SessionSnapshot, SessionStore};

/// What the guard needs to know about one attempted navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationIntent {
    pub target: ResolvedRoute,
    pub requires_auth: bool,
    pub requires_admin: bool,
    /// Where to go when authentication is missing or turns out invalid.
    pub fallback_redirect: Location,
}

impl NavigationIntent {
    pub fn for_route(target: ResolvedRoute) -> Self {
        NavigationIntent {
            requires_auth: target.meta.requires_auth,
            requires_admin: target.meta.requires_admin,
            fallback_redirect: Location::login_returning_to(&target.full_path),
            target,
        }
    }
}

/// The outcome of guarding one navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Location),
}

/// Result of judging a navigation against a session snapshot alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Decided(GuardDecision),
    /// A token is held but the profile is unknown; fetch it and evaluate again.
    NeedsProfile,
}

/// Judge `intent` against `snapshot` without any I/O.
pub fn evaluate(snapshot: &SessionSnapshot, intent: &NavigationIntent) -> Evaluation {
    if intent.requires_auth {
        match snapshot.phase() {
            SessionPhase::Unauthenticated => {
                return Evaluation::Decided(GuardDecision::Redirect(
                    intent.fallback_redirect.clone(),
                ));
            }
            SessionPhase::AuthenticatedPendingProfile => return Evaluation::NeedsProfile,
            SessionPhase::AuthenticatedResolved => {}
        }
    }

    // The dashboard is where non-admins are sent, so it must never bounce them.
    if intent.requires_admin
        && !snapshot.is_admin()
        && intent.target.name != RouteName::Dashboard
    {
        return Evaluation::Decided(GuardDecision::Redirect(Location::named(
            RouteName::Dashboard,
        )));
    }

    if intent.target.name == RouteName::Login && snapshot.is_authenticated() {
        return Evaluation::Decided(GuardDecision::Redirect(Location::named(
            RouteName::Dashboard,
        )));
    }

    Evaluation::Decided(GuardDecision::Proceed)
}

/// Decides every view transition from the session state, refreshing the
/// profile when only a token is known.
pub struct NavigationGuard {
    store: Arc<SessionStore>,
}

impl NavigationGuard {
    pub fn new(store: Arc<SessionStore>) -> Self {
        NavigationGuard { store }
    }

    /// Never fails: a profile that cannot be fetched becomes a redirect to
    /// login that remembers the intended path.
    pub async fn check(
        &self,
        intent: &NavigationIntent,
        current: Option<&ResolvedRoute>,
    ) -> GuardDecision {
        let decision = match evaluate(&self.store.snapshot(), intent) {
            Evaluation::Decided(decision) => decision,
            Evaluation::NeedsProfile => match self.store.fetch_current_user().await {
                Ok(_) => match evaluate(&self.store.snapshot(), intent) {
                    Evaluation::Decided(decision) => decision,
                    // The session changed under us while the profile was in flight.
                    Evaluation::NeedsProfile => {
                        GuardDecision::Redirect(intent.fallback_redirect.clone())
                    }
                },
                Err(e) => {
                    warn!(
                        event_name = "navigation.profile_unresolved",
                        event_domain = "navigation",
                        target = intent.target.full_path.as_str(),
                        error = %e,
                        "could not confirm session, redirecting to login"
                    );
                    GuardDecision::Redirect(intent.fallback_redirect.clone())
                }
            },
        };

        debug!(
            "Guard {} -> {}: {:?}",
            current.map_or("(start)", |route| route.full_path.as_str()),
            intent.target.full_path,
            decision
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRecord;
    use crate::navigation::RouteTable;

    fn intent(path: &str) -> NavigationIntent {
        NavigationIntent::for_route(RouteTable::admin_console().resolve(path).unwrap())
    }

    fn session(token: Option<&str>, user: Option<UserRecord>) -> SessionSnapshot {
        SessionSnapshot {
            token: token.map(str::to_string),
            user,
        }
    }

    fn redirect_to(name: RouteName) -> Evaluation {
        Evaluation::Decided(GuardDecision::Redirect(Location::named(name)))
    }

    #[test]
    fn unauthenticated_is_sent_to_login_with_intent() {
        let result = evaluate(&session(None, None), &intent("/devices/7?tab=sensors"));
        assert_eq!(
            result,
            Evaluation::Decided(GuardDecision::Redirect(Location::login_returning_to(
                "/devices/7?tab=sensors"
            )))
        );
    }

    #[test]
    fn token_without_profile_needs_profile() {
        let result = evaluate(&session(Some("tok"), None), &intent("/dashboard"));
        assert_eq!(result, Evaluation::NeedsProfile);
    }

    #[test]
    fn non_admin_is_sent_to_dashboard() {
        let operator = session(Some("tok"), Some(UserRecord::new("op")));
        assert_eq!(evaluate(&operator, &intent("/devices")), redirect_to(RouteName::Dashboard));
        assert_eq!(
            evaluate(&operator, &intent("/mqtt-config")),
            redirect_to(RouteName::Dashboard)
        );
    }

    #[test]
    fn non_admin_reaches_dashboard_without_loop() {
        let operator = session(Some("tok"), Some(UserRecord::new("op")));
        assert_eq!(
            evaluate(&operator, &intent("/dashboard")),
            Evaluation::Decided(GuardDecision::Proceed)
        );
        assert_eq!(
            evaluate(&operator, &intent("/realtime-data")),
            Evaluation::Decided(GuardDecision::Proceed)
        );
    }

    #[test]
    fn admin_proceeds_to_admin_routes() {
        let admin = session(Some("tok"), Some(UserRecord::new("root").with_admin(true)));
        assert_eq!(
            evaluate(&admin, &intent("/devices/new")),
            Evaluation::Decided(GuardDecision::Proceed)
        );
    }

    #[test]
    fn authenticated_user_skips_login() {
        let admin = session(Some("tok"), Some(UserRecord::new("root").with_admin(true)));
        assert_eq!(evaluate(&admin, &intent("/login")), redirect_to(RouteName::Dashboard));
        // A bare token counts as authenticated for the login view.
        assert_eq!(
            evaluate(&session(Some("tok"), None), &intent("/login")),
            redirect_to(RouteName::Dashboard)
        );
    }

    #[test]
    fn anonymous_user_may_open_login() {
        assert_eq!(
            evaluate(&session(None, None), &intent("/login")),
            Evaluation::Decided(GuardDecision::Proceed)
        );
    }
}
