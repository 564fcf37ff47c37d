//! View navigation: the route table, the current location, the guard that
//! decides every transition, and the router that serializes transitions.

pub mod guard;
pub mod history;
pub mod location;
pub mod router;
pub mod routes;

pub use guard::{Evaluation, GuardDecision, NavigationGuard, NavigationIntent, evaluate};
pub use history::{History, Navigator};
pub use location::Location;
pub use router::{MAX_REDIRECTS, Router};
pub use routes::{ResolvedRoute, RouteDef, RouteMeta, RouteName, RouteTable};
