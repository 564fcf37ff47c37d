use std::sync::{Mutex, PoisonError, RwLock};

use tokio::sync::Notify;
use tracing::debug;

use super::location::Location;
use super::routes::{ResolvedRoute, RouteName};

/// What the interceptor layer may know about navigation: where the user is,
/// and a way to ask to be somewhere else.
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Option<RouteName>;
    /// Ask for a navigation. Never blocks; the router performs it once any
    /// in-flight navigation has finished.
    fn request(&self, location: Location);
}

/// The console's location: the current route, every committed path, and at
/// most one navigation requested from outside the router.
#[derive(Default)]
pub struct History {
    current: RwLock<Option<ResolvedRoute>>,
    entries: RwLock<Vec<String>>,
    pending: Mutex<Option<Location>>,
    notify: Notify,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ResolvedRoute> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every full path committed so far, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn commit(&self, route: ResolvedRoute) {
        debug!("Navigated to {} ({})", route.full_path, route.name);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.full_path.clone());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(route);
    }

    pub(crate) fn take_pending(&self) -> Option<Location> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Resolves once a navigation has been requested since the last call.
    pub(crate) async fn requested(&self) {
        self.notify.notified().await;
    }
}

impl Navigator for History {
    fn current_route(&self) -> Option<RouteName> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|route| route.name)
    }

    fn request(&self, location: Location) {
        debug!("Navigation to {} requested", location.name);
        // A newer request replaces one that has not been served yet.
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(location);
        self.notify.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RouteTable;

    #[test]
    fn commit_updates_current_and_entries() {
        let table = RouteTable::admin_console();
        let history = History::new();
        assert_eq!(history.current_route(), None);

        history.commit(table.resolve("/login").unwrap());
        history.commit(table.resolve("/dashboard").unwrap());

        assert_eq!(history.current_route(), Some(RouteName::Dashboard));
        assert_eq!(history.entries(), vec!["/login", "/dashboard"]);
    }

    #[test]
    fn latest_request_wins() {
        let history = History::new();
        history.request(Location::named(RouteName::Dashboard));
        history.request(Location::named(RouteName::Login));

        assert_eq!(history.take_pending(), Some(Location::named(RouteName::Login)));
        assert_eq!(history.take_pending(), None);
    }
}
