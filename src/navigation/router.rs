use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::guard::{GuardDecision, NavigationGuard, NavigationIntent};
use super::history::{History, Navigator};
use super::location::Location;
use super::routes::{ResolvedRoute, RouteTable};
use crate::error::NavigationError;

/// Redirects followed for a single navigation before giving up.
pub const MAX_REDIRECTS: usize = 8;

/// Runs navigations one at a time through the guard and records them in the
/// history.
pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
    history: Arc<History>,
    in_flight: Mutex<()>,
}

impl Router {
    pub fn new(table: RouteTable, guard: NavigationGuard, history: Arc<History>) -> Self {
        Router {
            table,
            guard,
            history,
            in_flight: Mutex::new(()),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    pub fn current(&self) -> Option<ResolvedRoute> {
        self.history.current()
    }

    /// Navigate to `full_path`, following guard redirects, and return the
    /// route finally shown.
    ///
    /// A navigation started while another is running waits for it, guard
    /// evaluation included.
    pub async fn navigate(&self, full_path: &str) -> Result<ResolvedRoute, NavigationError> {
        let _turn = self.in_flight.lock().await;
        let shown = self.run(full_path).await?;
        self.drain_pending().await;
        Ok(shown)
    }

    pub async fn push(&self, location: &Location) -> Result<ResolvedRoute, NavigationError> {
        let full_path = self.table.href(location)?;
        self.navigate(&full_path).await
    }

    /// Serve a navigation requested through the history, if any, once the
    /// router is idle.
    pub async fn settle(&self) {
        let _turn = self.in_flight.lock().await;
        self.drain_pending().await;
    }

    /// Spawn a task serving navigation requests as they arrive.
    pub fn listen(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                self.history.requested().await;
                self.settle().await;
            }
        })
    }

    async fn run(&self, full_path: &str) -> Result<ResolvedRoute, NavigationError> {
        let mut target = self.table.resolve(full_path)?;
        for _ in 0..=MAX_REDIRECTS {
            let intent = NavigationIntent::for_route(target.clone());
            let current = self.history.current();
            match self.guard.check(&intent, current.as_ref()).await {
                GuardDecision::Proceed => {
                    self.history.commit(target.clone());
                    return Ok(target);
                }
                GuardDecision::Redirect(location) => {
                    let next = self.table.href(&location)?;
                    debug!("Redirecting {} -> {}", target.full_path, next);
                    target = self.table.resolve(&next)?;
                }
            }
        }
        Err(NavigationError::RedirectLoop(full_path.to_string()))
    }

    async fn drain_pending(&self) {
        for _ in 0..=MAX_REDIRECTS {
            let Some(location) = self.history.take_pending() else {
                return;
            };
            if self.history.current_route() == Some(location.name) {
                debug!("Already showing {}, dropping requested navigation", location.name);
                continue;
            }
            let outcome = match self.table.href(&location) {
                Ok(full_path) => self.run(&full_path).await,
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                warn!("Requested navigation to {} failed: {}", location.name, e);
            }
        }
    }
}
