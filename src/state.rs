//! Shared state of the development proxy.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigV1;
use crate::interceptors::ApiPrefixes;
use crate::utils::LogThrottle;

const UPSTREAM_FAILURE_LOG_WINDOW: Duration = Duration::from_secs(10);

/// State shared across all proxy handlers.
///
/// Cloned for each request; the upstream client keeps one connection pool
/// for the whole process.
#[derive(Clone)]
pub struct ProxyState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Client used to reach `proxy.target`.
    pub client: reqwest::Client,
    pub prefixes: ApiPrefixes,
    /// Keeps an unreachable backend from flooding the log.
    pub upstream_failures: Arc<LogThrottle>,
}

impl ProxyState {
    pub fn new(config: Arc<ConfigV1>) -> Self {
        let prefixes = ApiPrefixes::new(
            &config.api.unversioned_prefix,
            &config.api.versioned_prefix,
        );
        ProxyState {
            config,
            client: reqwest::Client::new(),
            prefixes,
            upstream_failures: Arc::new(LogThrottle::new(UPSTREAM_FAILURE_LOG_WINDOW)),
        }
    }
}
