use std::borrow::Cow;

use super::OutboundInterceptor;
use crate::client::OutboundRequest;

/// The unversioned and versioned API prefixes, e.g. `/api` and `/api/v1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPrefixes {
    unversioned: String,
    versioned: String,
}

impl ApiPrefixes {
    pub fn new(unversioned: &str, versioned: &str) -> Self {
        ApiPrefixes {
            unversioned: normalize_prefix(unversioned),
            versioned: normalize_prefix(versioned),
        }
    }

    /// Whether `path` lies under the unversioned prefix (versioned paths included).
    pub fn is_api_path(&self, path: &str) -> bool {
        has_segment_prefix(path, &self.unversioned)
    }

    pub fn is_versioned(&self, path: &str) -> bool {
        has_segment_prefix(path, &self.versioned)
    }

    /// Substitute the versioned prefix for the unversioned one.
    ///
    /// Already versioned paths and paths outside the API come back unchanged,
    /// so applying this twice is the same as applying it once.
    pub fn rewrite<'a>(&self, path: &'a str) -> Cow<'a, str> {
        if self.is_versioned(path) || !self.is_api_path(path) {
            return Cow::Borrowed(path);
        }
        Cow::Owned(format!(
            "{}{}",
            self.versioned,
            &path[self.unversioned.len()..]
        ))
    }
}

impl Default for ApiPrefixes {
    fn default() -> Self {
        ApiPrefixes::new("/api", "/api/v1")
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// `prefix` matches whole path segments only: `/api` covers `/api`,
/// `/api/x` and `/api?q`, but not `/apis`.
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

/// Outbound stage normalizing request paths to the versioned API prefix.
pub struct ApiVersioning {
    prefixes: ApiPrefixes,
}

impl ApiVersioning {
    pub fn new(prefixes: ApiPrefixes) -> Self {
        ApiVersioning { prefixes }
    }
}

impl OutboundInterceptor for ApiVersioning {
    fn get_name(&self) -> &str {
        "api-versioning"
    }

    fn apply(&self, request: &mut OutboundRequest) {
        if let Cow::Owned(rewritten) = self.prefixes.rewrite(&request.path) {
            request.path = rewritten;
        }
    }
}
