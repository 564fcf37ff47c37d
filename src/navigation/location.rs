use std::collections::BTreeMap;

use super::routes::RouteName;

/// Query key carrying the path a login should return to.
pub const REDIRECT_QUERY_KEY: &str = "redirect";

/// A navigation target addressed by route name rather than by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: RouteName,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

impl Location {
    pub fn named(name: RouteName) -> Self {
        Location {
            name,
            params: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }

    /// The login view, remembering where the user was headed.
    pub fn login_returning_to(full_path: &str) -> Self {
        Location::named(RouteName::Login).with_query(REDIRECT_QUERY_KEY, full_path)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}
