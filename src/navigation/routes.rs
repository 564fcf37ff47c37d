use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;

use super::location::Location;
use crate::error::NavigationError;

/// The views of the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Login,
    Dashboard,
    DeviceList,
    DeviceDetail,
    DeviceNew,
    DeviceEdit,
    RealTimeData,
    MqttConfig,
    TopicConfig,
    SubscribeOptions,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Login => "Login",
            RouteName::Dashboard => "Dashboard",
            RouteName::DeviceList => "DeviceList",
            RouteName::DeviceDetail => "DeviceDetail",
            RouteName::DeviceNew => "DeviceNew",
            RouteName::DeviceEdit => "DeviceEdit",
            RouteName::RealTimeData => "RealTimeData",
            RouteName::MqttConfig => "MqttConfig",
            RouteName::TopicConfig => "TopicConfig",
            RouteName::SubscribeOptions => "SubscribeOptions",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static access requirements declared by a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteMeta {
    pub const PUBLIC: RouteMeta = RouteMeta {
        requires_auth: false,
        requires_admin: false,
    };
    pub const AUTHENTICATED: RouteMeta = RouteMeta {
        requires_auth: true,
        requires_admin: false,
    };
    pub const ADMIN: RouteMeta = RouteMeta {
        requires_auth: true,
        requires_admin: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_segments(pattern)
        .map(|segment| match segment.strip_prefix(':') {
            Some(param) => Segment::Param(param.to_string()),
            None => Segment::Static(segment.to_string()),
        })
        .collect()
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// One entry of the route table.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub name: RouteName,
    pub pattern: String,
    pub meta: RouteMeta,
    segments: Vec<Segment>,
}

impl RouteDef {
    pub fn new(name: RouteName, pattern: &str, meta: RouteMeta) -> Self {
        RouteDef {
            name,
            pattern: pattern.to_string(),
            meta,
            segments: parse_pattern(pattern),
        }
    }

    fn static_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count()
    }

    fn matches(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) if expected == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    // A segment that does not decode to UTF-8 cannot be a param value.
                    let value = urlencoding::decode(part).ok()?;
                    params.insert(name.clone(), value.into_owned());
                }
            }
        }
        Some(params)
    }
}

/// A concrete path matched against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: RouteName,
    pub path: String,
    /// Path plus query string, as it should appear in the address bar.
    pub full_path: String,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub meta: RouteMeta,
}

/// Maps paths to views and views back to paths.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
    aliases: Vec<(String, String)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The route table of the device administration console.
    pub fn admin_console() -> Self {
        RouteTable::new()
            .route(RouteName::Login, "/login", RouteMeta::PUBLIC)
            .alias("/", "/dashboard")
            .route(RouteName::Dashboard, "/dashboard", RouteMeta::AUTHENTICATED)
            .route(RouteName::DeviceList, "/devices", RouteMeta::ADMIN)
            .route(RouteName::DeviceDetail, "/devices/:id", RouteMeta::ADMIN)
            .route(RouteName::DeviceNew, "/devices/new", RouteMeta::ADMIN)
            .route(RouteName::DeviceEdit, "/devices/:id/edit", RouteMeta::ADMIN)
            .route(RouteName::RealTimeData, "/realtime-data", RouteMeta::AUTHENTICATED)
            .route(RouteName::MqttConfig, "/mqtt-config", RouteMeta::ADMIN)
            .route(RouteName::TopicConfig, "/topic-config", RouteMeta::ADMIN)
            .route(RouteName::SubscribeOptions, "/subscribe-options", RouteMeta::ADMIN)
    }

    pub fn route(mut self, name: RouteName, pattern: &str, meta: RouteMeta) -> Self {
        self.routes.push(RouteDef::new(name, pattern, meta));
        self
    }

    /// Paths equal to `from` are served as `to`.
    pub fn alias(mut self, from: &str, to: &str) -> Self {
        self.aliases.push((normalize_path(from), to.to_string()));
        self
    }

    pub fn get(&self, name: RouteName) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Match a path (optionally with a query string) against the table.
    /// Static segments win over parameters when several routes match.
    pub fn resolve(&self, full_path: &str) -> Result<ResolvedRoute, NavigationError> {
        let without_fragment = full_path.split('#').next().unwrap_or_default();
        let (raw_path, raw_query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };

        let mut path = normalize_path(raw_path);
        if let Some((_, target)) = self.aliases.iter().find(|(from, _)| *from == path) {
            path = normalize_path(target);
        }

        let parts: Vec<&str> = split_segments(&path).collect();
        let (route, params) = self
            .routes
            .iter()
            .filter_map(|route| route.matches(&parts).map(|params| (route, params)))
            .max_by_key(|(route, _)| route.static_count())
            .ok_or_else(|| NavigationError::NotFound(full_path.to_string()))?;

        let query: BTreeMap<String, String> = form_urlencoded::parse(raw_query.as_bytes())
            .into_owned()
            .collect();
        let full_path = if raw_query.is_empty() {
            path.clone()
        } else {
            format!("{}?{}", path, raw_query)
        };

        Ok(ResolvedRoute {
            name: route.name,
            path,
            full_path,
            params,
            query,
            meta: route.meta,
        })
    }

    /// Render a location to the full path it stands for.
    pub fn href(&self, location: &Location) -> Result<String, NavigationError> {
        let route = self
            .get(location.name)
            .ok_or_else(|| NavigationError::NotFound(location.name.to_string()))?;

        let mut path = String::new();
        for segment in &route.segments {
            path.push('/');
            match segment {
                Segment::Static(value) => path.push_str(value),
                Segment::Param(name) => {
                    let value = location.params.get(name).ok_or_else(|| {
                        NavigationError::MissingParam {
                            route: location.name.to_string(),
                            param: name.clone(),
                        }
                    })?;
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }

        if !location.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(location.query.iter())
                .finish();
            path.push('?');
            path.push_str(&query);
        }
        Ok(path)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_static_and_parameter_routes() {
        let table = RouteTable::admin_console();

        let list = table.resolve("/devices").unwrap();
        assert_eq!(list.name, RouteName::DeviceList);
        assert!(list.meta.requires_admin);

        let detail = table.resolve("/devices/42").unwrap();
        assert_eq!(detail.name, RouteName::DeviceDetail);
        assert_eq!(detail.params.get("id").map(String::as_str), Some("42"));

        let edit = table.resolve("/devices/42/edit/").unwrap();
        assert_eq!(edit.name, RouteName::DeviceEdit);
        assert_eq!(edit.path, "/devices/42/edit");
    }

    #[test]
    fn static_segment_outranks_parameter() {
        let table = RouteTable::admin_console();
        let new = table.resolve("/devices/new").unwrap();
        assert_eq!(new.name, RouteName::DeviceNew);
        assert!(new.params.is_empty());
    }

    #[test]
    fn root_is_an_alias_for_dashboard() {
        let table = RouteTable::admin_console();
        let root = table.resolve("/").unwrap();
        assert_eq!(root.name, RouteName::Dashboard);
        assert_eq!(root.full_path, "/dashboard");
    }

    #[test]
    fn query_is_parsed_and_kept_in_full_path() {
        let table = RouteTable::admin_console();
        let login = table.resolve("/login?redirect=%2Fdevices%2F3").unwrap();
        assert_eq!(login.name, RouteName::Login);
        assert_eq!(login.query.get("redirect").map(String::as_str), Some("/devices/3"));
        assert_eq!(login.full_path, "/login?redirect=%2Fdevices%2F3");
        assert!(!login.meta.requires_auth);
    }

    #[test]
    fn unknown_path_is_not_found() {
        let table = RouteTable::admin_console();
        assert_eq!(
            table.resolve("/nowhere"),
            Err(NavigationError::NotFound("/nowhere".to_string()))
        );
    }

    #[test]
    fn href_renders_params_and_query() {
        let table = RouteTable::admin_console();

        let edit = Location::named(RouteName::DeviceEdit).with_param("id", "9");
        assert_eq!(table.href(&edit).unwrap(), "/devices/9/edit");

        let login = Location::login_returning_to("/devices?page=2");
        let href = table.href(&login).unwrap();
        let resolved = table.resolve(&href).unwrap();
        assert_eq!(
            resolved.query.get("redirect").map(String::as_str),
            Some("/devices?page=2")
        );
    }

    #[test]
    fn param_values_are_encoded_and_decoded() {
        let table = RouteTable::admin_console();

        let detail = Location::named(RouteName::DeviceDetail).with_param("id", "rack 4/unit 2");
        let href = table.href(&detail).unwrap();
        assert_eq!(href, "/devices/rack%204%2Funit%202");

        let resolved = table.resolve(&href).unwrap();
        assert_eq!(resolved.name, RouteName::DeviceDetail);
        assert_eq!(
            resolved.params.get("id").map(String::as_str),
            Some("rack 4/unit 2")
        );

        let edit = table
            .resolve("/devices/a%2Fb/edit")
            .unwrap();
        assert_eq!(edit.name, RouteName::DeviceEdit);
        assert_eq!(edit.params.get("id").map(String::as_str), Some("a/b"));
    }

    #[test]
    fn href_requires_params() {
        let table = RouteTable::admin_console();
        let result = table.href(&Location::named(RouteName::DeviceDetail));
        assert!(matches!(result, Err(NavigationError::MissingParam { .. })));
    }
}
