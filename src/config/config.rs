use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: API layout, session storage, dev proxy and logging.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load config from "./config.yaml", overlaid with environment variables.
///
/// `API_URL` sets the proxy target; any `SESSIONGATE_`-prefixed variable
/// overrides a nested key, with `__` as the separator
/// (`SESSIONGATE_PROXY__BIND_ADDRESS`).
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::raw().only(&["API_URL"]).map(|_| "proxy.target".into()))
        .merge(Env::prefixed("SESSIONGATE_").split("__"));
    match load_config_from(figment) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Extract a `ConfigV1` from an already assembled figment.
///
/// A missing `version` key is treated as the current version.
pub fn load_config_from(figment: Figment) -> Result<ConfigV1, figment::Error> {
    let config = figment
        .join(Serialized::default("version", "1.0.0"))
        .extract::<Config>()?;
    match config {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => eprintln!("Error rendering configuration schema: {}", e),
    }
}

/// Where the backend API lives and how its paths are laid out.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct ApiConfig {
    /// Origin every request path is appended to.
    pub base_url: String,
    pub unversioned_prefix: String,
    pub versioned_prefix: String,
    /// Base of the login and profile endpoints, before versioning.
    pub auth_base: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            unversioned_prefix: "/api".to_string(),
            versioned_prefix: "/api/v1".to_string(),
            auth_base: "/api/auth".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn login_path(&self) -> String {
        format!("{}/login", self.auth_base.trim_end_matches('/'))
    }

    pub fn profile_path(&self) -> String {
        format!("{}/me", self.auth_base.trim_end_matches('/'))
    }
}

/// The development proxy that forwards API calls to the backend.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct ProxyConfig {
    pub bind_address: String,
    pub target: String,
    /// Send the target's host as `Host` instead of the incoming one.
    pub change_origin: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5173".to_string(),
            target: "http://localhost:8000".to_string(),
            change_origin: true,
        }
    }
}
