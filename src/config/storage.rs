use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A wrapper for the session storage configuration:
/// - persistent: if false, the session lives in memory only (MemoryStorage).
/// - backend: the durable backend used when persistent.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct StorageConfig {
    #[serde(default)]
    pub persistent: bool,
    #[serde(flatten)]
    pub backend: Option<StorageBackend>,
}

/// The existing durable backends, told apart by a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageBackend {
    #[serde(rename = "file")]
    File(FileStorageConfig),
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStorageConfig {
    /// JSON file holding the `token` and `user` entries.
    pub path: String,
}
