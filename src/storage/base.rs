use std::sync::Arc;

use tracing::info;

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

/// The Storage trait abstracts a durable string key/value store with the
/// same contract as the browser's `localStorage`.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a key that is not present is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    fn is_durable(&self) -> bool {
        // Memory storage returns false so logs can say the session won't survive a restart
        true
    }
}

/// Creates a concrete storage implementation based on the StorageConfig.
/// If `persistent = false` (or no backend is given), returns MemoryStorage.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, StorageError> {
    if !config.persistent {
        info!("Session persistence is disabled. Using MemoryStorage.");
        return Ok(Arc::new(MemoryStorage::new()));
    }

    match &config.backend {
        Some(StorageBackend::File(file_config)) => {
            let storage = FileStorage::open(&file_config.path)?;
            info!("Session storage opened at '{}'.", file_config.path);
            Ok(Arc::new(storage))
        }
        None => {
            info!("Persistence requested without a backend. Using MemoryStorage.");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}
