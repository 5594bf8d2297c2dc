//! Factory function for creating storage backends.

use crate::backends::{InMemoryStorage, LocalStorage};
use crate::{Result, StorageBackend, StorageConfig};
use std::sync::Arc;

/// Create a storage backend from configuration.
///
/// # Examples
///
/// ```rust
/// use lectern_storages::{StorageConfig, create_storage};
///
/// let storage = create_storage(StorageConfig::Memory).unwrap();
/// ```
pub fn create_storage(config: StorageConfig) -> Result<Arc<dyn StorageBackend>> {
	tracing::debug!(backend = %config.backend_type(), "creating storage backend");
	match config {
		StorageConfig::Local(local_config) => Ok(Arc::new(LocalStorage::new(local_config)?)),
		StorageConfig::Memory => Ok(Arc::new(InMemoryStorage::new())),
	}
}
