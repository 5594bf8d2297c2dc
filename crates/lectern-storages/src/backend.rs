//! Storage backend trait definition.

use crate::Result;
use async_trait::async_trait;

/// Unified interface over blob stores.
///
/// Keys are relative, `/`-separated paths such as `"<uuid>/<filename>"`.
///
/// # Examples
///
/// ```rust,no_run
/// use lectern_storages::{Result, StorageBackend};
///
/// async fn replace(storage: &dyn StorageBackend, old: &str, new: &str, data: &[u8]) -> Result<()> {
/// 	storage.save(new, data).await?;
/// 	if storage.exists(old).await? {
/// 		storage.delete(old).await?;
/// 	}
/// 	Ok(())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
	/// Stores `content` under `name` and returns the key it was saved as.
	///
	/// # Errors
	///
	/// Returns `StorageError::InvalidKey` if `name` would leave the storage root.
	async fn save(&self, name: &str, content: &[u8]) -> Result<String>;

	/// Reads the blob stored under `name`.
	///
	/// # Errors
	///
	/// Returns `StorageError::NotFound` if the blob doesn't exist.
	async fn open(&self, name: &str) -> Result<Vec<u8>>;

	/// Removes the blob stored under `name`.
	///
	/// # Errors
	///
	/// Returns `StorageError::NotFound` if the blob doesn't exist. Callers
	/// that treat deletion as idempotent check [`StorageError::is_not_found`].
	///
	/// [`StorageError::is_not_found`]: crate::StorageError::is_not_found
	async fn delete(&self, name: &str) -> Result<()>;

	async fn exists(&self, name: &str) -> Result<bool>;
}
