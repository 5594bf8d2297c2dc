//! In-memory storage backend, used by tests and `storage_backend = "memory"`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::validate_key;
use crate::{Result, StorageBackend, StorageError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
	blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored blobs.
	pub async fn len(&self) -> usize {
		self.blobs.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.blobs.read().await.is_empty()
	}
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
	async fn save(&self, name: &str, content: &[u8]) -> Result<String> {
		validate_key(name)?;
		self.blobs
			.write()
			.await
			.insert(name.to_string(), content.to_vec());
		Ok(name.to_string())
	}

	async fn open(&self, name: &str) -> Result<Vec<u8>> {
		self.blobs
			.read()
			.await
			.get(name)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(name.to_string()))
	}

	async fn delete(&self, name: &str) -> Result<()> {
		self.blobs
			.write()
			.await
			.remove(name)
			.map(|_| ())
			.ok_or_else(|| StorageError::NotFound(name.to_string()))
	}

	async fn exists(&self, name: &str) -> Result<bool> {
		Ok(self.blobs.read().await.contains_key(name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_save_open_delete() {
		// Arrange
		let storage = InMemoryStorage::new();

		// Act
		storage.save("a/b.txt", b"hello").await.unwrap();

		// Assert
		assert_eq!(storage.open("a/b.txt").await.unwrap(), b"hello");
		assert_eq!(storage.len().await, 1);

		storage.delete("a/b.txt").await.unwrap();
		assert!(storage.is_empty().await);
		assert!(storage.delete("a/b.txt").await.unwrap_err().is_not_found());
	}

	#[rstest]
	#[tokio::test]
	async fn test_clones_share_blobs() {
		let storage = InMemoryStorage::new();
		let other = storage.clone();

		storage.save("k", b"v").await.unwrap();

		assert!(other.exists("k").await.unwrap());
	}
}
