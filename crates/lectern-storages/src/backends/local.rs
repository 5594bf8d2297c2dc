//! Local file system storage backend implementation.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use super::validate_key;
use crate::config::LocalConfig;
use crate::{Result, StorageBackend, StorageError};

/// Local file system storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
	base_path: PathBuf,
}

impl LocalStorage {
	/// Create a new local storage backend.
	///
	/// # Errors
	///
	/// Returns `StorageError::ConfigError` if the base path is missing (and
	/// `create_missing` is off) or is not a directory.
	pub fn new(config: LocalConfig) -> Result<Self> {
		let base_path = PathBuf::from(config.base_path);

		if !base_path.exists() {
			if !config.create_missing {
				return Err(StorageError::ConfigError(format!(
					"Base path does not exist: {}",
					base_path.display()
				)));
			}
			std::fs::create_dir_all(&base_path)?;
			tracing::info!(path = %base_path.display(), "created media root");
		}

		if !base_path.is_dir() {
			return Err(StorageError::ConfigError(format!(
				"Base path is not a directory: {}",
				base_path.display()
			)));
		}

		Ok(Self { base_path })
	}

	pub fn base_path(&self) -> &std::path::Path {
		&self.base_path
	}

	fn get_path(&self, name: &str) -> Result<PathBuf> {
		validate_key(name)?;
		Ok(self.base_path.join(name))
	}
}

#[async_trait]
impl StorageBackend for LocalStorage {
	async fn save(&self, name: &str, content: &[u8]) -> Result<String> {
		let path = self.get_path(name)?;

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).await?;
		}

		fs::write(&path, content).await?;

		Ok(name.to_string())
	}

	async fn open(&self, name: &str) -> Result<Vec<u8>> {
		let path = self.get_path(name)?;

		match fs::read(&path).await {
			Ok(content) => Ok(content),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				Err(StorageError::NotFound(name.to_string()))
			}
			Err(e) => Err(e.into()),
		}
	}

	async fn delete(&self, name: &str) -> Result<()> {
		let path = self.get_path(name)?;

		match fs::remove_file(&path).await {
			Ok(()) => {}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound(name.to_string()));
			}
			Err(e) => return Err(e.into()),
		}

		// Drop the per-upload directory once it is empty.
		if let Some(parent) = path.parent() {
			if parent != self.base_path {
				let _ = fs::remove_dir(parent).await;
			}
		}
		Ok(())
	}

	async fn exists(&self, name: &str) -> Result<bool> {
		let path = self.get_path(name)?;
		Ok(fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false))
	}
}
