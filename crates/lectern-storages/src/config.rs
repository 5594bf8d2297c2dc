//! Configuration types for storage backends.

use crate::{Result, StorageError};
use std::str::FromStr;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
	/// Local file system
	Local,
	/// Process memory, lost on restart
	Memory,
}

impl std::fmt::Display for BackendType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			BackendType::Local => write!(f, "local"),
			BackendType::Memory => write!(f, "memory"),
		}
	}
}

impl FromStr for BackendType {
	type Err = StorageError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_lowercase().as_str() {
			"local" => Ok(BackendType::Local),
			"memory" => Ok(BackendType::Memory),
			_ => Err(StorageError::ConfigError(format!(
				"Invalid backend type: {}",
				s
			))),
		}
	}
}

/// Configuration for local file system backend.
#[derive(Debug, Clone)]
pub struct LocalConfig {
	/// Base directory path for file storage
	pub base_path: String,
	/// Create `base_path` when it does not exist yet
	pub create_missing: bool,
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub enum StorageConfig {
	Local(LocalConfig),
	Memory,
}

impl StorageConfig {
	/// Local storage rooted at `base_path`, created on demand.
	pub fn local(base_path: impl Into<String>) -> Self {
		StorageConfig::Local(LocalConfig {
			base_path: base_path.into(),
			create_missing: true,
		})
	}

	/// Builds the configuration for a named backend.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_storages::{BackendType, StorageConfig};
	///
	/// let config = StorageConfig::from_backend("memory", "unused").unwrap();
	/// assert_eq!(config.backend_type(), BackendType::Memory);
	/// assert!(StorageConfig::from_backend("s3", "storage").is_err());
	/// ```
	pub fn from_backend(backend: &str, media_root: &str) -> Result<Self> {
		match backend.parse::<BackendType>()? {
			BackendType::Local => Ok(Self::local(media_root)),
			BackendType::Memory => Ok(StorageConfig::Memory),
		}
	}

	pub fn backend_type(&self) -> BackendType {
		match self {
			StorageConfig::Local(_) => BackendType::Local,
			StorageConfig::Memory => BackendType::Memory,
		}
	}
}
