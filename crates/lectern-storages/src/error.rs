//! Storage error type.

/// Errors raised by storage backends.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	/// No blob is stored under the key
	#[error("File not found: {0}")]
	NotFound(String),

	/// The key would escape the storage root or is otherwise unusable
	#[error("Invalid key: {0}")]
	InvalidKey(String),

	#[error("Configuration error: {0}")]
	ConfigError(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl StorageError {
	pub fn is_not_found(&self) -> bool {
		matches!(self, StorageError::NotFound(_))
	}
}

impl From<StorageError> for lectern_core::Error {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::NotFound(key) => lectern_core::Error::NotFound(format!("blob {}", key)),
			other => lectern_core::Error::Storage(other.to_string()),
		}
	}
}

pub type Result<T> = std::result::Result<T, StorageError>;
