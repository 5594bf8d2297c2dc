//! Storage backend implementations.

pub mod local;
pub mod memory;

pub use local::LocalStorage;
pub use memory::InMemoryStorage;

use crate::{Result, StorageError};

/// Rejects keys that are empty, absolute, or contain `..`, `\` or NUL.
pub(crate) fn validate_key(name: &str) -> Result<()> {
	let invalid = name.is_empty()
		|| name.starts_with('/')
		|| name.contains('\\')
		|| name.contains('\0')
		|| name.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
	if invalid {
		return Err(StorageError::InvalidKey(name.to_string()));
	}
	Ok(())
}
