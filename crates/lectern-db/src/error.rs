//! Database error type.

use lectern_core::ValidationErrors;
use lectern_storages::StorageError;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
	#[error("{0} not found")]
	NotFound(String),

	#[error("Validation failed: {0}")]
	Validation(ValidationErrors),

	/// The row is still referenced and may not be deleted
	#[error("{0}")]
	Restricted(String),

	#[error("Migration {version} ({name}) failed: {source}")]
	Migration {
		version: i64,
		name: &'static str,
		#[source]
		source: sqlx::Error,
	},

	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),

	#[error("Query error: {0}")]
	Query(#[from] sqlx::Error),

	#[error("Password hashing failed: {0}")]
	Password(String),
}

impl From<ValidationErrors> for DatabaseError {
	fn from(errors: ValidationErrors) -> Self {
		DatabaseError::Validation(errors)
	}
}

impl DatabaseError {
	pub(crate) fn not_found(model: &str, id: i64) -> Self {
		DatabaseError::NotFound(format!("{} {}", model, id))
	}

	/// Validation failure on a single field.
	pub(crate) fn invalid(field: &str, message: &str) -> Self {
		let mut errors = ValidationErrors::new();
		errors.add(field, message);
		DatabaseError::Validation(errors)
	}
}

impl From<DatabaseError> for lectern_core::Error {
	fn from(err: DatabaseError) -> Self {
		match err {
			DatabaseError::NotFound(what) => lectern_core::Error::NotFound(what),
			DatabaseError::Validation(errors) => lectern_core::Error::Validation(errors),
			DatabaseError::Restricted(message) => lectern_core::Error::BadRequest(message),
			DatabaseError::Storage(e) => e.into(),
			DatabaseError::Password(message) => lectern_core::Error::Internal(message),
			other => lectern_core::Error::Database(other.to_string()),
		}
	}
}

/// Whether `err` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Whether `err` is a FOREIGN KEY constraint violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
