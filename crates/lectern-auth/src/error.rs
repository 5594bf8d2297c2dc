//! Authentication and session errors.

/// Why a request failed an authentication gate.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
	#[error("Not authenticated")]
	NotAuthenticated,

	#[error("Invalid credentials")]
	InvalidCredentials,
}

impl From<AuthenticationError> for lectern_core::Error {
	fn from(err: AuthenticationError) -> Self {
		lectern_core::Error::Authentication(err.to_string())
	}
}

/// Session store failures.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
	#[error("Session database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("Session serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl From<SessionError> for lectern_core::Error {
	fn from(err: SessionError) -> Self {
		match err {
			SessionError::Database(e) => lectern_core::Error::Database(e.to_string()),
			SessionError::Serialization(e) => lectern_core::Error::Serialization(e.to_string()),
		}
	}
}
