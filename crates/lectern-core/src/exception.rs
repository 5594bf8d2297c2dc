//! Request-level error type.
//!
//! Every failure a handler can produce is expressed as an [`Error`]. The
//! HTTP layer turns it into a response through [`Error::status_code`], so
//! each variant maps to exactly one status.

use crate::validators::ValidationErrors;

/// Errors surfaced at the request boundary.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A record or route does not exist
	#[error("Not found: {0}")]
	NotFound(String),

	/// User input failed field validation
	#[error("Validation failed: {0}")]
	Validation(ValidationErrors),

	/// The caller is not signed in or presented bad credentials
	#[error("Authentication required: {0}")]
	Authentication(String),

	/// Malformed request (bad form encoding, bad multipart boundary, ...)
	#[error("Bad request: {0}")]
	BadRequest(String),

	/// The path exists but not for this method
	#[error("Method not allowed: {0}")]
	MethodNotAllowed(String),

	/// The request body exceeds the configured limit
	#[error("Payload too large: {0}")]
	PayloadTooLarge(String),

	#[error("Database error: {0}")]
	Database(String),

	#[error("Storage error: {0}")]
	Storage(String),

	#[error("Template error: {0}")]
	Template(String),

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error("Internal server error: {0}")]
	Internal(String),
}

impl Error {
	/// HTTP status code for this error.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_core::Error;
	///
	/// assert_eq!(Error::NotFound("article 7".into()).status_code(), 404);
	/// assert_eq!(Error::Database("locked".into()).status_code(), 500);
	/// ```
	pub fn status_code(&self) -> u16 {
		match self {
			Error::NotFound(_) => 404,
			Error::Validation(_) => 422,
			Error::Authentication(_) => 401,
			Error::BadRequest(_) => 400,
			Error::MethodNotAllowed(_) => 405,
			Error::PayloadTooLarge(_) => 413,
			Error::Database(_)
			| Error::Storage(_)
			| Error::Template(_)
			| Error::Serialization(_)
			| Error::Internal(_) => 500,
		}
	}

	/// Whether the details of this error must stay out of the response body.
	pub fn is_internal(&self) -> bool {
		self.status_code() >= 500
	}

	/// Text safe to show to the client.
	pub fn public_message(&self) -> String {
		match self {
			Error::NotFound(_) => "The page you were looking for doesn't exist.".to_string(),
			Error::Validation(errors) => errors.full_messages().join(", "),
			Error::Authentication(_) => "HTTP Basic: Access denied.".to_string(),
			Error::MethodNotAllowed(_) => "Method not allowed.".to_string(),
			Error::PayloadTooLarge(_) => "Request body too large.".to_string(),
			Error::BadRequest(msg) => msg.clone(),
			_ => "We're sorry, but something went wrong.".to_string(),
		}
	}
}

impl From<ValidationErrors> for Error {
	fn from(errors: ValidationErrors) -> Self {
		Error::Validation(errors)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Serialization(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, Error>;
