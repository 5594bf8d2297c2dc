//! Files received through `multipart/form-data`.

use bytes::Bytes;
use percent_encoding::percent_decode_str;

/// A file part of a multipart form, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
	pub field_name: String,
	pub filename: String,
	pub content_type: String,
	pub data: Bytes,
}

impl UploadedFile {
	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

/// Rejects filenames that could escape the storage directory.
///
/// Both the raw name and its percent-decoded form are checked, so
/// `%2e%2e%2f` is caught as well as `../`.
///
/// # Examples
///
/// ```
/// use lectern_http::validate_safe_filename;
///
/// assert!(validate_safe_filename("cover.jpg").is_ok());
/// assert!(validate_safe_filename("../etc/passwd").is_err());
/// assert!(validate_safe_filename("%2e%2e%2fsecret").is_err());
/// ```
pub fn validate_safe_filename(filename: &str) -> Result<(), String> {
	if filename.trim().is_empty() {
		return Err("empty filename".to_string());
	}

	let decoded = percent_decode_str(filename).decode_utf8_lossy();
	for candidate in [filename, decoded.as_ref()] {
		if candidate.contains('\0') || candidate.contains("..") {
			return Err(format!("unsafe filename '{}'", filename));
		}
		if candidate.contains('/') || candidate.contains('\\') {
			return Err(format!("unsafe filename '{}'", filename));
		}
		// Windows drive prefix
		let bytes = candidate.as_bytes();
		if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
			return Err(format!("unsafe filename '{}'", filename));
		}
	}
	Ok(())
}
