//! HTML form bodies.
//!
//! Forms arrive either url-encoded or as `multipart/form-data` (when they
//! carry a file). Both are decoded into a [`FormData`]: ordered text fields
//! plus in-memory [`UploadedFile`]s. Rails-style nested names such as
//! `article[title]` are addressed through [`FormData::scope`].

use futures::stream::once;
use lectern_core::exception::{Error, Result};
use std::future::ready;

use crate::request::Request;
use crate::upload::UploadedFile;

/// Decoded form fields and files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
	fields: Vec<(String, String)>,
	files: Vec<UploadedFile>,
}

impl FormData {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a form from literal pairs.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_http::FormData;
	///
	/// let form = FormData::from_pairs([("article[title]", "Hello"), ("commit", "Save")]);
	/// assert_eq!(form.get("commit"), Some("Save"));
	/// assert_eq!(form.scope("article").get("title"), Some("Hello"));
	/// ```
	pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			fields: pairs
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
			files: Vec::new(),
		}
	}

	pub fn with_file(mut self, file: UploadedFile) -> Self {
		self.files.push(file);
		self
	}

	/// Decodes `application/x-www-form-urlencoded` bytes.
	pub fn from_urlencoded(body: &[u8]) -> Result<Self> {
		let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
			.map_err(|e| Error::BadRequest(format!("malformed form body: {}", e)))?;
		Ok(Self {
			fields,
			files: Vec::new(),
		})
	}

	/// Decodes a `multipart/form-data` body.
	///
	/// File parts with an empty filename (an untouched file input) are
	/// dropped.
	pub async fn from_multipart(content_type: &str, body: bytes::Bytes) -> Result<Self> {
		let boundary = multer::parse_boundary(content_type)
			.map_err(|e| Error::BadRequest(format!("failed to parse boundary: {}", e)))?;

		let stream = once(ready(Ok::<_, std::io::Error>(body)));
		let mut multipart = multer::Multipart::new(stream, boundary);

		let mut form = FormData::new();
		while let Some(field) = multipart
			.next_field()
			.await
			.map_err(|e| Error::BadRequest(format!("failed to read multipart field: {}", e)))?
		{
			let name = field
				.name()
				.ok_or_else(|| Error::BadRequest("multipart field name missing".to_string()))?
				.to_string();

			match field.file_name().map(str::to_string) {
				Some(filename) => {
					let content_type = field
						.content_type()
						.map(|mime| mime.to_string())
						.unwrap_or_else(|| "application/octet-stream".to_string());
					let data = field.bytes().await.map_err(|e| {
						Error::BadRequest(format!("failed to read file field: {}", e))
					})?;
					if filename.is_empty() && data.is_empty() {
						continue;
					}
					tracing::debug!(field = %name, %filename, bytes = data.len(), "received upload");
					form.files.push(UploadedFile {
						field_name: name,
						filename,
						content_type,
						data,
					});
				}
				None => {
					let text = field.text().await.map_err(|e| {
						Error::BadRequest(format!("failed to read text field: {}", e))
					})?;
					form.fields.push((name, text));
				}
			}
		}

		Ok(form)
	}

	pub(crate) async fn from_request(request: &Request) -> Result<Self> {
		if request.body.is_empty() {
			return Ok(Self::new());
		}
		match request.content_type() {
			Some(ct) if ct.starts_with("multipart/form-data") => {
				Self::from_multipart(ct, request.body.clone()).await
			}
			_ => Self::from_urlencoded(&request.body),
		}
	}

	/// First value of the field called `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.fields
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	pub fn file(&self, name: &str) -> Option<&UploadedFile> {
		self.files.iter().find(|f| f.field_name == name)
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.files.is_empty()
	}

	/// View onto the `scope[...]` fields.
	pub fn scope<'a>(&'a self, scope: &'a str) -> FormScope<'a> {
		FormScope { form: self, scope }
	}
}

/// Fields of one model inside a form, e.g. everything under `article[...]`.
///
/// Lookups try `scope[name]` first and fall back to a bare `name`.
#[derive(Debug, Clone, Copy)]
pub struct FormScope<'a> {
	form: &'a FormData,
	scope: &'a str,
}

impl<'a> FormScope<'a> {
	fn scoped_name(&self, name: &str) -> String {
		format!("{}[{}]", self.scope, name)
	}

	pub fn get(&self, name: &str) -> Option<&'a str> {
		self.form
			.get(&self.scoped_name(name))
			.or_else(|| self.form.get(name))
	}

	/// Like [`get`](Self::get) but returns an owned, possibly empty string.
	pub fn string(&self, name: &str) -> String {
		self.get(name).unwrap_or_default().to_string()
	}

	pub fn file(&self, name: &str) -> Option<&'a UploadedFile> {
		self.form
			.file(&self.scoped_name(name))
			.or_else(|| self.form.file(name))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;
	use rstest::rstest;

	const BOUNDARY: &str = "X-LECTERN-BOUNDARY";

	fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Bytes {
		let mut body = String::new();
		for (name, filename, content) in parts {
			body.push_str(&format!("--{}\r\n", BOUNDARY));
			match filename {
				Some(filename) => {
					body.push_str(&format!(
						"Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
						name, filename
					));
					body.push_str("Content-Type: image/jpeg\r\n\r\n");
				}
				None => body.push_str(&format!(
					"Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
					name
				)),
			}
			body.push_str(content);
			body.push_str("\r\n");
		}
		body.push_str(&format!("--{}--\r\n", BOUNDARY));
		Bytes::from(body)
	}

	#[rstest]
	fn test_urlencoded_nested_names() {
		// Arrange
		let body = b"article%5Btitle%5D=Hello+World&article%5Bbody%5D=long+enough+body";

		// Act
		let form = FormData::from_urlencoded(body).unwrap();

		// Assert
		let article = form.scope("article");
		assert_eq!(article.get("title"), Some("Hello World"));
		assert_eq!(article.get("body"), Some("long enough body"));
		assert_eq!(article.get("status"), None);
	}

	#[rstest]
	fn test_scope_falls_back_to_bare_name() {
		let form = FormData::from_pairs([("name", "Rust")]);

		assert_eq!(form.scope("category").get("name"), Some("Rust"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_multipart_text_and_file() {
		// Arrange
		let body = multipart_body(&[
			("article[title]", None, "With image"),
			("article[image]", Some("html.jpg"), "JPEGDATA"),
		]);
		let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);

		// Act
		let form = FormData::from_multipart(&content_type, body).await.unwrap();

		// Assert
		let article = form.scope("article");
		assert_eq!(article.get("title"), Some("With image"));
		let image = article.file("image").unwrap();
		assert_eq!(image.filename, "html.jpg");
		assert_eq!(image.content_type, "image/jpeg");
		assert_eq!(image.data, Bytes::from_static(b"JPEGDATA"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_multipart_skips_empty_file_input() {
		let body = multipart_body(&[("article[image]", Some(""), "")]);
		let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);

		let form = FormData::from_multipart(&content_type, body).await.unwrap();

		assert!(form.scope("article").file("image").is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_multipart_without_boundary_is_bad_request() {
		let result = FormData::from_multipart("multipart/form-data", Bytes::from("x")).await;

		assert!(matches!(result, Err(Error::BadRequest(_))));
	}
}
