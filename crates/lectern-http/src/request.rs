//! Incoming request.

use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, COOKIE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method, Uri, Version};
use lectern_core::exception::{Error, Result};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::extensions::Extensions;
use crate::form::FormData;

/// A fully-buffered HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Raw (still percent-encoded) values captured by the router
	pub path_params: HashMap<String, String>,
	/// Decoded query string pairs; the first occurrence of a key wins
	pub query_params: HashMap<String, String>,
	pub remote_addr: Option<SocketAddr>,
	pub extensions: Extensions,
}

impl Request {
	/// Starts a [`RequestBuilder`].
	///
	/// # Examples
	///
	/// ```
	/// use lectern_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	/// 	.method(Method::GET)
	/// 	.uri("/search?search=Ruby+on%20Rails")
	/// 	.build()
	/// 	.unwrap();
	///
	/// assert_eq!(request.path(), "/search");
	/// assert_eq!(request.query("search"), Some("Ruby on Rails"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub(crate) fn parse_query_params(uri: &Uri) -> HashMap<String, String> {
		let pairs: Vec<(String, String)> = uri
			.query()
			.and_then(|q| serde_urlencoded::from_str(q).ok())
			.unwrap_or_default();
		let mut params = HashMap::with_capacity(pairs.len());
		for (key, value) in pairs {
			params.entry(key).or_insert(value);
		}
		params
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	pub fn query(&self, key: &str) -> Option<&str> {
		self.query_params.get(key).map(String::as_str)
	}

	/// Percent-decoded path parameter.
	pub fn path_param(&self, key: &str) -> Option<String> {
		self.path_params
			.get(key)
			.map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
	}

	/// Parses a path parameter, treating a missing or malformed value as
	/// a missing record.
	pub fn path_param_as<T: FromStr>(&self, key: &str) -> Result<T> {
		let raw = self
			.path_param(key)
			.ok_or_else(|| Error::NotFound(format!("missing path parameter '{}'", key)))?;
		raw.parse::<T>()
			.map_err(|_| Error::NotFound(format!("invalid {} '{}'", key, raw)))
	}

	pub fn set_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.path_params.insert(key.into(), value.into());
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn content_type(&self) -> Option<&str> {
		self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
	}

	/// Value of the cookie called `name`.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_http::Request;
	///
	/// let request = Request::builder()
	/// 	.uri("/")
	/// 	.header("cookie", "theme=dark; _lectern_session=abc123")
	/// 	.build()
	/// 	.unwrap();
	///
	/// assert_eq!(request.cookie("_lectern_session"), Some("abc123".to_string()));
	/// assert_eq!(request.cookie("missing"), None);
	/// ```
	pub fn cookie(&self, name: &str) -> Option<String> {
		self.headers.get_all(COOKIE).iter().find_map(|header| {
			let header = header.to_str().ok()?;
			header.split(';').find_map(|pair| {
				let (key, value) = pair.trim().split_once('=')?;
				(key == name).then(|| value.to_string())
			})
		})
	}

	/// Parses the body as an HTML form.
	///
	/// Understands `application/x-www-form-urlencoded` and
	/// `multipart/form-data`. A request with no body yields an empty form.
	/// The parsed form is cached in the request extensions.
	pub async fn form(&self) -> Result<FormData> {
		if let Some(form) = self.extensions.get::<FormData>() {
			return Ok(form);
		}
		let form = FormData::from_request(self).await?;
		self.extensions.insert(form.clone());
		Ok(form)
	}
}

/// Builder for [`Request`], used by the server edge and by tests.
#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	uri: String,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
	remote_addr: Option<SocketAddr>,
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: "/".to_string(),
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			remote_addr: None,
		}
	}
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Appends a header; invalid names or values are ignored.
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.append(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
		self.remote_addr = Some(addr);
		self
	}

	pub fn build(self) -> Result<Request> {
		let uri: Uri = self
			.uri
			.parse()
			.map_err(|e| Error::BadRequest(format!("invalid uri '{}': {}", self.uri, e)))?;
		let query_params = Request::parse_query_params(&uri);
		Ok(Request {
			method: self.method,
			uri,
			version: self.version,
			headers: self.headers,
			body: self.body,
			path_params: HashMap::new(),
			query_params,
			remote_addr: self.remote_addr,
			extensions: Extensions::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_query_first_value_wins() {
		let request = Request::builder()
			.uri("/articles?page=2&page=9")
			.build()
			.unwrap();

		assert_eq!(request.query("page"), Some("2"));
	}

	#[rstest]
	fn test_invalid_uri_is_bad_request() {
		let result = Request::builder().uri("http://[::1").build();

		assert!(matches!(result, Err(Error::BadRequest(_))));
	}

	#[rstest]
	#[case("42", Some(42))]
	#[case("abc", None)]
	#[case("-1", Some(-1))]
	fn test_path_param_as(#[case] raw: &str, #[case] expected: Option<i64>) {
		// Arrange
		let mut request = Request::builder().uri("/articles/x").build().unwrap();
		request.set_path_param("id", raw);

		// Act
		let parsed = request.path_param_as::<i64>("id");

		// Assert
		match expected {
			Some(id) => assert_eq!(parsed.unwrap(), id),
			None => assert!(matches!(parsed, Err(Error::NotFound(_)))),
		}
	}

	#[rstest]
	fn test_path_param_is_decoded() {
		let mut request = Request::builder().uri("/").build().unwrap();
		request.set_path_param("key", "a%20b");

		assert_eq!(request.path_param("key").as_deref(), Some("a b"));
	}

	#[rstest]
	fn test_cookie_across_multiple_headers() {
		let request = Request::builder()
			.uri("/")
			.header("cookie", "a=1")
			.header("cookie", "b=2")
			.build()
			.unwrap();

		assert_eq!(request.cookie("b"), Some("2".to_string()));
	}
}
