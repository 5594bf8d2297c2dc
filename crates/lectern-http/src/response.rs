use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue, LOCATION, SET_COOKIE};
use hyper::{HeaderMap, StatusCode};
use lectern_core::exception::Error;

/// HTTP response under construction.
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use lectern_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
	}

	pub fn unprocessable_entity() -> Self {
		Self::new(StatusCode::UNPROCESSABLE_ENTITY)
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// 302 Found.
	pub fn temporary_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::FOUND).with_location(location.as_ref())
	}

	/// 303 See Other: the follow-up request is always a GET, which is what
	/// a browser needs after a form POST, PATCH or DELETE.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::see_other("/articles/3");
	/// assert_eq!(response.status, StatusCode::SEE_OTHER);
	/// assert_eq!(response.location(), Some("/articles/3"));
	/// ```
	pub fn see_other(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::SEE_OTHER).with_location(location.as_ref())
	}

	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Sets an HTML body with a UTF-8 content type.
	pub fn with_html(self, html: impl Into<String>) -> Self {
		self.with_body(html.into())
			.with_header("content-type", "text/html; charset=utf-8")
	}

	/// Sets the header, replacing earlier values. Invalid names or values
	/// are ignored.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn with_location(mut self, location: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(location) {
			self.headers.insert(LOCATION, value);
		}
		self
	}

	/// Appends a `Set-Cookie` header, keeping any already present.
	pub fn add_cookie(&mut self, cookie: &str) {
		if let Ok(value) = HeaderValue::from_str(cookie) {
			self.headers.append(SET_COOKIE, value);
		}
	}

	pub fn location(&self) -> Option<&str> {
		self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
	}

	pub fn content_type(&self) -> Option<&str> {
		self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
	}

	pub fn is_redirect(&self) -> bool {
		self.status.is_redirection()
	}

	/// Body as text, lossily decoded.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

impl From<Error> for Response {
	fn from(error: Error) -> Self {
		let status =
			StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let mut response = Response::new(status).with_html(error_page(status, &error.public_message()));
		if let Error::Authentication(_) = error {
			response = response
				.with_header("www-authenticate", "Basic realm=\"Application\"")
				.with_body("HTTP Basic: Access denied.\n")
				.with_header("content-type", "text/plain; charset=utf-8");
		}
		response
	}
}

fn error_page(status: StatusCode, message: &str) -> String {
	let escaped = message
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;");
	format!(
		"<!DOCTYPE html>\n<html>\n<head><title>{code}</title></head>\n<body>\n<h1>{code} {reason}</h1>\n<p>{message}</p>\n</body>\n</html>\n",
		code = status.as_u16(),
		reason = status.canonical_reason().unwrap_or(""),
		message = escaped,
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_not_found_error_page() {
		// Act
		let response = Response::from(Error::NotFound("article 9".into()));

		// Assert
		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
		assert!(response.text().contains("doesn't exist"));
		assert!(!response.text().contains("article 9"));
	}

	#[rstest]
	fn test_authentication_error_challenges() {
		let response = Response::from(Error::Authentication("bad credentials".into()));

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert_eq!(
			response.headers.get("www-authenticate").unwrap(),
			"Basic realm=\"Application\""
		);
		assert_eq!(response.text(), "HTTP Basic: Access denied.\n");
	}

	#[rstest]
	fn test_cookies_accumulate() {
		let mut response = Response::ok();

		response.add_cookie("a=1");
		response.add_cookie("b=2");

		assert_eq!(response.headers.get_all(SET_COOKIE).iter().count(), 2);
	}

	#[rstest]
	fn test_internal_error_hides_details() {
		let response = Response::from(Error::Database("disk I/O error at /var/db".into()));

		assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(!response.text().contains("/var/db"));
	}
}
