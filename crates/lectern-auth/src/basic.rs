//! HTTP Basic credential check.

use base64::{Engine, engine::general_purpose::STANDARD};
use lectern_http::Request;
use subtle::ConstantTimeEq;

use crate::error::AuthenticationError;

/// Realm sent in the `WWW-Authenticate` challenge.
pub const BASIC_REALM: &str = "Application";

/// A single static username/password pair.
#[derive(Clone)]
pub struct BasicAuthCredential {
	username: String,
	password: String,
}

impl std::fmt::Debug for BasicAuthCredential {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BasicAuthCredential")
			.field("username", &self.username)
			.field("password", &"[REDACTED]")
			.finish()
	}
}

impl BasicAuthCredential {
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			password: password.into(),
		}
	}

	/// Checks the request's `Authorization: Basic` header.
	///
	/// Both fields are always compared so timing does not reveal which one
	/// was wrong.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_auth::BasicAuthCredential;
	/// use lectern_http::Request;
	///
	/// let credential = BasicAuthCredential::new("dhh", "secret");
	/// // "dhh:secret"
	/// let request = Request::builder()
	/// 	.header("Authorization", "Basic ZGhoOnNlY3JldA==")
	/// 	.build()
	/// 	.unwrap();
	///
	/// assert!(credential.verify(&request).is_ok());
	/// ```
	pub fn verify(&self, request: &Request) -> Result<(), AuthenticationError> {
		let (username, password) = request
			.header("Authorization")
			.and_then(parse_auth_header)
			.ok_or(AuthenticationError::InvalidCredentials)?;

		let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
		let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
		if bool::from(user_ok & pass_ok) {
			Ok(())
		} else {
			tracing::warn!(username = %username, "basic auth rejected");
			Err(AuthenticationError::InvalidCredentials)
		}
	}
}

fn parse_auth_header(header: &str) -> Option<(String, String)> {
	let encoded = header.strip_prefix("Basic ")?;
	let decoded = STANDARD.decode(encoded.trim()).ok()?;
	let decoded_str = String::from_utf8(decoded).ok()?;
	let (username, password) = decoded_str.split_once(':')?;
	Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn request_with_auth(value: Option<&str>) -> Request {
		let builder = Request::builder();
		let builder = match value {
			Some(value) => builder.header("Authorization", value),
			None => builder,
		};
		builder.build().unwrap()
	}

	fn encode(pair: &str) -> String {
		format!("Basic {}", STANDARD.encode(pair))
	}

	#[rstest]
	fn test_correct_credential_passes() {
		let credential = BasicAuthCredential::new("dhh", "secret");

		let result = credential.verify(&request_with_auth(Some(&encode("dhh:secret"))));

		assert!(result.is_ok());
	}

	#[rstest]
	#[case(None)]
	#[case(Some("Bearer abc".to_string()))]
	#[case(Some("Basic !!!not-base64".to_string()))]
	#[case(Some(encode("dhh")))]
	#[case(Some(encode("dhh:wrong")))]
	#[case(Some(encode("root:secret")))]
	#[case(Some(encode("dhh:secret2")))]
	fn test_bad_credentials_are_rejected(#[case] header: Option<String>) {
		let credential = BasicAuthCredential::new("dhh", "secret");

		let result = credential.verify(&request_with_auth(header.as_deref()));

		assert_eq!(result, Err(AuthenticationError::InvalidCredentials));
	}

	#[rstest]
	fn test_password_may_contain_colon() {
		let credential = BasicAuthCredential::new("dhh", "se:cret");

		assert!(credential.verify(&request_with_auth(Some(&encode("dhh:se:cret")))).is_ok());
	}

	#[rstest]
	fn test_debug_redacts_password() {
		let debug = format!("{:?}", BasicAuthCredential::new("dhh", "secret"));

		assert!(!debug.contains("secret"));
	}
}
