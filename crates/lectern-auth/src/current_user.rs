//! The request-scoped signed-in user.

use crate::error::AuthenticationError;
use crate::session::{SESSION_KEY_USER_NAME, SessionHandle};

/// Who is making the request.
///
/// Built once per request by the session middleware and stored in request
/// extensions; handlers read it from there rather than from global state.
///
/// # Examples
///
/// ```
/// use lectern_auth::CurrentUser;
///
/// let user = CurrentUser::authenticated(5, "Alice");
/// assert_eq!(user.require().unwrap(), 5);
/// assert!(CurrentUser::anonymous().require().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser {
	user_id: Option<i64>,
	name: Option<String>,
}

impl CurrentUser {
	pub fn authenticated(user_id: i64, name: impl Into<String>) -> Self {
		Self {
			user_id: Some(user_id),
			name: Some(name.into()),
		}
	}

	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn from_session(session: &SessionHandle) -> Self {
		match session.user_id() {
			Some(user_id) => Self {
				user_id: Some(user_id),
				name: session.get::<String>(SESSION_KEY_USER_NAME),
			},
			None => Self::anonymous(),
		}
	}

	pub fn is_authenticated(&self) -> bool {
		self.user_id.is_some()
	}

	pub fn id(&self) -> Option<i64> {
		self.user_id
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// The user id, or `NotAuthenticated` for anonymous visitors.
	pub fn require(&self) -> Result<i64, AuthenticationError> {
		self.user_id.ok_or(AuthenticationError::NotAuthenticated)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::Session;
	use rstest::rstest;

	#[rstest]
	fn test_from_session_reads_login() {
		let handle = SessionHandle::new(None, Session::new());
		handle.login(9, "Bob");

		let user = CurrentUser::from_session(&handle);

		assert_eq!(user, CurrentUser::authenticated(9, "Bob"));
		assert_eq!(user.name(), Some("Bob"));
	}

	#[rstest]
	fn test_anonymous_without_login() {
		let user = CurrentUser::from_session(&SessionHandle::empty());

		assert!(!user.is_authenticated());
		assert_eq!(user.require(), Err(AuthenticationError::NotAuthenticated));
	}
}
