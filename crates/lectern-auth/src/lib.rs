//! Authentication for Lectern.
//!
//! Two independent gates exist:
//!
//! - **Session authentication**: the signed-in user id lives in a
//!   server-side [`Session`], identified by a cookie. The session middleware
//!   turns it into a request-scoped [`CurrentUser`] that handlers read from
//!   request extensions.
//! - **Static credential**: [`BasicAuthCredential`] checks an
//!   `Authorization: Basic` header against one configured username and
//!   password in constant time.
//!
//! Passwords are hashed with [`Argon2Hasher`].

pub mod basic;
pub mod current_user;
pub mod database_store;
pub mod error;
pub mod hasher;
pub mod session;
pub mod store;

pub use basic::{BASIC_REALM, BasicAuthCredential};
pub use current_user::CurrentUser;
pub use database_store::DatabaseSessionStore;
pub use error::{AuthenticationError, SessionError};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use session::{
	SESSION_KEY_USER_ID, SESSION_KEY_USER_NAME, Session, SessionChanges, SessionHandle, SessionId,
};
pub use store::{InMemorySessionStore, SessionStore, start_auto_cleanup};
