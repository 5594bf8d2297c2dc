//! Session data and the per-request handle that mutates it.

use lectern_core::messages::{FLASH_SESSION_KEY, Message};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Session ID type
pub type SessionId = String;

/// Session key holding the signed-in user's id
pub const SESSION_KEY_USER_ID: &str = "_auth_user_id";

/// Session key holding the signed-in user's display name
pub const SESSION_KEY_USER_NAME: &str = "_auth_user_name";

/// Session data stored in the backend
///
/// # Examples
///
/// ```
/// use lectern_auth::Session;
/// use serde_json::json;
///
/// let mut session = Session::new();
/// session.set("theme", json!("dark"));
/// assert_eq!(session.get("theme"), Some(&json!("dark")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
	pub data: HashMap<String, Value>,
}

impl Session {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&mut self, key: impl Into<String>, value: Value) {
		self.data.insert(key.into(), value);
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.data.get(key)
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.data.remove(key)
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn clear(&mut self) {
		self.data.clear();
	}

	pub fn user_id(&self) -> Option<i64> {
		self.get(SESSION_KEY_USER_ID).and_then(Value::as_i64)
	}
}

#[derive(Debug)]
struct HandleState {
	id: Option<SessionId>,
	session: Session,
	modified: bool,
	cycle: bool,
}

/// Shared, request-scoped view of the session.
///
/// The session middleware inserts one into request extensions before the
/// handler runs and persists whatever the handler changed afterwards.
/// Clones share state.
#[derive(Debug, Clone)]
pub struct SessionHandle {
	state: Arc<Mutex<HandleState>>,
}

/// What a request did to its session, read by the middleware after the handler.
#[derive(Debug, Clone)]
pub struct SessionChanges {
	/// Id the request arrived with, if its session existed.
	pub previous_id: Option<SessionId>,
	pub session: Session,
	pub modified: bool,
	/// The id must be replaced (sign-in, sign-out).
	pub cycle: bool,
}

impl SessionHandle {
	pub fn new(id: Option<SessionId>, session: Session) -> Self {
		Self {
			state: Arc::new(Mutex::new(HandleState {
				id,
				session,
				modified: false,
				cycle: false,
			})),
		}
	}

	/// A fresh session for a request that carried no valid cookie.
	pub fn empty() -> Self {
		Self::new(None, Session::new())
	}

	pub fn id(&self) -> Option<SessionId> {
		self.state.lock().id.clone()
	}

	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let state = self.state.lock();
		state
			.session
			.get(key)
			.and_then(|value| serde_json::from_value(value.clone()).ok())
	}

	pub fn insert(&self, key: &str, value: impl Serialize) -> lectern_core::Result<()> {
		let value = serde_json::to_value(value)?;
		let mut state = self.state.lock();
		state.session.set(key, value);
		state.modified = true;
		Ok(())
	}

	pub fn remove(&self, key: &str) {
		let mut state = self.state.lock();
		if state.session.remove(key).is_some() {
			state.modified = true;
		}
	}

	pub fn user_id(&self) -> Option<i64> {
		self.state.lock().session.user_id()
	}

	/// Stores the signed-in user and forces a new session id.
	pub fn login(&self, user_id: i64, name: &str) {
		let mut state = self.state.lock();
		state.session.set(SESSION_KEY_USER_ID, Value::from(user_id));
		state.session.set(SESSION_KEY_USER_NAME, Value::from(name));
		state.modified = true;
		state.cycle = true;
	}

	/// Drops all session data, including pending flash, and forces a new id.
	pub fn logout(&self) {
		let mut state = self.state.lock();
		state.session.clear();
		state.modified = true;
		state.cycle = true;
	}

	/// Queues a message for the next rendered page.
	pub fn flash(&self, message: Message) {
		let mut state = self.state.lock();
		let mut pending: Vec<Message> = state
			.session
			.get(FLASH_SESSION_KEY)
			.and_then(|value| serde_json::from_value(value.clone()).ok())
			.unwrap_or_default();
		pending.push(message);
		// Vec<Message> always serializes.
		if let Ok(value) = serde_json::to_value(pending) {
			state.session.set(FLASH_SESSION_KEY, value);
			state.modified = true;
		}
	}

	/// Removes and returns every pending message.
	pub fn take_flash(&self) -> Vec<Message> {
		let mut state = self.state.lock();
		match state.session.remove(FLASH_SESSION_KEY) {
			Some(value) => {
				state.modified = true;
				serde_json::from_value(value).unwrap_or_default()
			}
			None => Vec::new(),
		}
	}

	pub fn changes(&self) -> SessionChanges {
		let state = self.state.lock();
		SessionChanges {
			previous_id: state.id.clone(),
			session: state.session.clone(),
			modified: state.modified,
			cycle: state.cycle,
		}
	}
}
