//! Session store trait and the in-memory backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::SessionError;
use crate::session::{Session, SessionId};

/// Session store trait for different backends
///
/// Expired sessions are reported as absent by `load`.
#[async_trait]
pub trait SessionStore: Send + Sync {
	/// Load session data by session ID
	async fn load(&self, session_id: &str) -> Result<Option<Session>, SessionError>;

	/// Save session data, resetting its expiry
	async fn save(&self, session_id: &str, session: &Session) -> Result<(), SessionError>;

	/// Delete session data
	async fn delete(&self, session_id: &str) -> Result<(), SessionError>;

	/// Remove every expired session, returning how many went
	async fn cleanup_expired(&self) -> Result<u64, SessionError>;

	/// Create a new session ID
	fn create_session_id(&self) -> SessionId {
		Uuid::new_v4().to_string()
	}
}

/// In-memory session store for testing and development
///
/// # Examples
///
/// ```
/// use lectern_auth::{InMemorySessionStore, SessionStore};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
/// 	let store = InMemorySessionStore::new(Duration::from_secs(60));
/// 	let session_id = store.create_session_id();
///
/// 	assert!(store.load(&session_id).await.unwrap().is_none());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
	sessions: Arc<Mutex<HashMap<SessionId, (Session, Instant)>>>,
	ttl: Duration,
}

impl InMemorySessionStore {
	pub fn new(ttl: Duration) -> Self {
		Self {
			sessions: Arc::new(Mutex::new(HashMap::new())),
			ttl,
		}
	}

	pub async fn len(&self) -> usize {
		self.sessions.lock().await.len()
	}
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
	async fn load(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
		let mut sessions = self.sessions.lock().await;
		match sessions.get(session_id) {
			Some((_, expires_at)) if *expires_at <= Instant::now() => {
				sessions.remove(session_id);
				Ok(None)
			}
			Some((session, _)) => Ok(Some(session.clone())),
			None => Ok(None),
		}
	}

	async fn save(&self, session_id: &str, session: &Session) -> Result<(), SessionError> {
		let expires_at = Instant::now() + self.ttl;
		self.sessions
			.lock()
			.await
			.insert(session_id.to_string(), (session.clone(), expires_at));
		Ok(())
	}

	async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
		self.sessions.lock().await.remove(session_id);
		Ok(())
	}

	async fn cleanup_expired(&self) -> Result<u64, SessionError> {
		let now = Instant::now();
		let mut sessions = self.sessions.lock().await;
		let before = sessions.len();
		sessions.retain(|_, (_, expires_at)| *expires_at > now);
		Ok((before - sessions.len()) as u64)
	}
}

/// Start automatic cleanup of expired sessions
///
/// Spawns a background task that purges `store` every `interval`. The first
/// sweep runs immediately. Failures are logged and the task keeps going.
///
/// # Panics
///
/// Panics if `interval` is zero.
pub fn start_auto_cleanup(store: Arc<dyn SessionStore>, interval: Duration) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut interval_timer = tokio::time::interval(interval);
		loop {
			interval_timer.tick().await;
			match store.cleanup_expired().await {
				Ok(0) => {}
				Ok(removed) => tracing::info!(removed, "expired sessions purged"),
				Err(e) => tracing::warn!(error = %e, "session cleanup failed"),
			}
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[tokio::test]
	async fn test_save_load_delete() {
		// Arrange
		let store = InMemorySessionStore::new(Duration::from_secs(60));
		let id = store.create_session_id();
		let mut session = Session::new();
		session.set("k", json!("v"));

		// Act
		store.save(&id, &session).await.unwrap();
		let loaded = store.load(&id).await.unwrap();

		// Assert
		assert_eq!(loaded, Some(session));
		store.delete(&id).await.unwrap();
		assert_eq!(store.load(&id).await.unwrap(), None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_expired_session_is_absent() {
		let store = InMemorySessionStore::new(Duration::ZERO);
		store.save("id", &Session::new()).await.unwrap();

		let loaded = store.load("id").await.unwrap();

		assert_eq!(loaded, None);
		assert_eq!(store.len().await, 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_cleanup_removes_only_expired() {
		// Arrange
		let expired = InMemorySessionStore::new(Duration::ZERO);
		let live = InMemorySessionStore {
			sessions: expired.sessions.clone(),
			ttl: Duration::from_secs(60),
		};
		expired.save("stale-1", &Session::new()).await.unwrap();
		expired.save("stale-2", &Session::new()).await.unwrap();
		live.save("fresh", &Session::new()).await.unwrap();

		// Act
		let removed = live.cleanup_expired().await.unwrap();

		// Assert
		assert_eq!(removed, 2);
		assert_eq!(live.len().await, 1);
		assert!(live.load("fresh").await.unwrap().is_some());
	}

	#[rstest]
	#[tokio::test]
	async fn test_auto_cleanup_sweeps_without_loads() {
		// Arrange
		let store = InMemorySessionStore::new(Duration::ZERO);
		for id in ["a", "b", "c"] {
			store.save(id, &Session::new()).await.unwrap();
		}

		// Act
		let task = start_auto_cleanup(Arc::new(store.clone()), Duration::from_millis(10));
		tokio::time::sleep(Duration::from_millis(50)).await;
		task.abort();

		// Assert
		assert_eq!(store.len().await, 0);
	}

	#[rstest]
	fn test_session_ids_are_unique() {
		let store = InMemorySessionStore::new(Duration::from_secs(1));

		assert_ne!(store.create_session_id(), store.create_session_id());
	}
}
