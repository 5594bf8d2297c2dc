//! Database-backed session storage
//!
//! Sessions are persisted to a `sessions` table so they survive restarts.
//!
//! ```sql
//! CREATE TABLE sessions (
//!     session_key TEXT PRIMARY KEY,
//!     session_data TEXT NOT NULL,
//!     expire_date INTEGER NOT NULL,
//!     created_at INTEGER NOT NULL
//! );
//! ```
//!
//! Timestamps are Unix milliseconds.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;

use crate::error::SessionError;
use crate::session::Session;
use crate::store::SessionStore;

#[derive(Debug, Clone)]
pub struct DatabaseSessionStore {
	pool: SqlitePool,
	ttl: Duration,
}

impl DatabaseSessionStore {
	pub fn new(pool: SqlitePool, ttl: Duration) -> Self {
		Self { pool, ttl }
	}

	/// Creates the `sessions` table if it does not exist yet.
	pub async fn create_table(&self) -> Result<(), SessionError> {
		sqlx::query(
			"CREATE TABLE IF NOT EXISTS sessions (
				session_key TEXT PRIMARY KEY NOT NULL,
				session_data TEXT NOT NULL,
				expire_date INTEGER NOT NULL,
				created_at INTEGER NOT NULL
			)",
		)
		.execute(&self.pool)
		.await?;
		sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_expire_date ON sessions(expire_date)")
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	fn ttl_millis(&self) -> i64 {
		i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
	}
}

#[async_trait]
impl SessionStore for DatabaseSessionStore {
	async fn load(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
		let row: Option<(String, i64)> =
			sqlx::query_as("SELECT session_data, expire_date FROM sessions WHERE session_key = ?")
				.bind(session_id)
				.fetch_optional(&self.pool)
				.await?;

		let Some((data, expire_date)) = row else {
			return Ok(None);
		};

		if expire_date <= Utc::now().timestamp_millis() {
			tracing::debug!("dropping expired session");
			self.delete(session_id).await?;
			return Ok(None);
		}

		Ok(Some(serde_json::from_str(&data)?))
	}

	async fn save(&self, session_id: &str, session: &Session) -> Result<(), SessionError> {
		let now = Utc::now().timestamp_millis();
		let data = serde_json::to_string(session)?;

		sqlx::query(
			"INSERT INTO sessions (session_key, session_data, expire_date, created_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT(session_key) DO UPDATE SET
				session_data = excluded.session_data,
				expire_date = excluded.expire_date",
		)
		.bind(session_id)
		.bind(data)
		.bind(now.saturating_add(self.ttl_millis()))
		.bind(now)
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
		sqlx::query("DELETE FROM sessions WHERE session_key = ?")
			.bind(session_id)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	async fn cleanup_expired(&self) -> Result<u64, SessionError> {
		let result = sqlx::query("DELETE FROM sessions WHERE expire_date <= ?")
			.bind(Utc::now().timestamp_millis())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected())
	}
}
