//! Connection pool construction.

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::Result;

const MAX_CONNECTIONS: u32 = 5;

/// Opens a pool for `url`, creating the database file if needed.
///
/// Foreign keys are enforced on every connection. An in-memory database
/// (`sqlite::memory:`) lives inside its connection, so such a pool holds
/// exactly one connection that is never recycled.
///
/// # Examples
///
/// ```
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let pool = lectern_db::connect("sqlite::memory:").await.unwrap();
/// assert!(!pool.is_closed());
/// # });
/// ```
pub async fn connect(url: &str) -> Result<SqlitePool> {
	let in_memory = url.contains(":memory:") || url.contains("mode=memory");

	let mut options = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.foreign_keys(true)
		.busy_timeout(Duration::from_secs(5));
	if !in_memory {
		options = options.journal_mode(SqliteJournalMode::Wal);
	}

	let pool_options = if in_memory {
		SqlitePoolOptions::new()
			.min_connections(1)
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
	} else {
		SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
	};

	let pool = pool_options.connect_with(options).await?;
	tracing::info!(in_memory, "database pool ready");
	Ok(pool)
}
