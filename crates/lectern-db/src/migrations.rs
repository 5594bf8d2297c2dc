//! Embedded schema migrations.
//!
//! Migrations are applied in version order, each inside its own
//! transaction, and recorded in `schema_migrations`. Applying is
//! idempotent: versions already recorded are skipped.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{DatabaseError, Result};

#[derive(Debug, Clone, Copy)]
pub struct Migration {
	pub version: i64,
	pub name: &'static str,
	pub statements: &'static [&'static str],
}

pub const MIGRATIONS: &[Migration] = &[
	Migration {
		version: 1,
		name: "create_categories_articles_comments",
		statements: &[
			"CREATE TABLE categories (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				name TEXT NOT NULL UNIQUE,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)",
			"CREATE TABLE articles (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				title TEXT NOT NULL,
				body TEXT NOT NULL,
				status TEXT NOT NULL DEFAULT 'public',
				category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)",
			"CREATE INDEX idx_articles_category_id ON articles(category_id)",
			"CREATE TABLE comments (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				commenter TEXT NOT NULL,
				body TEXT NOT NULL,
				status TEXT NOT NULL DEFAULT 'public',
				article_id INTEGER NOT NULL REFERENCES articles(id),
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)",
			"CREATE INDEX idx_comments_article_id ON comments(article_id)",
		],
	},
	Migration {
		version: 2,
		name: "create_users",
		statements: &["CREATE TABLE users (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				name TEXT NOT NULL,
				email TEXT NOT NULL UNIQUE,
				password_digest TEXT NOT NULL,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)"],
	},
	Migration {
		version: 3,
		name: "create_article_images",
		statements: &["CREATE TABLE article_images (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				article_id INTEGER NOT NULL UNIQUE REFERENCES articles(id),
				storage_key TEXT NOT NULL,
				filename TEXT NOT NULL,
				content_type TEXT NOT NULL,
				byte_size INTEGER NOT NULL,
				created_at TEXT NOT NULL
			)"],
	},
	Migration {
		version: 4,
		name: "add_articles_title_search",
		statements: &[
			"ALTER TABLE articles ADD COLUMN title_search TEXT NOT NULL DEFAULT ''",
			"UPDATE articles SET title_search = LOWER(title)",
		],
	},
];

async fn ensure_schema_table(pool: &SqlitePool) -> Result<()> {
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS schema_migrations (
			version INTEGER PRIMARY KEY NOT NULL,
			name TEXT NOT NULL,
			applied_at TEXT NOT NULL
		)",
	)
	.execute(pool)
	.await?;
	Ok(())
}

/// Versions recorded in `schema_migrations`, ascending.
pub async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>> {
	ensure_schema_table(pool).await?;
	let versions = sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
		.fetch_all(pool)
		.await?;
	Ok(versions)
}

/// Applies every pending migration and returns the versions applied.
pub async fn migrate(pool: &SqlitePool) -> Result<Vec<i64>> {
	let applied = applied_versions(pool).await?;
	let mut newly_applied = Vec::new();

	for migration in MIGRATIONS {
		if applied.contains(&migration.version) {
			continue;
		}

		let wrap = |source: sqlx::Error| DatabaseError::Migration {
			version: migration.version,
			name: migration.name,
			source,
		};

		let mut tx = pool.begin().await?;
		for statement in migration.statements {
			sqlx::query(statement)
				.execute(&mut *tx)
				.await
				.map_err(wrap)?;
		}
		sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
			.bind(migration.version)
			.bind(migration.name)
			.bind(Utc::now())
			.execute(&mut *tx)
			.await
			.map_err(wrap)?;
		tx.commit().await.map_err(wrap)?;

		tracing::info!(version = migration.version, name = migration.name, "applied migration");
		newly_applied.push(migration.version);
	}

	Ok(newly_applied)
}
