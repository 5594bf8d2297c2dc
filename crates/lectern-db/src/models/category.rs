use chrono::{DateTime, Utc};
use lectern_core::ValidationErrors;
use lectern_core::validators::{PresenceValidator, TAKEN};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{DatabaseError, Result, is_foreign_key_violation, is_unique_violation};

/// Alert shown when a referenced category cannot be destroyed.
pub const CATEGORY_IN_USE: &str = "Cannot delete category while articles reference it.";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Category {
	pub id: i64,
	pub name: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryForm {
	pub name: String,
}

impl CategoryForm {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	fn validate(&self) -> Result<String> {
		let mut errors = ValidationErrors::new();
		errors.check("name", &PresenceValidator, self.name.as_str());
		errors.into_result()?;
		Ok(self.name.trim().to_string())
	}
}

impl Category {
	pub async fn all(pool: &SqlitePool) -> Result<Vec<Category>> {
		let categories = sqlx::query_as("SELECT * FROM categories ORDER BY name, id")
			.fetch_all(pool)
			.await?;
		Ok(categories)
	}

	pub async fn find(pool: &SqlitePool, id: i64) -> Result<Category> {
		sqlx::query_as("SELECT * FROM categories WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or_else(|| DatabaseError::not_found("Category", id))
	}

	pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool> {
		let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?;
		Ok(found.is_some())
	}

	/// Validates and inserts. A duplicate name, including one inserted
	/// concurrently, fails with "has already been taken".
	pub async fn create(pool: &SqlitePool, form: &CategoryForm) -> Result<Category> {
		let name = form.validate()?;
		let now = Utc::now();

		sqlx::query_as(
			"INSERT INTO categories (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING *",
		)
		.bind(&name)
		.bind(now)
		.bind(now)
		.fetch_one(pool)
		.await
		.map_err(name_taken)
	}

	pub async fn update(pool: &SqlitePool, id: i64, form: &CategoryForm) -> Result<Category> {
		Self::find(pool, id).await?;
		let name = form.validate()?;

		sqlx::query_as("UPDATE categories SET name = ?, updated_at = ? WHERE id = ? RETURNING *")
			.bind(&name)
			.bind(Utc::now())
			.bind(id)
			.fetch_optional(pool)
			.await
			.map_err(name_taken)?
			.ok_or_else(|| DatabaseError::not_found("Category", id))
	}

	/// Deletes the category unless articles still reference it.
	///
	/// A single statement: the `ON DELETE RESTRICT` key on
	/// `articles.category_id` refuses the delete atomically, including
	/// against an article inserted concurrently.
	pub async fn destroy(pool: &SqlitePool, id: i64) -> Result<()> {
		let result = sqlx::query("DELETE FROM categories WHERE id = ?")
			.bind(id)
			.execute(pool)
			.await
			.map_err(|e| {
				if is_foreign_key_violation(&e) {
					DatabaseError::Restricted(CATEGORY_IN_USE.to_string())
				} else {
					e.into()
				}
			})?;
		if result.rows_affected() == 0 {
			return Err(DatabaseError::not_found("Category", id));
		}

		tracing::info!(category_id = id, "category destroyed");
		Ok(())
	}
}

fn name_taken(err: sqlx::Error) -> DatabaseError {
	if is_unique_violation(&err) {
		DatabaseError::invalid("name", TAKEN)
	} else {
		err.into()
	}
}
