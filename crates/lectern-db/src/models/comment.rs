use chrono::{DateTime, Utc};
use lectern_core::ValidationErrors;
use lectern_core::validators::PresenceValidator;
use lectern_http::FormData;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::article::Article;
use super::status::Status;
use crate::error::{DatabaseError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Comment {
	pub id: i64,
	pub commenter: String,
	pub body: String,
	pub status: Status,
	pub article_id: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentForm {
	pub commenter: String,
	pub body: String,
	/// `public` when not submitted.
	pub status: Option<String>,
}

impl CommentForm {
	pub fn new(commenter: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			commenter: commenter.into(),
			body: body.into(),
			status: None,
		}
	}

	pub fn with_status(mut self, status: impl Into<String>) -> Self {
		self.status = Some(status.into());
		self
	}

	/// Reads the `comment[...]` fields.
	pub fn from_form(form: &FormData) -> Self {
		let scope = form.scope("comment");
		Self {
			commenter: scope.string("commenter"),
			body: scope.string("body"),
			status: scope.get("status").map(str::to_string),
		}
	}

	fn validate(&self) -> Result<Status> {
		let status = self.status.as_deref().unwrap_or(Status::default().as_str());

		let mut errors = ValidationErrors::new();
		errors.check("commenter", &PresenceValidator, self.commenter.as_str());
		errors.check("body", &PresenceValidator, self.body.as_str());
		errors.check("status", &Status::VALIDATOR, status);

		match status.parse::<Status>() {
			Ok(status) if errors.is_empty() => Ok(status),
			_ => Err(errors.into()),
		}
	}
}

impl Comment {
	/// Comments shown on the article page, oldest first. Archived comments
	/// are never listed.
	pub async fn for_article(pool: &SqlitePool, article_id: i64) -> Result<Vec<Comment>> {
		let comments = sqlx::query_as(
			"SELECT * FROM comments WHERE article_id = ? AND status != 'archived' ORDER BY id",
		)
		.bind(article_id)
		.fetch_all(pool)
		.await?;
		Ok(comments)
	}

	/// Adds a comment under `article_id`, which must be visible to the
	/// commenter: archived articles only take comments from signed-in users.
	pub async fn create(
		pool: &SqlitePool,
		article_id: i64,
		form: &CommentForm,
		include_archived: bool,
	) -> Result<Comment> {
		Article::find_visible(pool, article_id, include_archived).await?;

		let status = form.validate()?;
		let now = Utc::now();
		let comment: Comment = sqlx::query_as(
			"INSERT INTO comments (commenter, body, status, article_id, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
		)
		.bind(&form.commenter)
		.bind(&form.body)
		.bind(status)
		.bind(article_id)
		.bind(now)
		.bind(now)
		.fetch_one(pool)
		.await?;

		tracing::debug!(article_id, comment_id = comment.id, "comment created");
		Ok(comment)
	}

	/// Deletes comment `id` of `article_id`. A comment attached to a
	/// different article is not found.
	pub async fn destroy(pool: &SqlitePool, article_id: i64, id: i64) -> Result<()> {
		let result = sqlx::query("DELETE FROM comments WHERE id = ? AND article_id = ?")
			.bind(id)
			.bind(article_id)
			.execute(pool)
			.await?;
		if result.rows_affected() == 0 {
			return Err(DatabaseError::not_found("Comment", id));
		}
		tracing::debug!(article_id, comment_id = id, "comment destroyed");
		Ok(())
	}
}
