//! Blog records and their queries.
//!
//! Each model exposes associated async functions taking the pool, in the
//! style `Article::find(&pool, id)`. Forms carry raw submitted values; their
//! validation produces [`ValidationErrors`](lectern_core::ValidationErrors)
//! with the same messages the templates show.

pub mod article;
pub mod category;
pub mod comment;
pub mod image;
pub mod status;
pub mod user;

pub use article::{Article, ArticleForm};
pub use category::{Category, CategoryForm};
pub use comment::{Comment, CommentForm};
pub use image::Image;
pub use status::Status;
pub use user::{SignUpForm, User};

#[cfg(test)]
pub(crate) mod test_support {
	use sqlx::SqlitePool;

	use crate::{connect, migrate};

	/// A migrated in-memory database.
	pub async fn database() -> SqlitePool {
		let pool = connect("sqlite::memory:")
			.await
			.expect("Failed to open in-memory database");
		migrate(&pool).await.expect("Failed to migrate");
		pool
	}
}
