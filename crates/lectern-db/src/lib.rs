//! SQLite persistence for Lectern.
//!
//! - [`pool`]: connection pool construction
//! - [`migrations`]: embedded, versioned schema migrations
//! - [`models`]: the blog's records and the queries over them
//!
//! Every query is parameterized; user input never becomes SQL text.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod search;

pub use error::{DatabaseError, Result};
pub use migrations::{MIGRATIONS, Migration, migrate};
pub use models::{
	Article, ArticleForm, Category, CategoryForm, Comment, CommentForm, Image, SignUpForm, Status,
	User,
};
pub use pool::connect;
pub use sqlx::SqlitePool;
