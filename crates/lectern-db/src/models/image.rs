use chrono::{DateTime, Utc};
use lectern_http::UploadedFile;
use lectern_storages::StorageBackend;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::Result;

/// Validation message for an upload whose filename could escape storage.
pub const INVALID_FILENAME: &str = "has an invalid filename";

/// The image attached to an article. Bytes live in blob storage under
/// `storage_key`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Image {
	pub id: i64,
	pub article_id: i64,
	pub storage_key: String,
	pub filename: String,
	pub content_type: String,
	pub byte_size: i64,
	pub created_at: DateTime<Utc>,
}

impl Image {
	pub async fn for_article(pool: &SqlitePool, article_id: i64) -> Result<Option<Image>> {
		let image = sqlx::query_as("SELECT * FROM article_images WHERE article_id = ?")
			.bind(article_id)
			.fetch_optional(pool)
			.await?;
		Ok(image)
	}

	/// Reads the blob from storage.
	pub async fn read(&self, storage: &dyn StorageBackend) -> Result<Vec<u8>> {
		Ok(storage.open(&self.storage_key).await?)
	}

	/// `<uuid>/<filename>`, unique per upload.
	pub(crate) fn new_storage_key(filename: &str) -> String {
		format!("{}/{}", uuid::Uuid::new_v4(), filename)
	}

	pub(crate) async fn insert(
		conn: &mut SqliteConnection,
		article_id: i64,
		storage_key: &str,
		file: &UploadedFile,
	) -> Result<Image> {
		let image = sqlx::query_as(
			"INSERT INTO article_images (article_id, storage_key, filename, content_type, byte_size, created_at)
			VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
		)
		.bind(article_id)
		.bind(storage_key)
		.bind(&file.filename)
		.bind(&file.content_type)
		.bind(file.len() as i64)
		.bind(Utc::now())
		.fetch_one(&mut *conn)
		.await?;
		Ok(image)
	}

	/// Removes the attachment row, returning the storage key it pointed at.
	pub(crate) async fn delete_for_article(
		conn: &mut SqliteConnection,
		article_id: i64,
	) -> Result<Option<String>> {
		let key = sqlx::query_scalar("DELETE FROM article_images WHERE article_id = ? RETURNING storage_key")
			.bind(article_id)
			.fetch_optional(&mut *conn)
			.await?;
		Ok(key)
	}
}

/// Deletes a blob, treating an already-missing blob as deleted.
pub(crate) async fn delete_blob(storage: &dyn StorageBackend, key: &str) -> Result<()> {
	match storage.delete(key).await {
		Ok(()) => Ok(()),
		Err(e) if e.is_not_found() => {
			tracing::debug!(key, "blob already absent");
			Ok(())
		}
		Err(e) => Err(e.into()),
	}
}
