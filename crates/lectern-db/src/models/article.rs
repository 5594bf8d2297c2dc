use chrono::{DateTime, Utc};
use lectern_core::validators::{LengthValidator, MUST_EXIST, PresenceValidator};
use lectern_core::{Page, Paginator, ValidationErrors};
use lectern_http::{FormData, UploadedFile, validate_safe_filename};
use lectern_storages::StorageBackend;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::category::Category;
use super::image::{INVALID_FILENAME, Image, delete_blob};
use super::status::Status;
use crate::error::{DatabaseError, Result, is_foreign_key_violation};
use crate::search::{fold, like_pattern};

/// Minimum body length, in characters.
pub const BODY_MIN_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Article {
	pub id: i64,
	pub title: String,
	pub body: String,
	pub status: Status,
	pub category_id: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Submitted article fields.
///
/// `None` means the field was not part of the submission: on update it
/// keeps the stored value, on create it counts as blank (or `public` for
/// the status).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleForm {
	pub title: Option<String>,
	pub body: Option<String>,
	pub status: Option<String>,
	pub category_id: Option<String>,
	#[serde(skip)]
	pub image: Option<UploadedFile>,
}

impl ArticleForm {
	pub fn new(title: impl Into<String>, body: impl Into<String>, category_id: i64) -> Self {
		Self {
			title: Some(title.into()),
			body: Some(body.into()),
			status: None,
			category_id: Some(category_id.to_string()),
			image: None,
		}
	}

	pub fn with_status(mut self, status: impl Into<String>) -> Self {
		self.status = Some(status.into());
		self
	}

	pub fn with_image(mut self, image: UploadedFile) -> Self {
		self.image = Some(image);
		self
	}

	/// Reads the `article[...]` fields. A file input left empty is ignored.
	pub fn from_form(form: &FormData) -> Self {
		let scope = form.scope("article");
		Self {
			title: scope.get("title").map(str::to_string),
			body: scope.get("body").map(str::to_string),
			status: scope.get("status").map(str::to_string),
			category_id: scope.get("category_id").map(str::to_string),
			image: scope
				.file("image")
				.filter(|file| !(file.filename.is_empty() && file.is_empty()))
				.cloned(),
		}
	}

	/// Fills absent fields from `article`, so a form can be re-rendered.
	pub fn merged_with(&self, article: &Article) -> ArticleForm {
		ArticleForm {
			title: self.title.clone().or_else(|| Some(article.title.clone())),
			body: self.body.clone().or_else(|| Some(article.body.clone())),
			status: self
				.status
				.clone()
				.or_else(|| Some(article.status.as_str().to_string())),
			category_id: self
				.category_id
				.clone()
				.or_else(|| Some(article.category_id.to_string())),
			image: self.image.clone(),
		}
	}

	async fn validate(&self, pool: &SqlitePool, current: Option<&Article>) -> Result<ArticleValues> {
		let form = match current {
			Some(article) => self.merged_with(article),
			None => self.clone(),
		};
		let title = form.title.unwrap_or_default();
		let body = form.body.unwrap_or_default();
		let status_raw = form
			.status
			.unwrap_or_else(|| Status::default().as_str().to_string());

		let mut errors = ValidationErrors::new();
		errors.check("title", &PresenceValidator, title.as_str());
		errors.check("body", &PresenceValidator, body.as_str());
		errors.check("body", &LengthValidator::min(BODY_MIN_LENGTH), body.as_str());
		errors.check("status", &Status::VALIDATOR, status_raw.as_str());

		let category_id = form
			.category_id
			.as_deref()
			.and_then(|raw| raw.trim().parse::<i64>().ok());
		let category_exists = match category_id {
			Some(id) => Category::exists(pool, id).await?,
			None => false,
		};
		if !category_exists {
			errors.add("category", MUST_EXIST);
		}

		if let Some(file) = &self.image
			&& validate_safe_filename(&file.filename).is_err()
		{
			errors.add("image", INVALID_FILENAME);
		}

		match (category_id, status_raw.parse::<Status>()) {
			(Some(category_id), Ok(status)) if errors.is_empty() => Ok(ArticleValues {
				title,
				body,
				status,
				category_id,
			}),
			_ => Err(errors.into()),
		}
	}
}

struct ArticleValues {
	title: String,
	body: String,
	status: Status,
	category_id: i64,
}

impl Article {
	/// One page of articles, newest first. Archived articles are skipped
	/// unless `include_archived`.
	pub async fn page(
		pool: &SqlitePool,
		paginator: &Paginator,
		number: u32,
		include_archived: bool,
	) -> Result<Page<Article>> {
		let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE (? OR status != 'archived')")
			.bind(include_archived)
			.fetch_one(pool)
			.await?;

		let offset = i64::try_from(paginator.offset(number)).unwrap_or(i64::MAX);
		let items = sqlx::query_as(
			"SELECT * FROM articles WHERE (? OR status != 'archived') ORDER BY id DESC LIMIT ? OFFSET ?",
		)
		.bind(include_archived)
		.bind(i64::from(paginator.per_page()))
		.bind(offset)
		.fetch_all(pool)
		.await?;

		Ok(paginator.page(items, number, u64::try_from(total).unwrap_or(0)))
	}

	pub async fn find(pool: &SqlitePool, id: i64) -> Result<Article> {
		sqlx::query_as("SELECT * FROM articles WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or_else(|| DatabaseError::not_found("Article", id))
	}

	/// Like [`find`](Self::find), but an archived article is not found
	/// unless `include_archived`.
	pub async fn find_visible(pool: &SqlitePool, id: i64, include_archived: bool) -> Result<Article> {
		let article = Self::find(pool, id).await?;
		if article.status.is_archived() && !include_archived {
			return Err(DatabaseError::not_found("Article", id));
		}
		Ok(article)
	}

	pub async fn for_category(
		pool: &SqlitePool,
		category_id: i64,
		include_archived: bool,
	) -> Result<Vec<Article>> {
		let articles = sqlx::query_as(
			"SELECT * FROM articles WHERE category_id = ? AND (? OR status != 'archived') ORDER BY id DESC",
		)
		.bind(category_id)
		.bind(include_archived)
		.fetch_all(pool)
		.await?;
		Ok(articles)
	}

	/// Articles whose title contains `term`, case-insensitively, in
	/// insertion order. A blank term matches nothing.
	pub async fn search(pool: &SqlitePool, term: &str, include_archived: bool) -> Result<Vec<Article>> {
		let Some(pattern) = like_pattern(term) else {
			return Ok(Vec::new());
		};

		let articles = sqlx::query_as(
			"SELECT * FROM articles WHERE title_search LIKE ? ESCAPE '\\' AND (? OR status != 'archived') ORDER BY id",
		)
		.bind(pattern)
		.bind(include_archived)
		.fetch_all(pool)
		.await?;
		Ok(articles)
	}

	pub async fn public_count(pool: &SqlitePool) -> Result<i64> {
		let count = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE status = 'public'")
			.fetch_one(pool)
			.await?;
		Ok(count)
	}

	/// Validates and inserts the article, storing its image when one was
	/// uploaded.
	pub async fn create(
		pool: &SqlitePool,
		storage: &dyn StorageBackend,
		form: &ArticleForm,
	) -> Result<Article> {
		let values = form.validate(pool, None).await?;
		let now = Utc::now();

		let mut tx = pool.begin().await?;
		let article: Article = sqlx::query_as(
			"INSERT INTO articles (title, title_search, body, status, category_id, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
		)
		.bind(&values.title)
		.bind(fold(&values.title))
		.bind(&values.body)
		.bind(values.status)
		.bind(values.category_id)
		.bind(now)
		.bind(now)
		.fetch_one(&mut *tx)
		.await
		.map_err(category_missing)?;

		let stored = match &form.image {
			Some(file) => Some(attach(&mut *tx, storage, article.id, file).await?),
			None => None,
		};

		if let Err(e) = tx.commit().await {
			if let Some(key) = &stored {
				discard_blob(storage, key).await;
			}
			return Err(e.into());
		}

		tracing::info!(article_id = article.id, image = stored.is_some(), "article created");
		Ok(article)
	}

	/// Validates and updates the article. Fields absent from `form` keep
	/// their stored values; a new image replaces the previous one.
	pub async fn update(
		pool: &SqlitePool,
		storage: &dyn StorageBackend,
		id: i64,
		form: &ArticleForm,
	) -> Result<Article> {
		let current = Self::find(pool, id).await?;
		let values = form.validate(pool, Some(&current)).await?;

		let mut tx = pool.begin().await?;
		let article: Article = sqlx::query_as(
			"UPDATE articles SET title = ?, title_search = ?, body = ?, status = ?, category_id = ?, updated_at = ?
			WHERE id = ? RETURNING *",
		)
		.bind(&values.title)
		.bind(fold(&values.title))
		.bind(&values.body)
		.bind(values.status)
		.bind(values.category_id)
		.bind(Utc::now())
		.bind(id)
		.fetch_optional(&mut *tx)
		.await
		.map_err(category_missing)?
		.ok_or_else(|| DatabaseError::not_found("Article", id))?;

		let (replaced, stored) = match &form.image {
			Some(file) => {
				let replaced = Image::delete_for_article(&mut *tx, id).await?;
				let stored = attach(&mut *tx, storage, id, file).await?;
				(replaced, Some(stored))
			}
			None => (None, None),
		};

		if let Err(e) = tx.commit().await {
			if let Some(key) = &stored {
				discard_blob(storage, key).await;
			}
			return Err(e.into());
		}

		if let Some(key) = &replaced {
			discard_blob(storage, key).await;
		}
		tracing::info!(article_id = id, "article updated");
		Ok(article)
	}

	/// Deletes the article together with its comments, its image row and
	/// the stored blob, all inside one transaction.
	///
	/// A concurrent destroy of the same article waits on the write lock and
	/// then observes [`DatabaseError::NotFound`].
	pub async fn destroy(pool: &SqlitePool, storage: &dyn StorageBackend, id: i64) -> Result<()> {
		let mut tx = pool.begin().await?;

		// Takes the write lock and proves the row exists.
		let locked = sqlx::query("UPDATE articles SET updated_at = updated_at WHERE id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;
		if locked.rows_affected() == 0 {
			return Err(DatabaseError::not_found("Article", id));
		}

		let comments = sqlx::query("DELETE FROM comments WHERE article_id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?
			.rows_affected();

		let image_key = Image::delete_for_article(&mut *tx, id).await?;
		if let Some(key) = &image_key {
			delete_blob(storage, key).await?;
		}

		sqlx::query("DELETE FROM articles WHERE id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		tracing::info!(
			article_id = id,
			comments,
			image = image_key.is_some(),
			"article destroyed"
		);
		Ok(())
	}
}

/// Saves the upload and records it against `article_id`. The blob is
/// removed again if the row cannot be written.
async fn attach(
	conn: &mut SqliteConnection,
	storage: &dyn StorageBackend,
	article_id: i64,
	file: &UploadedFile,
) -> Result<String> {
	let key = Image::new_storage_key(&file.filename);
	storage.save(&key, &file.data).await?;

	if let Err(e) = Image::insert(conn, article_id, &key, file).await {
		discard_blob(storage, &key).await;
		return Err(e);
	}
	Ok(key)
}

async fn discard_blob(storage: &dyn StorageBackend, key: &str) {
	if let Err(e) = delete_blob(storage, key).await {
		tracing::warn!(key, error = %e, "failed to delete blob");
	}
}

fn category_missing(err: sqlx::Error) -> DatabaseError {
	if is_foreign_key_violation(&err) {
		DatabaseError::invalid("category", MUST_EXIST)
	} else {
		err.into()
	}
}
