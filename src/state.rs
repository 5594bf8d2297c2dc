//! Shared application state.

use lectern_auth::{
	Argon2Hasher, BasicAuthCredential, DatabaseSessionStore, InMemorySessionStore, PasswordHasher,
	SessionStore,
};
use lectern_conf::Settings;
use lectern_core::{Paginator, Result};
use lectern_db::{SqlitePool, connect, migrate};
use lectern_middleware::SessionConfig;
use lectern_storages::{StorageBackend, StorageConfig, create_storage};
use std::sync::Arc;

/// Everything the views need, built once at start-up and shared by every
/// request.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub storage: Arc<dyn StorageBackend>,
	pub sessions: Arc<dyn SessionStore>,
	pub session_config: SessionConfig,
	pub basic_auth: BasicAuthCredential,
	pub hasher: Arc<dyn PasswordHasher>,
	pub paginator: Paginator,
}

impl AppState {
	/// Opens the database, applies migrations and builds the configured
	/// session store and storage backend.
	pub async fn from_settings(settings: &Settings) -> Result<Self> {
		settings.validate()?;

		let pool = connect(&settings.database_url).await?;
		migrate(&pool).await?;

		let ttl = settings.session_ttl();
		let sessions: Arc<dyn SessionStore> = match settings.session_store.as_str() {
			"memory" => Arc::new(InMemorySessionStore::new(ttl)),
			_ => {
				let store = DatabaseSessionStore::new(pool.clone(), ttl);
				store.create_table().await?;
				Arc::new(store)
			}
		};
		let purged = sessions.cleanup_expired().await?;
		if purged > 0 {
			tracing::info!(purged, "expired sessions purged at start-up");
		}

		let media_root = settings.media_root.to_string_lossy();
		let storage = create_storage(StorageConfig::from_backend(
			&settings.storage_backend,
			&media_root,
		)?)?;

		tracing::info!(
			database = %settings.database_url,
			storage = %settings.storage_backend,
			sessions = %settings.session_store,
			"application state ready"
		);

		Ok(Self {
			pool,
			storage,
			sessions,
			session_config: SessionConfig::new(settings.session_cookie.clone(), ttl)
				.with_secure(settings.secure_cookies),
			basic_auth: BasicAuthCredential::new(
				settings.basic_auth_user.clone(),
				settings.basic_auth_password.clone(),
			),
			hasher: Arc::new(Argon2Hasher::new()),
			paginator: Paginator::new(settings.articles_per_page),
		})
	}
}
