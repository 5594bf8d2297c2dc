//! # lectern-storages
//!
//! Blob storage for article attachments.
//!
//! Every backend implements [`StorageBackend`]; the application only ever
//! holds an `Arc<dyn StorageBackend>` built by [`create_storage`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use lectern_storages::{StorageBackend, StorageConfig, create_storage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! 	let storage = create_storage(StorageConfig::local("storage"))?;
//!
//! 	storage.save("3f2a/cover.png", b"\x89PNG").await?;
//! 	let content = storage.open("3f2a/cover.png").await?;
//! 	assert_eq!(content, b"\x89PNG");
//!
//! 	Ok(())
//! }
//! ```

pub mod backend;
pub mod backends;
pub mod config;
pub mod error;
pub mod factory;

pub use backend::StorageBackend;
pub use backends::{InMemoryStorage, LocalStorage};
pub use config::{BackendType, LocalConfig, StorageConfig};
pub use error::{Result, StorageError};
pub use factory::create_storage;
