//! HTTP server for Lectern.
//!
//! ```rust,ignore
//! use lectern_server::{HttpServer, ShutdownCoordinator};
//! use std::time::Duration;
//!
//! let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
//! HttpServer::new(handler)
//! 	.with_max_body_bytes(10 * 1024 * 1024)
//! 	.listen_with_shutdown(addr, coordinator)
//! 	.await?;
//! ```

pub mod http;
pub mod shutdown;

pub use http::{HttpServer, ServerError};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
