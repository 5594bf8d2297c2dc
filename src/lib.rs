//! # Lectern
//!
//! A small content-management blog. Signed-in users write articles filed
//! under categories, attach an image, and moderate comments; visitors read,
//! search and comment.
//!
//! The workspace crates supply the pieces: `lectern-http` and
//! `lectern-urls` for requests and routing, `lectern-middleware` and
//! `lectern-auth` for sessions and the sign-in gate, `lectern-db` for the
//! records, `lectern-storages` for uploaded images and `lectern-conf` for
//! settings. This crate wires them into the application:
//!
//! ```rust,no_run
//! use lectern::{AppState, build_app};
//! use lectern_conf::Settings;
//!
//! # async fn run() -> lectern_core::Result<()> {
//! let settings = Settings::load()?;
//! let state = AppState::from_settings(&settings).await?;
//! let app = build_app(state)?;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod apps;
pub mod shortcuts;
pub mod state;
pub mod templates;
pub mod urls;

pub use state::AppState;

use lectern_core::Result;
use lectern_http::{Handler, MiddlewareChain};
use lectern_middleware::{LoggingMiddleware, MethodOverrideMiddleware, SessionMiddleware};
use std::sync::Arc;

/// The router wrapped in logging, session and method-override middleware,
/// in that order from the outside in.
pub fn build_app(state: AppState) -> Result<Arc<dyn Handler>> {
	templates::engine()?;

	let sessions = SessionMiddleware::new(state.sessions.clone(), state.session_config.clone());
	let router = urls::routes(Arc::new(state))?;

	let chain = MiddlewareChain::new(Arc::new(router))
		.with_middleware(Arc::new(LoggingMiddleware::new()))
		.with_middleware(Arc::new(sessions))
		.with_middleware(Arc::new(MethodOverrideMiddleware::new()));
	Ok(Arc::new(chain))
}
