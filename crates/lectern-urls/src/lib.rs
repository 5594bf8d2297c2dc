//! URL routing.
//!
//! Routes pair an HTTP method and a path pattern such as
//! `/articles/{article_id}/comments/{id}` with a handler. The [`Router`]
//! is itself a [`Handler`](lectern_http::Handler): it captures path
//! parameters into the request and dispatches, answering 404 for unknown
//! paths and 405 for known paths with the wrong method.

pub mod handler;
pub mod pattern;
pub mod route;
pub mod router;

pub use handler::{FnHandler, from_fn};
pub use pattern::PathPattern;
pub use route::Route;
pub use router::Router;
