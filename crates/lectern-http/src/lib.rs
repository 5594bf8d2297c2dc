//! HTTP primitives for Lectern.
//!
//! [`Request`] and [`Response`] are plain owned values; hyper types stay at
//! the server edge. Handlers and middleware are async traits composed with
//! [`MiddlewareChain`].
//!
//! ```rust
//! use async_trait::async_trait;
//! use lectern_http::{Handler, Request, Response, Result};
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//! 	async fn handle(&self, _request: Request) -> Result<Response> {
//! 		Ok(Response::ok().with_body("Hello!"))
//! 	}
//! }
//! ```

pub mod extensions;
pub mod form;
pub mod middleware;
pub mod request;
pub mod response;
pub mod upload;

pub use extensions::Extensions;
pub use form::{FormData, FormScope};
pub use lectern_core::exception::{Error, Result};
pub use middleware::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use upload::{UploadedFile, validate_safe_filename};
