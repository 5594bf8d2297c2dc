//! Closure-backed handlers.

use async_trait::async_trait;
use lectern_core::exception::Result;
use lectern_http::{Handler, Request, Response};
use std::future::Future;
use std::sync::Arc;

/// Adapts an async closure into a [`Handler`].
pub struct FnHandler<F> {
	f: F,
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
	F: Fn(Request) -> Fut + Send + Sync,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	async fn handle(&self, request: Request) -> Result<Response> {
		(self.f)(request).await
	}
}

/// Wraps `f` as a shareable handler.
///
/// # Examples
///
/// ```
/// use lectern_http::Response;
/// use lectern_urls::from_fn;
///
/// let handler = from_fn(|_request| async { Ok(Response::ok().with_body("pong")) });
/// # let _ = handler;
/// ```
pub fn from_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
	F: Fn(Request) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	Arc::new(FnHandler { f })
}
