//! Handler and middleware traits.
//!
//! A [`Handler`] turns a request into a response. A [`Middleware`] wraps
//! the next handler, so it can inspect or replace the request on the way
//! in and the response on the way out:
//!
//! ```rust
//! use async_trait::async_trait;
//! use lectern_http::{Handler, Middleware, Request, Response, Result};
//! use std::sync::Arc;
//!
//! struct PoweredBy;
//!
//! #[async_trait]
//! impl Middleware for PoweredBy {
//! 	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
//! 		let response = next.handle(request).await?;
//! 		Ok(response.with_header("x-powered-by", "lectern"))
//! 	}
//! }
//! ```

use async_trait::async_trait;
use lectern_core::exception::Result;
use std::sync::Arc;

use crate::{Request, Response};

#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

#[async_trait]
pub trait Middleware: Send + Sync {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;

	/// Return `false` to skip this middleware for `request`.
	fn should_continue(&self, _request: &Request) -> bool {
		true
	}
}

/// Middleware applied in insertion order around a final handler.
///
/// The first middleware added sees the request first and the response
/// last.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}

	pub fn len(&self) -> usize {
		self.middlewares.len()
	}

	pub fn is_empty(&self) -> bool {
		self.middlewares.is_empty()
	}
}

struct Link {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Link {
	async fn handle(&self, request: Request) -> Result<Response> {
		if self.middleware.should_continue(&request) {
			self.middleware.process(request, self.next.clone()).await
		} else {
			self.next.handle(request).await
		}
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut next: Arc<dyn Handler> = self.handler.clone();
		for middleware in self.middlewares.iter().rev() {
			let link: Arc<dyn Handler> = Arc::new(Link {
				middleware: middleware.clone(),
				next,
			});
			next = link;
		}
		next.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Mutex;

	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> Result<Response> {
			Ok(Response::ok().with_body(request.path().to_string()))
		}
	}

	struct Record {
		name: &'static str,
		log: Arc<Mutex<Vec<String>>>,
		skip_path: Option<&'static str>,
	}

	#[async_trait]
	impl Middleware for Record {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			self.log.lock().unwrap().push(format!("{} in", self.name));
			let response = next.handle(request).await;
			self.log.lock().unwrap().push(format!("{} out", self.name));
			response
		}

		fn should_continue(&self, request: &Request) -> bool {
			self.skip_path != Some(request.path())
		}
	}

	fn record(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Middleware> {
		Arc::new(Record {
			name,
			log: log.clone(),
			skip_path: None,
		})
	}

	#[rstest]
	#[tokio::test]
	async fn test_chain_order() {
		// Arrange
		let log = Arc::new(Mutex::new(Vec::new()));
		let chain = MiddlewareChain::new(Arc::new(Echo))
			.with_middleware(record("outer", &log))
			.with_middleware(record("inner", &log));
		let request = Request::builder().uri("/x").build().unwrap();

		// Act
		let response = chain.handle(request).await.unwrap();

		// Assert
		assert_eq!(response.text(), "/x");
		assert_eq!(
			*log.lock().unwrap(),
			vec!["outer in", "inner in", "inner out", "outer out"]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_should_continue_skips() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let chain = MiddlewareChain::new(Arc::new(Echo)).with_middleware(Arc::new(Record {
			name: "skipped",
			log: log.clone(),
			skip_path: Some("/health"),
		}));
		let request = Request::builder().uri("/health").build().unwrap();

		chain.handle(request).await.unwrap();

		assert!(log.lock().unwrap().is_empty());
	}
}
