use async_trait::async_trait;
use hyper::Method;
use lectern_http::{Handler, Middleware, Request, Response, Result};
use std::sync::Arc;

/// Form field carrying the intended method.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Lets HTML forms issue `PATCH`, `PUT` and `DELETE`.
///
/// A `POST` whose form body has `_method=patch|put|delete` (any case) is
/// dispatched as that method. Other values are ignored.
#[derive(Debug, Default)]
pub struct MethodOverrideMiddleware;

impl MethodOverrideMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for MethodOverrideMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let form = request.form().await?;
		let overridden = form.get(METHOD_OVERRIDE_FIELD).and_then(|value| {
			match value.trim().to_ascii_uppercase().as_str() {
				"PATCH" => Some(Method::PATCH),
				"PUT" => Some(Method::PUT),
				"DELETE" => Some(Method::DELETE),
				_ => None,
			}
		});

		if let Some(method) = overridden {
			tracing::debug!(%method, path = request.path(), "method override");
			request.method = method;
		}

		next.handle(request).await
	}

	fn should_continue(&self, request: &Request) -> bool {
		request.method == Method::POST
	}
}
