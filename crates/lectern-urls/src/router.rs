use async_trait::async_trait;
use hyper::Method;
use lectern_core::exception::{Error, Result};
use lectern_http::{Handler, Request, Response};
use std::sync::Arc;

use crate::pattern::PathPattern;
use crate::route::Route;

/// Ordered route table; the first matching route wins.
///
/// # Examples
///
/// ```
/// use lectern_http::{Request, Response};
/// use lectern_urls::{Router, from_fn};
///
/// let router = Router::new()
/// 	.get("/articles/{id}", from_fn(|request: Request| async move {
/// 		Ok(Response::ok().with_body(request.path_param("id").unwrap_or_default()))
/// 	}))
/// 	.unwrap()
/// 	.name("article");
///
/// assert_eq!(router.reverse("article", &[("id", "5")]), Some("/articles/5".to_string()));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Router {
	routes: Vec<Route>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn route(mut self, method: Method, path: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		let pattern = PathPattern::new(path).map_err(Error::Internal)?;
		self.routes.push(Route::new(method, pattern, handler));
		Ok(self)
	}

	pub fn get(self, path: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		self.route(Method::GET, path, handler)
	}

	pub fn post(self, path: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		self.route(Method::POST, path, handler)
	}

	pub fn patch(self, path: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		self.route(Method::PATCH, path, handler)
	}

	pub fn put(self, path: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		self.route(Method::PUT, path, handler)
	}

	pub fn delete(self, path: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		self.route(Method::DELETE, path, handler)
	}

	/// Names the most recently added route.
	pub fn name(mut self, name: &str) -> Self {
		if let Some(route) = self.routes.last_mut() {
			route.name = Some(name.to_string());
		}
		self
	}

	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	/// Path of the route called `name`.
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
		self.routes
			.iter()
			.find(|route| route.name.as_deref() == Some(name))
			.and_then(|route| route.pattern.reverse(params))
	}

	fn normalize(path: &str) -> &str {
		if path.len() > 1 {
			path.strip_suffix('/').unwrap_or(path)
		} else {
			path
		}
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let path = Self::normalize(request.path()).to_string();
		let mut allowed: Vec<&Method> = Vec::new();

		for route in &self.routes {
			let Some(params) = route.pattern.matches(&path) else {
				continue;
			};
			if route.accepts(&request.method) {
				tracing::debug!(method = %request.method, path = %path, pattern = route.pattern.pattern(), "route matched");
				for (key, value) in params {
					request.set_path_param(key, value);
				}
				return route.handler.handle(request).await;
			}
			allowed.push(&route.method);
		}

		if allowed.is_empty() {
			Err(Error::NotFound(format!("no route for {}", path)))
		} else {
			Err(Error::MethodNotAllowed(format!(
				"{} {} (allowed: {})",
				request.method,
				path,
				allowed
					.iter()
					.map(|m| m.as_str())
					.collect::<Vec<_>>()
					.join(", ")
			)))
		}
	}
}
