use hyper::Method;
use lectern_http::Handler;
use std::sync::Arc;

use crate::pattern::PathPattern;

/// One method + path pattern bound to a handler.
#[derive(Clone)]
pub struct Route {
	pub method: Method,
	pub pattern: PathPattern,
	pub handler: Arc<dyn Handler>,
	pub name: Option<String>,
}

impl Route {
	pub fn new(method: Method, pattern: PathPattern, handler: Arc<dyn Handler>) -> Self {
		Self {
			method,
			pattern,
			handler,
			name: None,
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// HEAD is served by the GET route.
	pub fn accepts(&self, method: &Method) -> bool {
		self.method == *method || (*method == Method::HEAD && self.method == Method::GET)
	}
}

impl std::fmt::Debug for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Route")
			.field("method", &self.method)
			.field("pattern", &self.pattern.pattern())
			.field("name", &self.name)
			.finish()
	}
}
