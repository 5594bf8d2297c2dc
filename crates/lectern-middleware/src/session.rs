//! Session Middleware
//!
//! Loads the server-side session named by the session cookie, exposes it to
//! handlers as a [`SessionHandle`] plus a [`CurrentUser`] in request
//! extensions, and writes back whatever the handler changed.

use async_trait::async_trait;
use lectern_auth::{CurrentUser, SessionHandle, SessionStore};
use lectern_http::{Handler, Middleware, Request, Response, Result};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
	pub cookie_name: String,
	pub path: String,
	pub http_only: bool,
	pub secure: bool,
	pub same_site: Option<String>,
	pub ttl: Duration,
}

impl SessionConfig {
	pub fn new(cookie_name: impl Into<String>, ttl: Duration) -> Self {
		Self {
			cookie_name: cookie_name.into(),
			path: "/".to_string(),
			http_only: true,
			secure: false,
			same_site: Some("Lax".to_string()),
			ttl,
		}
	}

	pub fn with_secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}
}

pub struct SessionMiddleware {
	store: Arc<dyn SessionStore>,
	config: SessionConfig,
}

impl SessionMiddleware {
	pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
		Self { store, config }
	}

	fn build_cookie_header(&self, session_id: &str, max_age: Duration) -> String {
		let mut parts = vec![format!("{}={}", self.config.cookie_name, session_id)];

		parts.push(format!("Path={}", self.config.path));

		if self.config.http_only {
			parts.push("HttpOnly".to_string());
		}

		if self.config.secure {
			parts.push("Secure".to_string());
		}

		if let Some(same_site) = &self.config.same_site {
			parts.push(format!("SameSite={}", same_site));
		}

		parts.push(format!("Max-Age={}", max_age.as_secs()));

		parts.join("; ")
	}

	async fn load(&self, request: &Request) -> Result<SessionHandle> {
		let Some(id) = request.cookie(&self.config.cookie_name) else {
			return Ok(SessionHandle::empty());
		};
		match self.store.load(&id).await? {
			Some(session) => Ok(SessionHandle::new(Some(id), session)),
			None => Ok(SessionHandle::empty()),
		}
	}

	/// Persists the handle's changes and sets or expires the cookie.
	async fn commit(&self, handle: &SessionHandle, response: &mut Response) -> Result<()> {
		let changes = handle.changes();
		if !changes.modified && !changes.cycle {
			return Ok(());
		}

		if changes.cycle {
			if let Some(previous) = &changes.previous_id {
				self.store.delete(previous).await?;
			}
		}

		if changes.session.is_empty() {
			if let Some(previous) = &changes.previous_id {
				if !changes.cycle {
					self.store.delete(previous).await?;
				}
				response.add_cookie(&self.build_cookie_header("", Duration::ZERO));
			}
			return Ok(());
		}

		let id = match (&changes.previous_id, changes.cycle) {
			(Some(previous), false) => previous.clone(),
			_ => self.store.create_session_id(),
		};
		self.store.save(&id, &changes.session).await?;
		response.add_cookie(&self.build_cookie_header(&id, self.config.ttl));
		Ok(())
	}
}

#[async_trait]
impl Middleware for SessionMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let handle = self.load(&request).await?;
		request.extensions.insert(handle.clone());
		request.extensions.insert(CurrentUser::from_session(&handle));

		let mut response = next.handle(request).await?;
		self.commit(&handle, &mut response).await?;
		Ok(response)
	}
}
