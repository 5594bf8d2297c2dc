//! In-process client for driving the whole application in tests.
//!
//! Requests go straight into the middleware chain without a socket. The
//! client keeps the session cookie between calls like a browser would.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use hyper::Method;
use lectern::{AppState, build_app};
use lectern_conf::Settings;
use lectern_http::{Handler, Request, Response};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const BOUNDARY: &str = "----lectern-test-boundary";

/// Settings for a throwaway application: in-memory database, sessions and
/// image storage.
pub fn test_settings() -> Settings {
	Settings {
		database_url: "sqlite::memory:".to_string(),
		storage_backend: "memory".to_string(),
		session_store: "memory".to_string(),
		..Settings::default()
	}
}

pub struct TestClient {
	handler: Arc<dyn Handler>,
	state: AppState,
	cookies: Arc<RwLock<HashMap<String, String>>>,
	default_headers: Vec<(String, String)>,
}

impl TestClient {
	pub async fn new() -> Self {
		let state = AppState::from_settings(&test_settings()).await.unwrap();
		let handler = build_app(state.clone()).unwrap();
		Self {
			handler,
			state,
			cookies: Arc::new(RwLock::new(HashMap::new())),
			default_headers: Vec::new(),
		}
	}

	/// Shared state behind the application, for checking the database and
	/// storage directly.
	pub fn state(&self) -> &AppState {
		&self.state
	}

	/// Sends HTTP basic credentials with every following request.
	pub fn credentials(&mut self, username: &str, password: &str) {
		let encoded = STANDARD.encode(format!("{}:{}", username, password));
		self.set_header("authorization", &format!("Basic {}", encoded));
	}

	pub fn clear_auth(&mut self) {
		self.default_headers.retain(|(name, _)| name != "authorization");
	}

	pub fn set_header(&mut self, name: &str, value: &str) {
		self.default_headers.retain(|(n, _)| n != name);
		self.default_headers.push((name.to_string(), value.to_string()));
	}

	pub async fn clear_cookies(&self) {
		self.cookies.write().await.clear();
	}

	pub async fn request(
		&self,
		method: Method,
		uri: &str,
		content_type: Option<&str>,
		body: impl Into<Bytes>,
	) -> Response {
		let mut builder = Request::builder().method(method).uri(uri);
		for (name, value) in &self.default_headers {
			builder = builder.header(name, value);
		}
		if let Some(content_type) = content_type {
			builder = builder.header("content-type", content_type);
		}
		let cookie_header = self.cookie_header().await;
		if !cookie_header.is_empty() {
			builder = builder.header("cookie", &cookie_header);
		}
		let request = builder.body(body).build().unwrap();

		let response = match self.handler.handle(request).await {
			Ok(response) => response,
			Err(error) => Response::from(error),
		};
		self.store_cookies(&response).await;
		response
	}

	pub async fn get(&self, uri: &str) -> Response {
		self.request(Method::GET, uri, None, Bytes::new()).await
	}

	/// Posts url-encoded `fields`, the way an HTML form submits.
	pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response {
		self.request(
			Method::POST,
			uri,
			Some("application/x-www-form-urlencoded"),
			urlencode(fields),
		)
		.await
	}

	/// Posts `fields` plus one file as `multipart/form-data`.
	pub async fn post_multipart(
		&self,
		uri: &str,
		fields: &[(&str, &str)],
		file: (&str, &str, &str, &[u8]),
	) -> Response {
		let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
		self.request(Method::POST, uri, Some(&content_type), multipart(fields, file))
			.await
	}

	/// A form-driven delete: `POST` with `_method=delete`.
	pub async fn delete(&self, uri: &str) -> Response {
		self.post_form(uri, &[("_method", "delete")]).await
	}

	pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Response {
		self.post_form(
			"/users",
			&[
				("user[name]", name),
				("user[email]", email),
				("user[password]", password),
			],
		)
		.await
	}

	pub async fn sign_in(&self, email: &str, password: &str) -> Response {
		self.post_form(
			"/users/sign_in",
			&[("user[email]", email), ("user[password]", password)],
		)
		.await
	}

	/// Registers and signs in a fresh writer.
	pub async fn signed_in() -> Self {
		let client = Self::new().await;
		let response = client.sign_up("Ada", "ada@example.com", "hunter22").await;
		assert_eq!(response.status, 303, "sign-up failed: {}", response.text());
		client
	}

	/// Creates a category and returns its id.
	pub async fn create_category(&self, name: &str) -> i64 {
		let response = self.post_form("/categories", &[("category[name]", name)]).await;
		assert_eq!(response.status, 303, "category create failed: {}", response.text());
		id_from_location(&response)
	}

	/// Creates an article and returns its id.
	pub async fn create_article(&self, title: &str, body: &str, category_id: i64, status: &str) -> i64 {
		let category = category_id.to_string();
		let response = self
			.post_form(
				"/articles",
				&[
					("article[title]", title),
					("article[body]", body),
					("article[status]", status),
					("article[category_id]", &category),
				],
			)
			.await;
		assert_eq!(response.status, 303, "article create failed: {}", response.text());
		id_from_location(&response)
	}

	async fn cookie_header(&self) -> String {
		self.cookies
			.read()
			.await
			.iter()
			.map(|(name, value)| format!("{}={}", name, value))
			.collect::<Vec<_>>()
			.join("; ")
	}

	async fn store_cookies(&self, response: &Response) {
		let mut cookies = self.cookies.write().await;
		for header in response.headers.get_all("set-cookie") {
			let Ok(header) = header.to_str() else { continue };
			let mut parts = header.split(';').map(str::trim);
			let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
				continue;
			};
			let expired = parts.any(|attr| attr.eq_ignore_ascii_case("max-age=0"));
			if expired || value.is_empty() {
				cookies.remove(name);
			} else {
				cookies.insert(name.to_string(), value.to_string());
			}
		}
	}
}

/// Trailing numeric segment of the redirect target.
pub fn id_from_location(response: &Response) -> i64 {
	let location = response.location().unwrap();
	location.rsplit('/').next().unwrap().parse().unwrap()
}

pub fn urlencode(fields: &[(&str, &str)]) -> String {
	fields
		.iter()
		.map(|(name, value)| {
			format!(
				"{}={}",
				utf8_percent_encode(name, NON_ALPHANUMERIC),
				utf8_percent_encode(value, NON_ALPHANUMERIC)
			)
		})
		.collect::<Vec<_>>()
		.join("&")
}

fn multipart(fields: &[(&str, &str)], file: (&str, &str, &str, &[u8])) -> Bytes {
	let mut body = Vec::new();
	for (name, value) in fields {
		body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
		body.extend_from_slice(
			format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
		);
		body.extend_from_slice(value.as_bytes());
		body.extend_from_slice(b"\r\n");
	}

	let (name, filename, content_type, data) = file;
	body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
	body.extend_from_slice(
		format!(
			"Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
			name, filename
		)
		.as_bytes(),
	);
	body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
	body.extend_from_slice(data);
	body.extend_from_slice(b"\r\n");
	body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
	Bytes::from(body)
}
