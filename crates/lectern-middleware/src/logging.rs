use async_trait::async_trait;
use lectern_http::{Handler, Middleware, Request, Response, Result};
use std::sync::Arc;
use std::time::Instant;

/// Logs method, path, status and elapsed time for every request.
///
/// 4xx responses are logged at `warn`, 5xx at `error`, everything else at
/// `info`.
#[derive(Debug, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Instant::now();
		let method = request.method.clone();
		let path = request.path().to_string();

		let result = next.handle(request).await;
		let elapsed_ms = start.elapsed().as_millis() as u64;

		let status = match &result {
			Ok(response) => response.status.as_u16(),
			Err(err) => err.status_code(),
		};

		match status {
			500..=599 => match &result {
				Err(err) => tracing::error!(%method, %path, status, elapsed_ms, error = %err, "request failed"),
				Ok(_) => tracing::error!(%method, %path, status, elapsed_ms, "request failed"),
			},
			400..=499 => tracing::warn!(%method, %path, status, elapsed_ms, "request rejected"),
			_ => tracing::info!(%method, %path, status, elapsed_ms, "request completed"),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use lectern_core::Error;
	use rstest::rstest;

	struct Fixed(Option<u16>);

	#[async_trait]
	impl Handler for Fixed {
		async fn handle(&self, _request: Request) -> Result<Response> {
			match self.0 {
				Some(code) => Ok(Response::new(hyper::StatusCode::from_u16(code).unwrap())),
				None => Err(Error::Internal("boom".into())),
			}
		}
	}

	#[rstest]
	#[case(Some(200))]
	#[case(Some(404))]
	#[case(Some(503))]
	#[tokio::test]
	async fn test_passes_response_through(#[case] code: Option<u16>) {
		let request = Request::builder().uri("/articles").build().unwrap();

		let response = LoggingMiddleware::new()
			.process(request, Arc::new(Fixed(code)))
			.await
			.unwrap();

		assert_eq!(Some(response.status.as_u16()), code);
	}

	#[rstest]
	#[tokio::test]
	async fn test_passes_error_through() {
		let request = Request::builder().uri("/").build().unwrap();

		let result = LoggingMiddleware::new()
			.process(request, Arc::new(Fixed(None)))
			.await;

		assert!(matches!(result, Err(Error::Internal(_))));
	}
}
