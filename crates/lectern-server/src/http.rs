use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use lectern_core::exception::Error;
use lectern_http::{Handler, Middleware, MiddlewareChain, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use crate::shutdown::ShutdownCoordinator;

/// Default request body limit (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		#[source]
		source: std::io::Error,
	},

	#[error("accept failed: {0}")]
	Accept(#[from] std::io::Error),
}

/// HTTP/1.1 server driving a [`Handler`] wrapped in middleware.
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	middlewares: Vec<Arc<dyn Middleware>>,
	max_body_bytes: usize,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
			max_body_bytes: DEFAULT_MAX_BODY_BYTES,
		}
	}

	/// Adds a middleware; the first one added runs outermost.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
		self.max_body_bytes = max_body_bytes;
		self
	}

	fn build_handler(&self) -> Arc<dyn Handler> {
		if self.middlewares.is_empty() {
			return self.handler.clone();
		}

		let mut chain = MiddlewareChain::new(self.handler.clone());
		for middleware in &self.middlewares {
			chain.add_middleware(middleware.clone());
		}
		Arc::new(chain)
	}

	/// Binds `addr` and serves until `coordinator` signals shutdown.
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> Result<(), ServerError> {
		let listener = TcpListener::bind(addr)
			.await
			.map_err(|source| ServerError::Bind { addr, source })?;
		self.serve(listener, coordinator).await
	}

	/// Serves connections from an already-bound listener.
	///
	/// Once shutdown is signalled no new connections are accepted; open
	/// connections finish their current request and close, bounded by the
	/// coordinator's grace period.
	pub async fn serve(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> Result<(), ServerError> {
		if let Ok(local) = listener.local_addr() {
			tracing::info!(addr = %local, "listening on http://{}", local);
		}

		let handler = self.build_handler();
		let max_body_bytes = self.max_body_bytes;
		let mut shutdown_rx = coordinator.subscribe();
		let mut connections = JoinSet::new();

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = match result {
						Ok(accepted) => accepted,
						Err(e) => {
							tracing::warn!(error = %e, "failed to accept connection");
							continue;
						}
					};
					let service = RequestService {
						handler: handler.clone(),
						remote_addr,
						max_body_bytes,
					};
					let conn_shutdown = coordinator.subscribe();
					connections.spawn(Self::handle_connection(stream, service, conn_shutdown));
					while connections.try_join_next().is_some() {}
				}
				_ = shutdown_rx.recv() => {
					tracing::info!("shutdown signal received, no longer accepting connections");
					break;
				}
			}
		}

		let drain = async { while connections.join_next().await.is_some() {} };
		if tokio::time::timeout(coordinator.grace_period(), drain).await.is_err() {
			tracing::warn!(
				remaining = connections.len(),
				"grace period elapsed, aborting open connections"
			);
			connections.abort_all();
		}
		tracing::info!("server stopped");
		Ok(())
	}

	async fn handle_connection(
		stream: TcpStream,
		service: RequestService,
		mut shutdown: tokio::sync::broadcast::Receiver<()>,
	) {
		let remote_addr = service.remote_addr;
		let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
		let mut conn = std::pin::pin!(conn);

		tokio::select! {
			result = conn.as_mut() => {
				if let Err(e) = result {
					tracing::debug!(remote = %remote_addr, error = %e, "connection closed with error");
				}
			}
			_ = shutdown.recv() => {
				conn.as_mut().graceful_shutdown();
				if let Err(e) = conn.as_mut().await {
					tracing::debug!(remote = %remote_addr, error = %e, "connection closed during shutdown");
				}
			}
		}
	}
}

struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
	max_body_bytes: usize,
}

impl RequestService {
	async fn dispatch(handler: Arc<dyn Handler>, request: Request) -> Response {
		match handler.handle(request).await {
			Ok(response) => response,
			Err(err) => {
				if err.is_internal() {
					tracing::error!(error = %err, "request failed");
				}
				Response::from(err)
			}
		}
	}
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = hyper::http::Error;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;
		let max_body_bytes = self.max_body_bytes;

		Box::pin(async move {
			let (parts, body) = req.into_parts();

			let response = match Limited::new(body, max_body_bytes).collect().await {
				Ok(collected) => {
					let request = Request::builder()
						.method(parts.method)
						.uri(parts.uri.to_string())
						.version(parts.version)
						.headers(parts.headers)
						.body(collected.to_bytes())
						.remote_addr(remote_addr)
						.build();
					match request {
						Ok(request) => Self::dispatch(handler, request).await,
						Err(err) => Response::from(err),
					}
				}
				Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
					Response::from(Error::PayloadTooLarge(format!(
						"body exceeds {} bytes",
						max_body_bytes
					)))
				}
				Err(err) => Response::from(Error::BadRequest(format!(
					"failed to read request body: {}",
					err
				))),
			};

			let mut builder = hyper::Response::builder().status(response.status);
			for (key, value) in response.headers.iter() {
				builder = builder.header(key, value);
			}
			builder.body(Full::new(response.body))
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use rstest::rstest;
	use std::time::Duration;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};

	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> lectern_core::Result<Response> {
			if request.path() == "/missing" {
				return Err(Error::NotFound("missing".into()));
			}
			Ok(Response::ok().with_body(format!("{} {}", request.method, request.body.len())))
		}
	}

	async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
		let mut stream = TcpStream::connect(addr).await.unwrap();
		stream.write_all(raw.as_bytes()).await.unwrap();
		let mut buf = Vec::new();
		stream.read_to_end(&mut buf).await.unwrap();
		String::from_utf8_lossy(&buf).into_owned()
	}

	async fn start(max_body_bytes: usize) -> (SocketAddr, ShutdownCoordinator, tokio::task::JoinHandle<()>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(2));
		let server = HttpServer::new(Arc::new(Echo)).with_max_body_bytes(max_body_bytes);
		let running = coordinator.clone();
		let task = tokio::spawn(async move {
			server.serve(listener, running).await.unwrap();
		});
		(addr, coordinator, task)
	}

	#[rstest]
	#[tokio::test]
	async fn test_serves_request_and_stops() {
		// Arrange
		let (addr, coordinator, task) = start(1024).await;

		// Act
		let response = roundtrip(
			addr,
			"POST /x HTTP/1.1\r\nHost: test\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
		)
		.await;
		coordinator.shutdown();

		// Assert
		assert!(response.starts_with("HTTP/1.1 200 OK"));
		assert!(response.ends_with("POST 5"));
		tokio::time::timeout(Duration::from_secs(5), task)
			.await
			.unwrap()
			.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_handler_error_becomes_status() {
		let (addr, coordinator, _task) = start(1024).await;

		let response = roundtrip(
			addr,
			"GET /missing HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
		)
		.await;
		coordinator.shutdown();

		assert!(response.starts_with("HTTP/1.1 404 Not Found"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_oversized_body_is_rejected() {
		let (addr, coordinator, _task) = start(4).await;

		let response = roundtrip(
			addr,
			"POST /x HTTP/1.1\r\nHost: test\r\nContent-Length: 10\r\nConnection: close\r\n\r\n0123456789",
		)
		.await;
		coordinator.shutdown();

		assert!(response.starts_with("HTTP/1.1 413 Payload Too Large"));
	}
}
