//! Graceful shutdown coordination.

use std::time::Duration;
use tokio::sync::broadcast;

/// Fans a single shutdown signal out to the accept loop and every open
/// connection.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	sender: broadcast::Sender<()>,
	grace_period: Duration,
}

impl ShutdownCoordinator {
	/// `grace_period` bounds how long in-flight connections may take to
	/// finish once shutdown starts.
	pub fn new(grace_period: Duration) -> Self {
		let (sender, _) = broadcast::channel(1);
		Self {
			sender,
			grace_period,
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.sender.subscribe()
	}

	/// Starts shutdown. Calling it again is harmless.
	pub fn shutdown(&self) {
		let _ = self.sender.send(());
	}

	pub fn grace_period(&self) -> Duration {
		self.grace_period
	}
}

/// Resolves on Ctrl-C (and SIGTERM on Unix).
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for Ctrl-C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(e) => {
				tracing::error!(error = %e, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_all_subscribers_observe_shutdown() {
		// Arrange
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
		let mut first = coordinator.subscribe();
		let mut second = coordinator.clone().subscribe();

		// Act
		coordinator.shutdown();

		// Assert
		assert!(first.recv().await.is_ok());
		assert!(second.recv().await.is_ok());
	}

	#[rstest]
	fn test_shutdown_without_subscribers_is_harmless() {
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));

		coordinator.shutdown();
		coordinator.shutdown();
	}
}
