use anyhow::Context;
use lectern::{AppState, build_app};
use lectern_auth::start_auto_cleanup;
use lectern_conf::Settings;
use lectern_server::{HttpServer, ShutdownCoordinator, shutdown_signal};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let settings = Settings::load().context("failed to load settings")?;

	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(&settings.log_level))
		.context("invalid log level")?;
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let addr = settings.bind_addr()?;
	let state = AppState::from_settings(&settings)
		.await
		.context("failed to initialise application")?;
	start_auto_cleanup(state.sessions.clone(), settings.session_cleanup_interval());
	let app = build_app(state)?;

	let coordinator = ShutdownCoordinator::new(SHUTDOWN_GRACE_PERIOD);
	let trigger = coordinator.clone();
	tokio::spawn(async move {
		shutdown_signal().await;
		tracing::info!("shutting down");
		trigger.shutdown();
	});

	HttpServer::new(app)
		.with_max_body_bytes(settings.max_body_bytes)
		.listen_with_shutdown(addr, coordinator)
		.await?;
	Ok(())
}
