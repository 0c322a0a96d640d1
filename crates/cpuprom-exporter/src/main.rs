//! cpuprom: CPU utilization exporter.
//!
//! - Samples aggregate CPU usage in a background task
//! - Serves it at `/metrics` in Prometheus text format
//! - Config: first CLI argument or `CPUPROM_CONFIG`, built-in defaults otherwise

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cpuprom_core::error::Result;
use cpuprom_exporter::{
    app_state::AppState,
    config::{self, ExporterConfig},
    router,
    sampler::{Sampler, SamplerSettings, SysinfoSource},
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.code().as_str(), "cpuprom exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = match config_path() {
        Some(path) => {
            tracing::info!(%path, "loading config");
            config::load_from_file(&path)?
        }
        None => ExporterConfig::default(),
    };
    let listen = cfg.server.listen_addr()?;
    let settings = SamplerSettings::from(&cfg.sampler);

    let state = AppState::new(cfg)?;
    let listener = tokio::net::TcpListener::bind(listen).await?;

    let sampler = Sampler::new(SysinfoSource::new(), settings, state.metrics()).spawn();

    let metrics_path = state.cfg().server.metrics_path.clone();
    let app = router::build_router(state);

    tracing::info!(%listen, %metrics_path, "cpuprom starting");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let exit = sampler.shutdown().await;
    tracing::debug!(?exit, "sampler stopped");

    served?;
    Ok(())
}

fn config_path() -> Option<String> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CPUPROM_CONFIG").ok())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
