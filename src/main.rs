//! Veridian HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use veridian::batch::BatchRunner;
use veridian::config::Config;
use veridian::engine::GenaiEngine;
use veridian::gateway::{HandlerState, create_router_with_state};
use veridian::research::{Researcher, RetryController};
use veridian::store::SqliteStore;
use veridian::supervisor::RunSupervisor;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        model = %config.model,
        auth = config.api_key.is_some(),
        "Veridian starting"
    );

    let store = SqliteStore::connect(&config.database_url).await?;
    store.migrate().await?;
    let store = Arc::new(store);
    tracing::info!(url = %config.database_url, "evaluation store ready");

    let engine = Arc::new(GenaiEngine::new(config.engine_settings()));
    let retry = RetryController::new(engine, config.retry_policy());
    let researcher = Researcher::new(retry);

    let batch_config = config.batch_config();
    tracing::info!(
        year = batch_config.year,
        chunk_size = batch_config.chunk_size,
        city_concurrency = batch_config.city_concurrency,
        "batch runner configured"
    );
    let runner = Arc::new(BatchRunner::new(
        store.clone(),
        researcher.clone(),
        batch_config,
    ));
    let supervisor = RunSupervisor::new(runner).with_retention(config.retained_runs);

    let state =
        HandlerState::new(store, researcher, supervisor).with_api_key(config.api_key.clone());
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Veridian shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("VERIDIAN_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
