//! `offers-server`: HTTP front end for the offer aggregation engine.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use vehicle_offers::api::rest::{AppState, create_router};
use vehicle_offers::application::services::{CheapestFirst, OfferAggregationEngine};
use vehicle_offers::infrastructure::concurrency::{PoolConfig, WorkerPool};
use vehicle_offers::infrastructure::downstream::{DownstreamClients, HttpDownstream};
use vehicle_offers::settings::Settings;
use vehicle_offers::telemetry;

#[derive(Debug, Parser)]
#[command(name = "offers-server", version, about)]
struct Cli {
    /// TOML settings file.
    #[arg(long, env = "OFFERS_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.bind_addr`.
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(bind) = cli.bind {
        settings.server.bind_addr = bind;
        settings.validate().context("validating --bind")?;
    }

    telemetry::init_tracing(&settings.logging).context("installing tracing subscriber")?;

    let pool_config = settings.pool.to_pool_config();
    let runtime = pool_config
        .runtime_builder()
        .build()
        .context("building runtime")?;
    runtime.block_on(serve(settings, pool_config))
}

async fn serve(settings: Settings, pool_config: PoolConfig) -> anyhow::Result<()> {
    let pool = WorkerPool::new(pool_config).context("creating worker pool")?;
    let downstream =
        Arc::new(HttpDownstream::new(&settings.downstream).context("creating downstream client")?);
    info!(root = %downstream.root_url(), "Downstream configured");

    let engine = OfferAggregationEngine::new(
        DownstreamClients::from_shared(downstream),
        pool.clone(),
        Arc::new(CheapestFirst::new()),
        settings.aggregation.clone(),
    );
    let router = create_router(AppState::new(Arc::new(engine)));

    let addr = settings.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!(metrics = ?pool.metrics(), "Draining worker pool");
    pool.shutdown().await.context("draining worker pool")?;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
