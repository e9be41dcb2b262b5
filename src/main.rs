use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod pipeline;
mod routes;
mod state;
mod workers;

#[cfg(test)]
mod test_support;

use config::settings::AppConfig;
use infrastructure::http::fetcher::Fetcher;
use infrastructure::media::engine::FfmpegEngine;
use infrastructure::storage::workspace::Workspace;
use state::AppState;
use workers::cleanup::CleanupScheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new().context("invalid configuration")?;

    let workspace = Workspace::init(
        &config.scratch_dir,
        &config.media_dir,
        &config.public_media_prefix,
    )
    .await
    .context("failed to prepare media and scratch directories")?;

    let engine = FfmpegEngine::new(&config.ffmpeg_bin, &config.ffprobe_bin);
    engine.log_version().await;

    let fetcher = Fetcher::new(&config.fetch).context("failed to build HTTP client")?;

    let (cleanup, _cleanup_worker) = CleanupScheduler::start(config.retention);
    info!("🧹 Artifacts expire after {:?}", cleanup.retention());

    let port = config.server_port;
    let state = AppState::new(config, workspace, Arc::new(engine), fetcher, cleanup);
    let app = app::create_app(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
