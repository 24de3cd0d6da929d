//! Night-sky HTTP server binary.
//!
//! Loads `nightsky.toml`, builds the (optionally seeded) local star store,
//! initializes the time scales and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin nightsky-server
//! NIGHTSKY_CONFIG=config/prod.toml PORT=9090 cargo run --bin nightsky-server
//! ```
//!
//! # Environment Variables
//!
//! - `NIGHTSKY_CONFIG`: explicit configuration file
//! - `HOST`, `PORT`: override the `[server]` section
//! - `RUST_LOG`: log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use nightsky::config::NightSkyConfig;
use nightsky::db::RepositoryFactory;
use nightsky::http::{create_router, AppState};
use nightsky::services::{NightSkyCache, TimeContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting night-sky server");

    let config = NightSkyConfig::load_or_default()?;
    let repository = RepositoryFactory::from_settings(&config.repository)?;
    info!("Repository initialized ({})", config.repository.repo_type);

    let time_context = Arc::new(TimeContext::new());
    time_context.initialize(config.time_scales());

    let cache = Arc::new(NightSkyCache::new(config.eviction_policy()));
    let app = create_router(AppState::new(repository, time_context, cache));

    let addr: SocketAddr = config.server.bind_address().parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
