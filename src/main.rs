use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use arena_sync_server::config::ServerConfig;
use arena_sync_server::metrics::{self, Metrics};
use arena_sync_server::net::game_session::{start_game_loop, SessionHandle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Arena Sync Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServerConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: tick_rate={}, arena={}x{}, seed={:?}",
        config.tick_rate,
        config.simulation.arena_width,
        config.simulation.arena_height,
        config.rng_seed
    );

    let metrics = Arc::new(Metrics::new());

    let metrics_addr = SocketAddr::new(config.bind_address, config.metrics_port);
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        if let Err(e) = metrics::start_metrics_server(metrics_clone, metrics_addr).await {
            error!("Metrics server error: {}", e);
        }
    });

    let session = SessionHandle::new(&config, metrics.clone());
    let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate as f64);
    let mut game_loop = start_game_loop(session.clone(), tick_duration);

    info!("Session ready, waiting for players");

    tokio::select! {
        result = &mut game_loop => {
            if let Err(e) = result {
                error!("Game loop stopped: {}", e);
            }
        }
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
        }
    }

    game_loop.abort();

    let session = session.session().read().await;
    info!(
        "Server stopped at tick {} with {} players",
        session.world().tick,
        session.player_count()
    );

    Ok(())
}
