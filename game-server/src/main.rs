use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use game_persistence::connection::connect_and_migrate;
use game_persistence::repositories::{GameRepository, UserRepository};
use game_server::{
    config::Config, create_routes, frames::SignedFrameUrls, rate_limit::PerKeyRateLimiter,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Framedle server...");

    let config = Config::new();

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let frame_signer = Arc::new(SignedFrameUrls::new(
        config.frame_base_url.clone(),
        config.frame_signing_secret.clone(),
        Duration::from_secs(config.frame_url_ttl_seconds),
    ));
    let game_repository = Arc::new(GameRepository::new(db.clone(), frame_signer));
    let user_repository = Arc::new(UserRepository::new(db));

    let rate_limiter = Arc::new(PerKeyRateLimiter::new(Duration::from_millis(
        config.guess_min_interval_ms,
    )));

    let routes = create_routes(
        game_repository,
        user_repository,
        rate_limiter.clone(),
    );

    // Start rate limiter cleanup task
    let purge_rate_limiter = rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            purge_rate_limiter.purge_stale();
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
