// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use launch_feed::application::feed_service::FeedService;
use launch_feed::domain::window::DateWindow;
use launch_feed::infrastructure::config::load_feed_config;
use launch_feed::infrastructure::launch_api::HttpLaunchGateway;
use launch_feed::presentation::app_state::AppState;
use launch_feed::presentation::router::build_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("launch_feed=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_feed_config().context("Failed to load feed configuration")?;
    let zone = config.clock.zone()?;

    // Create gateway (infrastructure layer)
    let gateway = Arc::new(HttpLaunchGateway::new(
        config.api.endpoint,
        config.api.page_size,
        zone,
    ));

    // Create service (application layer) and kick off the first load
    let feed_service = FeedService::new(gateway, DateWindow::starting_on(zone.today()));
    {
        let feed_service = feed_service.clone();
        tokio::spawn(async move {
            feed_service.mount().await;
        });
    }

    let state = Arc::new(AppState { feed_service });
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind address {:?}", config.server.bind))?;
    tracing::info!("Starting launch-feed service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
