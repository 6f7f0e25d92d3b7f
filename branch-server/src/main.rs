//! branch-server — BranchSync backend
//!
//! Long-running service that:
//! - Serves the catalog/order/sales REST API for the SPA
//! - Runs the stock-consistency transaction for order creation
//! - Pushes live events to connected clients over WebSocket rooms
//! - Answers canned analytical queries through the chatbot façade

mod api;
mod catalog;
mod chatbot;
mod config;
mod db;
mod error;
mod live;
mod notify;
mod state;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "branch_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting branch-server (env: {})", config.environment);

    // Initialize application state (pool, migrations, hub, notifications)
    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("branch-server HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
