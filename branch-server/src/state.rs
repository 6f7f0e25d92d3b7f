//! Application state for branch-server

use sqlx::PgPool;

use crate::BoxError;
use crate::config::Config;
use crate::live::LiveHub;
use crate::notify::NotificationCenter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// WebSocket fan-out hub
    pub hub: LiveHub,
    /// In-process notification ring
    pub notifications: NotificationCenter,
    /// Server configuration
    pub config: Config,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self {
            pool,
            hub: LiveHub::new(),
            notifications: NotificationCenter::new(),
            config: config.clone(),
        })
    }
}
