use crate::config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect(&config.url)
        .await?;
    info!(max_connections = config.max_connections, "Database pool connected");
    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let (health,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;
    Ok(health == 1)
}
