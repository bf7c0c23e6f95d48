//! # Postgres Persistence
//!
//! Durable implementations of the store contracts in [`crate::store`].
//!
//! - [`connection`] - pool setup from [`DatabaseConfig`](crate::config::DatabaseConfig)
//! - [`migrations`] - idempotent schema creation
//! - [`PgProjectStore`], [`PgNotificationQueue`], [`PgNotificationLog`] - the stores
//!
//! Notifications are stored as JSONB documents; the columns queries filter or
//! order on are copied next to the document.
//!
//! ```rust,no_run
//! use depot_core::config::DatabaseConfig;
//! use depot_core::database::{connect, DatabaseMigrations, PgNotificationQueue};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect(&DatabaseConfig::default()).await?;
//! DatabaseMigrations::run_all(&pool).await?;
//! let queue = PgNotificationQueue::new(pool, Duration::from_secs(300));
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;
pub mod notification_log;
pub mod notification_queue;
pub mod project_store;

pub use connection::{connect, health_check};
pub use migrations::DatabaseMigrations;
pub use notification_log::PgNotificationLog;
pub use notification_queue::PgNotificationQueue;
pub use project_store::PgProjectStore;
