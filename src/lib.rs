#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! # Depot Core
//!
//! Event-driven refresh pipeline that keeps a metadata depot consistent with an
//! upstream artifact repository.
//!
//! ## Overview
//!
//! A change to a project version arrives as a [`MetadataNotification`]. It is
//! validated and queued; a scheduled poller takes one notification at a time
//! and hands it to the [`ArtifactRefreshOrchestrator`], which confirms the
//! version upstream, checks that its dependencies are already in the depot, and
//! runs every registered artifact handler. Failed notifications are retried up
//! to a limit and every notification ends up in the processed-event log with a
//! success or failure status.
//!
//! ## Module Organization
//!
//! - [`models`] - notifications, responses, projects and version identifiers
//! - [`store`] - project store, notification queue and log contracts with in-memory implementations
//! - [`database`] - Postgres implementations of the store contracts (`postgres` feature)
//! - [`orchestration`] - queue manager, refresh orchestrator, scheduler and purge
//! - [`repository`] - upstream repository contract and version reconciliation
//! - [`registry`] - artifact handler registration
//! - [`config`] - layered YAML and environment configuration
//! - [`validation`] - coordinate syntax checks
//! - [`metrics`] - in-process counters and gauges
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use depot_core::config::{QueueManagerConfig, RefreshConfig};
//! use depot_core::metrics::NotificationMetrics;
//! use depot_core::orchestration::{ArtifactRefreshOrchestrator, NotificationsQueueManager};
//! use depot_core::registry::ArtifactHandlerRegistry;
//! use depot_core::repository::ArtifactRepository;
//! use depot_core::store::{InMemoryNotificationLog, InMemoryNotificationQueue, InMemoryProjectStore};
//! use std::sync::Arc;
//!
//! # async fn example(repository: Arc<dyn ArtifactRepository>) -> depot_core::Result<()> {
//! let config = QueueManagerConfig::default();
//! let projects = Arc::new(InMemoryProjectStore::new());
//! let queue = Arc::new(InMemoryNotificationQueue::from_config(&config));
//! let log = Arc::new(InMemoryNotificationLog::new());
//! let orchestrator = Arc::new(ArtifactRefreshOrchestrator::with_config(
//!     projects.clone(),
//!     repository,
//!     Arc::new(ArtifactHandlerRegistry::builder().build()),
//!     queue.clone(),
//!     log.clone(),
//!     RefreshConfig::default(),
//! ));
//! let manager = NotificationsQueueManager::new(
//!     projects,
//!     log,
//!     queue,
//!     orchestrator,
//!     Arc::new(NotificationMetrics::new()),
//!     config,
//! );
//!
//! manager.notify("PROD-1", "examples.metadata", "test", "1.0.0").await?;
//! manager.handle_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
#[cfg(feature = "postgres")]
pub mod database;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestration;
pub mod registry;
pub mod repository;
pub mod store;
pub mod validation;

pub use config::{ConfigManager, DepotConfig};
pub use error::{DepotError, Result};
pub use models::{EventResponse, EventStatus, MetadataNotification, ProjectData, ProjectVersion};
pub use orchestration::{ArtifactRefreshOrchestrator, NotificationsQueueManager};
