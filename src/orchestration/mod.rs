//! # Refresh Orchestration
//!
//! ```text
//! notify() ──▶ NotificationQueue ──▶ NotificationsQueueManager::handle() ──▶ ArtifactRefreshOrchestrator
//!                   ▲                        │                                       │
//!                   └──── retry (re-push) ◀──┤                                       ▼
//!                                            └──▶ NotificationLog            handlers + ProjectStore
//! ```
//!
//! - [`queue_manager`] - retry policy and failure isolation per queued event
//! - [`refresh`] - validated, dependency-ordered refresh of one project version
//! - [`scheduler`] - fixed-delay polling loops driving the queue manager
//! - [`purge`] - removal of stored versions
//! - [`event_handler`] - seam between queue manager and orchestrator

pub mod event_handler;
pub mod purge;
pub mod queue_manager;
pub mod refresh;
pub mod scheduler;

pub use event_handler::NotificationEventHandler;
pub use purge::ArtifactsPurgeService;
pub use queue_manager::NotificationsQueueManager;
pub use refresh::ArtifactRefreshOrchestrator;
pub use scheduler::{QueueScheduler, SchedulerHandle};
