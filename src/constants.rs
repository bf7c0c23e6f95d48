//! # System Constants
//!
//! Names and defaults shared across the queue manager, the orchestrator and
//! the metrics surface.

/// Default retry budget for a notification before it is finalized as failed
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Moving version published from a project's default branch
pub const MASTER_SNAPSHOT: &str = "master-SNAPSHOT";

/// Default look-back window for processed event queries when no bounds are given
pub const DEFAULT_EVENT_QUERY_WINDOW_MINUTES: i64 = 30;

/// Metric names exposed to the external collector
pub mod metrics {
    pub const NOTIFICATIONS_COUNTER: &str = "notifications";
    pub const NOTIFICATIONS_COUNTER_HELP: &str = "total notifications received";
    pub const QUEUE_WAITING: &str = "queue_waiting";
    pub const QUEUE_WAITING_HELP: &str = "waiting in queue";
}

/// Fixed response strings callers match on
pub mod messages {
    pub const MAX_RETRIES_EXCEEDED: &str = "Max number of retries exceeded";
}
