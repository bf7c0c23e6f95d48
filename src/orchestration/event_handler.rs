//! Seam between the queue manager and whatever turns a notification into store writes.

use crate::error::Result;
use crate::models::{EventResponse, MetadataNotification};
use async_trait::async_trait;

#[async_trait]
pub trait NotificationEventHandler: Send + Sync {
    /// Problems with the notification's shape; an empty list means it may be processed.
    /// Validation failures are never retried.
    fn validate_event(&self, event: &MetadataNotification) -> Vec<String>;

    /// Processes a validated notification. Domain failures are reported through the
    /// response; `Err` is reserved for infrastructure failures.
    async fn handle_event(&self, event: &MetadataNotification) -> Result<EventResponse>;
}
