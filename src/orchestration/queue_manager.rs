//! # Notifications Queue Manager
//!
//! Polls the notification queue one event per tick and applies the retry policy:
//!
//! - retries exhausted: finalized as failed without being processed
//! - malformed input: finalized as failed, never retried
//! - permanent failure (unknown upstream, missing dependency): finalized as failed
//! - transient failure: re-queued at the back with `retries + 1`
//! - success: finalized
//!
//! Finalizing writes the event to the notification log and then removes it from
//! the queue, so a crash in between leaves the event queued for another attempt
//! and the log write is idempotent by event id.
//!
//! Nothing raised while processing an event escapes a tick: handler errors and
//! panics are folded into the event's response.

use crate::config::QueueManagerConfig;
use crate::constants::messages::MAX_RETRIES_EXCEEDED;
use crate::constants::metrics::{
    NOTIFICATIONS_COUNTER, NOTIFICATIONS_COUNTER_HELP, QUEUE_WAITING, QUEUE_WAITING_HELP,
};
use crate::error::{DepotError, Result};
use crate::logging::log_event_operation;
use crate::metrics::NotificationMetrics;
use crate::models::{EventResponse, MetadataNotification};
use crate::orchestration::event_handler::NotificationEventHandler;
use crate::store::{EventFilter, NotificationLog, NotificationQueue, ProjectStore};
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub struct NotificationsQueueManager {
    projects: Arc<dyn ProjectStore>,
    events: Arc<dyn NotificationLog>,
    queue: Arc<dyn NotificationQueue>,
    event_handler: Arc<dyn NotificationEventHandler>,
    metrics: Arc<NotificationMetrics>,
    config: QueueManagerConfig,
    /// Keeps ticks of this instance from overlapping
    tick: Mutex<()>,
}

impl NotificationsQueueManager {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        events: Arc<dyn NotificationLog>,
        queue: Arc<dyn NotificationQueue>,
        event_handler: Arc<dyn NotificationEventHandler>,
        metrics: Arc<NotificationMetrics>,
        config: QueueManagerConfig,
    ) -> Self {
        metrics.register_counter(NOTIFICATIONS_COUNTER, NOTIFICATIONS_COUNTER_HELP);
        metrics.register_gauge(QUEUE_WAITING, QUEUE_WAITING_HELP);
        Self {
            projects,
            events,
            queue,
            event_handler,
            metrics,
            config,
            tick: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &QueueManagerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<NotificationMetrics> {
        &self.metrics
    }

    /// Processes at most one queued event; returns how many were handled (0 or 1).
    ///
    /// The queue gauge is refreshed on every tick, including ticks whose log or
    /// queue write failed.
    #[instrument(skip(self))]
    pub async fn handle(&self) -> Result<usize> {
        let _tick = self.tick.lock().await;
        let handled = match self.queue.take_first().await? {
            Some(event) => self.handle_found(event).await.map(|()| 1),
            None => Ok(0),
        };
        self.waiting_on_queue().await?;
        handled
    }

    /// Drains the queue by handling events until none is eligible.
    ///
    /// Blocks until the backlog is gone; meant for maintenance and tests rather
    /// than steady-state serving. Events held back by retry backoff stay queued.
    pub async fn handle_all(&self) -> Result<usize> {
        let mut handled = 0;
        while self.handle().await? > 0 {
            handled += 1;
        }
        debug!(handled = handled, "Queue drained");
        Ok(handled)
    }

    async fn handle_found(&self, mut event: MetadataNotification) -> Result<()> {
        if event.retries_exceeded() {
            event.add_permanent_error(MAX_RETRIES_EXCEEDED);
            info!(
                event_id = %event.event_id,
                max_retries = event.max_retries,
                "Event has exceeded maximum retries"
            );
            self.finalize(event).await?;
            return Ok(());
        }
        self.handle_event(event).await
    }

    async fn handle_event(&self, mut event: MetadataNotification) -> Result<()> {
        let validation_errors = self.event_handler.validate_event(&event);
        if !validation_errors.is_empty() {
            event.add_permanent_error(validation_errors.join(","));
            warn!(event_id = %event.event_id, errors = ?validation_errors, "Event failed validation");
            self.finalize(event).await?;
            self.metrics.increment_error_count(NOTIFICATIONS_COUNTER);
            return Ok(());
        }

        let mut response = EventResponse::new();
        match AssertUnwindSafe(self.event_handler.handle_event(&event))
            .catch_unwind()
            .await
        {
            Ok(Ok(handled)) => {
                response.combine(handled);
            }
            Ok(Err(e)) if e.is_retryable() => {
                response.add_error(e.to_string());
            }
            Ok(Err(e)) => {
                response.add_permanent_error(e.to_string());
            }
            Err(panic) => {
                response.add_error(panic_message(panic.as_ref()));
            }
        }

        if !response.has_errors() {
            event.set_response(response);
            self.finalize(event).await?;
            return Ok(());
        }

        self.metrics.increment_error_count(NOTIFICATIONS_COUNTER);
        if response.is_permanent_failure() {
            event.set_response(response);
            self.finalize(event).await?;
            return Ok(());
        }

        event.increase_retries();
        event.set_response(response);
        event.next_eligible_at = self
            .config
            .backoff_for(event.retries)
            .map(|backoff| Utc::now() + backoff);
        info!(
            event_id = %event.event_id,
            retries = event.retries,
            errors = ?event.response.errors(),
            "Event completed with errors; re-queued"
        );
        self.queue.push(&event).await?;
        log_event_operation(
            "requeue",
            &event.event_id,
            &event.gav(),
            event.retries,
            event.response.status().as_str(),
            None,
        );
        Ok(())
    }

    async fn finalize(&self, event: MetadataNotification) -> Result<()> {
        let completed = self.events.complete(event).await?;
        self.queue.remove(&completed.event_id).await?;
        log_event_operation(
            "complete",
            &completed.event_id,
            &completed.gav(),
            completed.retries,
            completed.status().as_str(),
            completed.response.errors().first().map(String::as_str),
        );
        Ok(())
    }

    /// Rejects `(group_id, artifact_id)` already claimed by another project id,
    /// whether the claim is stored or still waiting in the queue
    async fn validate_coordinates(
        &self,
        project_id: &str,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<()> {
        let registered = match self.projects.find(group_id, artifact_id).await? {
            Some(project) => Some(project.project_id),
            None => self
                .queue
                .find_by_coordinates(group_id, artifact_id)
                .await?
                .into_iter()
                .map(|queued| queued.project_id)
                .find(|queued| queued != project_id),
        };
        match registered {
            Some(registered) if registered != project_id => Err(DepotError::CoordinateConflict {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
                project_id: registered,
            }),
            _ => Ok(()),
        }
    }

    /// Queues a partial, non-transitive refresh and returns its event id
    #[instrument(skip(self))]
    pub async fn notify(
        &self,
        project_id: &str,
        group_id: &str,
        artifact_id: &str,
        version_id: &str,
    ) -> Result<String> {
        let event = MetadataNotification::partial(project_id, group_id, artifact_id, version_id)
            .with_max_retries(self.config.max_retries);
        self.notify_event(event).await
    }

    /// Queues a prebuilt notification after the same coordinate check as [`Self::notify`]
    pub async fn notify_event(&self, event: MetadataNotification) -> Result<String> {
        self.metrics.increment_count(NOTIFICATIONS_COUNTER);
        self.validate_coordinates(&event.project_id, &event.group_id, &event.artifact_id)
            .await?;
        let event_id = self.queue.push(&event).await?;
        log_event_operation(
            "notify",
            &event_id,
            &event.gav(),
            event.retries,
            event.status().as_str(),
            None,
        );
        Ok(event_id)
    }

    /// Current queue depth; also refreshes the queue gauge
    pub async fn waiting_on_queue(&self) -> Result<u64> {
        let waiting = self.queue.size().await?;
        self.metrics
            .set_gauge(QUEUE_WAITING, i64::try_from(waiting).unwrap_or(i64::MAX));
        Ok(waiting)
    }

    pub async fn find_processed_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<MetadataNotification>> {
        self.events.find(filter).await
    }

    pub async fn get_processed_event(&self, event_id: &str) -> Result<Option<MetadataNotification>> {
        self.events.get(event_id).await
    }

    pub async fn get_all_in_queue(&self) -> Result<Vec<MetadataNotification>> {
        self.queue.get_all().await
    }

    pub async fn find_in_queue(&self, event_id: &str) -> Result<Option<MetadataNotification>> {
        self.queue.get(event_id).await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("event handler panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("event handler panicked: {message}")
    } else {
        "event handler panicked".to_string()
    }
}
