//! # Queue Scheduler
//!
//! Fixed-delay polling for the queue manager. One loop handles at most one event
//! per tick and then sleeps for the configured interval; a second loop refreshes
//! the queue depth gauge. Errors are logged and the loops keep going.

use crate::config::QueueManagerConfig;
use crate::orchestration::queue_manager::NotificationsQueueManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

pub struct QueueScheduler;

/// Running scheduler loops; dropping the handle without calling
/// [`SchedulerHandle::shutdown`] leaves them running until the runtime stops
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl QueueScheduler {
    pub fn start(
        manager: Arc<NotificationsQueueManager>,
        config: &QueueManagerConfig,
    ) -> SchedulerHandle {
        let (shutdown, receiver) = watch::channel(false);

        info!(
            queue_delay_ms = config.queue_delay_ms,
            queue_interval_ms = config.queue_interval_ms,
            metrics_interval_ms = config.metrics_interval_ms,
            "Starting notification queue scheduler"
        );

        let polling = tokio::spawn(Self::polling_loop(
            Arc::clone(&manager),
            config.queue_delay(),
            config.queue_interval(),
            receiver.clone(),
        ));
        let gauge = tokio::spawn(Self::metrics_loop(
            manager,
            config.metrics_interval(),
            receiver,
        ));

        SchedulerHandle {
            shutdown,
            tasks: vec![polling, gauge],
        }
    }

    async fn polling_loop(
        manager: Arc<NotificationsQueueManager>,
        delay: Duration,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.changed() => return,
        }
        loop {
            match manager.handle().await {
                Ok(handled) => debug!(handled = handled, "Queue tick finished"),
                Err(e) => error!(error = %e, "Queue tick failed"),
            }
            tokio::select! {
                _ = sleep(interval) => {}
                _ = shutdown.changed() => break,
            }
        }
        debug!("Queue polling loop stopped");
    }

    async fn metrics_loop(
        manager: Arc<NotificationsQueueManager>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = sleep(interval) => {}
                _ = shutdown.changed() => break,
            }
            if let Err(e) = manager.waiting_on_queue().await {
                error!(error = %e, "Failed to refresh queue depth gauge");
            }
        }
        debug!("Queue metrics loop stopped");
    }
}

impl SchedulerHandle {
    /// Stops both loops after their current tick and waits for them
    pub async fn shutdown(self) {
        // Receivers may already be gone if a loop exited on its own
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Scheduler loop panicked");
            }
        }
        info!("Notification queue scheduler stopped");
    }
}
