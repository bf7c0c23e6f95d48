use crate::config::QueueManagerConfig;
use crate::error::Result;
use crate::models::MetadataNotification;
use crate::store::NotificationQueue;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use std::time::Duration;

/// Queue table with lease-based claims.
///
/// `take_first` locks the oldest unclaimed, eligible row with
/// `FOR UPDATE SKIP LOCKED` and stamps `claimed_until`, so concurrent pollers
/// never take the same entry and a crashed poller's entry reappears once the
/// lease lapses.
#[derive(Debug, Clone)]
pub struct PgNotificationQueue {
    pool: PgPool,
    visibility_timeout: Duration,
}

impl PgNotificationQueue {
    pub fn new(pool: PgPool, visibility_timeout: Duration) -> Self {
        Self {
            pool,
            visibility_timeout,
        }
    }

    /// Lease length taken from `queue.visibility_timeout_seconds`
    pub fn from_config(pool: PgPool, config: &QueueManagerConfig) -> Self {
        Self::new(pool, config.visibility_timeout())
    }
}

#[async_trait]
impl NotificationQueue for PgNotificationQueue {
    async fn push(&self, event: &MetadataNotification) -> Result<String> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM depot_notification_queue WHERE event_id = $1")
            .bind(&event.event_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"INSERT INTO depot_notification_queue
               (event_id, project_id, group_id, artifact_id, eligible_at, claimed_until, payload)
               VALUES ($1, $2, $3, $4, $5, NULL, $6)"#,
        )
        .bind(&event.event_id)
        .bind(&event.project_id)
        .bind(&event.group_id)
        .bind(&event.artifact_id)
        .bind(event.next_eligible_at)
        .bind(Json(event))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(event.event_id.clone())
    }

    async fn take_first(&self) -> Result<Option<MetadataNotification>> {
        let claimed: Option<(Json<MetadataNotification>,)> = sqlx::query_as(
            r#"UPDATE depot_notification_queue
               SET claimed_until = NOW() + make_interval(secs => $1)
               WHERE queue_id = (
                   SELECT queue_id FROM depot_notification_queue
                   WHERE (claimed_until IS NULL OR claimed_until <= NOW())
                     AND (eligible_at IS NULL OR eligible_at <= NOW())
                   ORDER BY queue_id
                   FOR UPDATE SKIP LOCKED
                   LIMIT 1
               )
               RETURNING payload"#,
        )
        .bind(self.visibility_timeout.as_secs_f64())
        .fetch_optional(&self.pool)
        .await?;
        Ok(claimed.map(|(Json(event),)| event))
    }

    async fn remove(&self, event_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM depot_notification_queue WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, event_id: &str) -> Result<Option<MetadataNotification>> {
        let row: Option<(Json<MetadataNotification>,)> =
            sqlx::query_as("SELECT payload FROM depot_notification_queue WHERE event_id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(Json(event),)| event))
    }

    async fn get_all(&self) -> Result<Vec<MetadataNotification>> {
        let rows: Vec<(Json<MetadataNotification>,)> =
            sqlx::query_as("SELECT payload FROM depot_notification_queue ORDER BY queue_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(Json(event),)| event).collect())
    }

    async fn size(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM depot_notification_queue")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find_by_coordinates(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<MetadataNotification>> {
        let rows: Vec<(Json<MetadataNotification>,)> = sqlx::query_as(
            r#"SELECT payload FROM depot_notification_queue
               WHERE group_id = $1 AND artifact_id = $2 ORDER BY queue_id"#,
        )
        .bind(group_id)
        .bind(artifact_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(Json(event),)| event).collect())
    }
}
