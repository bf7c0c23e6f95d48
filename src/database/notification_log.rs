use crate::error::Result;
use crate::models::MetadataNotification;
use crate::store::{EventFilter, NotificationLog};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Completed notifications as JSONB documents, with the filterable fields
/// copied into indexed columns
#[derive(Debug, Clone)]
pub struct PgNotificationLog {
    pool: PgPool,
}

impl PgNotificationLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLog for PgNotificationLog {
    async fn complete(&self, mut event: MetadataNotification) -> Result<MetadataNotification> {
        let now = Utc::now();
        event.completed_at = Some(now);
        event.last_updated = now;

        sqlx::query(
            r#"INSERT INTO depot_notifications
               (event_id, parent_event_id, group_id, artifact_id, version_id, status, last_updated, payload)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               ON CONFLICT (event_id) DO UPDATE SET
                   parent_event_id = EXCLUDED.parent_event_id,
                   status = EXCLUDED.status,
                   last_updated = EXCLUDED.last_updated,
                   payload = EXCLUDED.payload"#,
        )
        .bind(&event.event_id)
        .bind(&event.parent_event_id)
        .bind(&event.group_id)
        .bind(&event.artifact_id)
        .bind(&event.version_id)
        .bind(event.status().as_str())
        .bind(event.last_updated)
        .bind(Json(&event))
        .execute(&self.pool)
        .await?;
        Ok(event)
    }

    async fn get(&self, event_id: &str) -> Result<Option<MetadataNotification>> {
        let row: Option<(Json<MetadataNotification>,)> =
            sqlx::query_as("SELECT payload FROM depot_notifications WHERE event_id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(Json(event),)| event))
    }

    async fn find(&self, filter: &EventFilter) -> Result<Vec<MetadataNotification>> {
        let (from, to) = filter.resolved_range(Utc::now());
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT payload FROM depot_notifications WHERE last_updated >= ");
        query.push_bind(from);
        query.push(" AND last_updated <= ");
        query.push_bind(to);

        let columns = [
            ("group_id", &filter.group_id),
            ("artifact_id", &filter.artifact_id),
            ("version_id", &filter.version_id),
            ("parent_event_id", &filter.parent_event_id),
        ];
        for (column, value) in columns {
            if let Some(value) = value {
                query.push(format!(" AND {column} = "));
                query.push_bind(value.clone());
            }
        }
        if let Some(success) = filter.success {
            query.push(if success {
                " AND status = 'SUCCESS'"
            } else {
                " AND status = 'FAILED'"
            });
        }
        query.push(" ORDER BY last_updated DESC");

        let rows: Vec<(Json<MetadataNotification>,)> =
            query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(event),)| event).collect())
    }

    async fn get_all(&self) -> Result<Vec<MetadataNotification>> {
        let rows: Vec<(Json<MetadataNotification>,)> =
            sqlx::query_as("SELECT payload FROM depot_notifications ORDER BY last_updated DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(Json(event),)| event).collect())
    }
}
