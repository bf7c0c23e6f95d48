//! # Database Schema
//!
//! Idempotent schema setup for the Postgres stores. Every statement uses
//! `IF NOT EXISTS`, so running the migrations on every startup is safe.
//!
//! The queue keeps a `BIGSERIAL` position per entry: re-pushing an event deletes
//! and re-inserts it, which moves it to the back. Claims are leases
//! (`claimed_until`) taken with `FOR UPDATE SKIP LOCKED`.

use sqlx::PgPool;
use tracing::info;

const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS depot_projects (
        group_id    TEXT NOT NULL,
        artifact_id TEXT NOT NULL,
        project_id  TEXT NOT NULL,
        PRIMARY KEY (group_id, artifact_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS depot_project_versions (
        group_id    TEXT NOT NULL,
        artifact_id TEXT NOT NULL,
        version_id  TEXT NOT NULL,
        PRIMARY KEY (group_id, artifact_id, version_id),
        FOREIGN KEY (group_id, artifact_id)
            REFERENCES depot_projects (group_id, artifact_id) ON DELETE CASCADE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS depot_version_dependencies (
        group_id        TEXT NOT NULL,
        artifact_id     TEXT NOT NULL,
        version_id      TEXT NOT NULL,
        dep_group_id    TEXT NOT NULL,
        dep_artifact_id TEXT NOT NULL,
        dep_version_id  TEXT NOT NULL,
        PRIMARY KEY (group_id, artifact_id, version_id, dep_group_id, dep_artifact_id, dep_version_id),
        FOREIGN KEY (group_id, artifact_id, version_id)
            REFERENCES depot_project_versions (group_id, artifact_id, version_id) ON DELETE CASCADE
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_depot_version_dependencies_dep
        ON depot_version_dependencies (dep_group_id, dep_artifact_id, dep_version_id)"#,
    r#"CREATE TABLE IF NOT EXISTS depot_notification_queue (
        queue_id      BIGSERIAL PRIMARY KEY,
        event_id      TEXT NOT NULL UNIQUE,
        project_id    TEXT NOT NULL,
        group_id      TEXT NOT NULL,
        artifact_id   TEXT NOT NULL,
        eligible_at   TIMESTAMPTZ,
        claimed_until TIMESTAMPTZ,
        payload       JSONB NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_depot_notification_queue_coordinates
        ON depot_notification_queue (group_id, artifact_id)"#,
    r#"CREATE TABLE IF NOT EXISTS depot_notifications (
        event_id        TEXT PRIMARY KEY,
        parent_event_id TEXT,
        group_id        TEXT NOT NULL,
        artifact_id     TEXT NOT NULL,
        version_id      TEXT NOT NULL,
        status          TEXT NOT NULL,
        last_updated    TIMESTAMPTZ NOT NULL,
        payload         JSONB NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_depot_notifications_gav
        ON depot_notifications (group_id, artifact_id, version_id)"#,
    r#"CREATE INDEX IF NOT EXISTS idx_depot_notifications_parent
        ON depot_notifications (parent_event_id)"#,
    r#"CREATE INDEX IF NOT EXISTS idx_depot_notifications_status
        ON depot_notifications (status)"#,
    r#"CREATE INDEX IF NOT EXISTS idx_depot_notifications_last_updated
        ON depot_notifications (last_updated DESC)"#,
];

pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Creates every table and index the Postgres stores need
    pub async fn run_all(pool: &PgPool) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for statement in STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!(statements = STATEMENTS.len(), "Database schema ready");
        Ok(())
    }
}
