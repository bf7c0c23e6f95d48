use crate::error::Result;
use crate::models::{ArtifactDependency, ProjectData, ProjectVersion};
use crate::store::ProjectStore;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{BTreeSet, HashMap};

/// Projects, stored versions and per-version dependencies in three tables
#[derive(Debug, Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn find(&self, group_id: &str, artifact_id: &str) -> Result<Option<ProjectData>> {
        let project_id: Option<(String,)> = sqlx::query_as(
            "SELECT project_id FROM depot_projects WHERE group_id = $1 AND artifact_id = $2",
        )
        .bind(group_id)
        .bind(artifact_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((project_id,)) = project_id else {
            return Ok(None);
        };

        let versions: Vec<(String,)> = sqlx::query_as(
            "SELECT version_id FROM depot_project_versions WHERE group_id = $1 AND artifact_id = $2",
        )
        .bind(group_id)
        .bind(artifact_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(
            ProjectData::new(project_id, group_id, artifact_id)
                .with_versions(versions.into_iter().map(|(v,)| v)),
        ))
    }

    async fn get_all(&self) -> Result<Vec<ProjectData>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT project_id, group_id, artifact_id FROM depot_projects ORDER BY project_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let version_rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT group_id, artifact_id, version_id FROM depot_project_versions",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut versions: HashMap<(String, String), BTreeSet<String>> = HashMap::new();
        for (group_id, artifact_id, version_id) in version_rows {
            versions
                .entry((group_id, artifact_id))
                .or_default()
                .insert(version_id);
        }

        Ok(rows
            .into_iter()
            .map(|(project_id, group_id, artifact_id)| {
                let stored = versions
                    .remove(&(group_id.clone(), artifact_id.clone()))
                    .unwrap_or_default();
                ProjectData::new(project_id, group_id, artifact_id).with_versions(stored)
            })
            .collect())
    }

    async fn create_or_update(&self, project: &ProjectData) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"INSERT INTO depot_projects (group_id, artifact_id, project_id)
               VALUES ($1, $2, $3)
               ON CONFLICT (group_id, artifact_id) DO UPDATE SET project_id = EXCLUDED.project_id"#,
        )
        .bind(&project.group_id)
        .bind(&project.artifact_id)
        .bind(&project.project_id)
        .execute(&mut *tx)
        .await?;

        for version_id in &project.versions {
            sqlx::query(
                r#"INSERT INTO depot_project_versions (group_id, artifact_id, version_id)
                   VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"#,
            )
            .bind(&project.group_id)
            .bind(&project.artifact_id)
            .bind(version_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn add_version(
        &self,
        version: &ProjectVersion,
        dependencies: &[ArtifactDependency],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"INSERT INTO depot_project_versions (group_id, artifact_id, version_id)
               VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"#,
        )
        .bind(&version.group_id)
        .bind(&version.artifact_id)
        .bind(&version.version_id)
        .execute(&mut *tx)
        .await?;

        if dependencies.is_empty() {
            tx.commit().await?;
            return Ok(());
        }

        sqlx::query(
            r#"DELETE FROM depot_version_dependencies
               WHERE group_id = $1 AND artifact_id = $2 AND version_id = $3"#,
        )
        .bind(&version.group_id)
        .bind(&version.artifact_id)
        .bind(&version.version_id)
        .execute(&mut *tx)
        .await?;

        for dependency in dependencies {
            sqlx::query(
                r#"INSERT INTO depot_version_dependencies
                   (group_id, artifact_id, version_id, dep_group_id, dep_artifact_id, dep_version_id)
                   VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT DO NOTHING"#,
            )
            .bind(&version.group_id)
            .bind(&version.artifact_id)
            .bind(&version.version_id)
            .bind(&dependency.group_id)
            .bind(&dependency.artifact_id)
            .bind(&dependency.version_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove_version(&self, version: &ProjectVersion) -> Result<bool> {
        let result = sqlx::query(
            r#"DELETE FROM depot_project_versions
               WHERE group_id = $1 AND artifact_id = $2 AND version_id = $3"#,
        )
        .bind(&version.group_id)
        .bind(&version.artifact_id)
        .bind(&version.version_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_dependants(&self, version: &ProjectVersion) -> Result<Vec<ProjectVersion>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"SELECT group_id, artifact_id, version_id FROM depot_version_dependencies
               WHERE dep_group_id = $1 AND dep_artifact_id = $2 AND dep_version_id = $3
               ORDER BY group_id, artifact_id, version_id"#,
        )
        .bind(&version.group_id)
        .bind(&version.artifact_id)
        .bind(&version.version_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(g, a, v)| ProjectVersion::new(g, a, v))
            .collect())
    }

    async fn version_exists(&self, version: &ProjectVersion) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"SELECT EXISTS (SELECT 1 FROM depot_project_versions
               WHERE group_id = $1 AND artifact_id = $2 AND version_id = $3)"#,
        )
        .bind(&version.group_id)
        .bind(&version.artifact_id)
        .bind(&version.version_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
