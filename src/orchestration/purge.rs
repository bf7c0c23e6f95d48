//! # Artifacts Purge
//!
//! Removes stored versions: one at a time, or every version older than the
//! newest `keep`. Each registered handler drops its own content for the version
//! before the version is removed from the project record. `master-SNAPSHOT`
//! never counts as an old version.

use crate::error::{DepotError, Result};
use crate::models::{EventResponse, ProjectVersion, VersionId};
use crate::registry::ArtifactHandlerRegistry;
use crate::store::ProjectStore;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct ArtifactsPurgeService {
    projects: Arc<dyn ProjectStore>,
    handlers: Arc<ArtifactHandlerRegistry>,
}

impl ArtifactsPurgeService {
    pub fn new(projects: Arc<dyn ProjectStore>, handlers: Arc<ArtifactHandlerRegistry>) -> Self {
        Self { projects, handlers }
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        group_id: &str,
        artifact_id: &str,
        version_id: &str,
    ) -> Result<EventResponse> {
        if self.projects.find(group_id, artifact_id).await?.is_none() {
            return Err(DepotError::NotFound(format!(
                "No Project found for {group_id}-{artifact_id}"
            )));
        }
        let version = ProjectVersion::new(group_id, artifact_id, version_id);
        self.delete_version(&version).await
    }

    async fn delete_version(&self, version: &ProjectVersion) -> Result<EventResponse> {
        let runs = self
            .handlers
            .handlers()
            .map(|(artifact_type, handler)| async move {
                handler.delete(version).await.unwrap_or_else(|e| {
                    warn!(artifact_type = %artifact_type, error = %e, "Artifact purge failed");
                    EventResponse::with_error(format!("{artifact_type} purge failed: {e}"))
                })
            });
        let mut response = join_all(runs)
            .await
            .into_iter()
            .fold(EventResponse::new(), EventResponse::merged);

        if response.has_errors() {
            // Keep the version record so a later purge can retry the handlers
            return Ok(response);
        }
        if self.projects.remove_version(version).await? {
            info!(gav = %version.gav(), "Version purged");
            response.add_message(format!(
                "Version {} removed from {}-{}",
                version.version_id, version.group_id, version.artifact_id
            ));
        } else {
            response.add_message(format!("Version {} was not stored", version.gav()));
        }
        Ok(response)
    }

    /// Purges every released version except the newest `versions_to_keep`
    #[instrument(skip(self))]
    pub async fn delete_oldest_project_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
        versions_to_keep: usize,
    ) -> Result<EventResponse> {
        let project = self
            .projects
            .find(group_id, artifact_id)
            .await?
            .ok_or_else(|| {
                DepotError::NotFound(format!("No Project found for {group_id}-{artifact_id}"))
            })?;

        let mut released: Vec<(VersionId, String)> = project
            .versions
            .iter()
            .filter_map(|v| v.parse::<VersionId>().ok().map(|id| (id, v.clone())))
            .collect();
        released.sort_by(|a, b| b.0.cmp(&a.0));

        let mut response = EventResponse::new();
        for (_, version_id) in released.into_iter().skip(versions_to_keep) {
            let version = ProjectVersion::new(group_id, artifact_id, version_id);
            response.combine(self.delete_version(&version).await?);
        }
        info!(
            kept = versions_to_keep,
            messages = response.messages().len(),
            "Purged old versions"
        );
        Ok(response)
    }
}
