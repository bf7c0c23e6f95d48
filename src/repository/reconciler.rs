//! # Version Reconciler
//!
//! Compares the versions stored for every known project with the versions the
//! repository of record publishes. A project the repository cannot answer for is
//! reported with its error and the scan moves on. `master-SNAPSHOT` is never
//! published upstream, so a stored snapshot is not drift.

use crate::constants::MASTER_SNAPSHOT;
use crate::error::Result;
use crate::models::{ProjectData, VersionMismatch};
use crate::orchestration::NotificationsQueueManager;
use crate::repository::ArtifactRepository;
use crate::store::ProjectStore;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Repository calls in flight at once during a scan
const RECONCILE_CONCURRENCY: usize = 8;

pub struct VersionReconciler {
    projects: Arc<dyn ProjectStore>,
    repository: Arc<dyn ArtifactRepository>,
}

impl VersionReconciler {
    pub fn new(projects: Arc<dyn ProjectStore>, repository: Arc<dyn ArtifactRepository>) -> Self {
        Self {
            projects,
            repository,
        }
    }

    /// One report per drifting or unreachable project, sorted by project id
    #[instrument(skip(self))]
    pub async fn find_versions_mismatches(&self) -> Result<Vec<VersionMismatch>> {
        let projects = self.projects.get_all().await?;
        let scanned = projects.len();

        let mut mismatches: Vec<VersionMismatch> = stream::iter(projects)
            .map(|project| self.compare(project))
            .buffer_unordered(RECONCILE_CONCURRENCY)
            .filter_map(|mismatch| async move { mismatch })
            .collect()
            .await;
        mismatches.sort_by(|a, b| a.project_id.cmp(&b.project_id));

        info!(
            projects = scanned,
            mismatches = mismatches.len(),
            "Version reconciliation finished"
        );
        Ok(mismatches)
    }

    async fn compare(&self, project: ProjectData) -> Option<VersionMismatch> {
        let mut mismatch =
            VersionMismatch::new(&project.project_id, &project.group_id, &project.artifact_id);

        match self
            .repository
            .find_versions(&project.group_id, &project.artifact_id)
            .await
        {
            Ok(versions) => {
                let upstream: BTreeSet<String> = versions.into_iter().collect();
                let stored: BTreeSet<String> = project
                    .versions
                    .iter()
                    .filter(|v| v.as_str() != MASTER_SNAPSHOT)
                    .cloned()
                    .collect();
                mismatch.versions_not_in_store = upstream.difference(&stored).cloned().collect();
                mismatch.versions_not_in_repository =
                    stored.difference(&upstream).cloned().collect();
            }
            Err(e) => {
                warn!(
                    project_id = %project.project_id,
                    error = %e,
                    "Could not fetch repository versions"
                );
                mismatch.errors.push(e.to_string());
            }
        }

        (!mismatch.is_empty()).then_some(mismatch)
    }

    /// Notifies every upstream version missing from the store; returns the new event ids.
    /// Projects whose scan failed are skipped, as are versions the queue manager rejects.
    pub async fn enqueue_missing_versions(
        &self,
        manager: &NotificationsQueueManager,
    ) -> Result<Vec<String>> {
        let mut event_ids = Vec::new();
        for mismatch in self.find_versions_mismatches().await? {
            if !mismatch.errors.is_empty() {
                continue;
            }
            for version_id in &mismatch.versions_not_in_store {
                match manager
                    .notify(
                        &mismatch.project_id,
                        &mismatch.group_id,
                        &mismatch.artifact_id,
                        version_id,
                    )
                    .await
                {
                    Ok(event_id) => event_ids.push(event_id),
                    Err(e) => warn!(
                        project_id = %mismatch.project_id,
                        version_id = %version_id,
                        error = %e,
                        "Could not queue missing version"
                    ),
                }
            }
        }
        info!(queued = event_ids.len(), "Queued missing versions");
        Ok(event_ids)
    }
}
