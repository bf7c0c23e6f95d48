//! # Artifact Refresh Orchestrator
//!
//! Turns one validated notification into store mutations for a single project
//! version:
//!
//! ```text
//! confirm upstream ──▶ check dependencies ──▶ ensure project ──▶ run handlers ──▶ record version
//!   (find_versions)      (transitive only)      (upsert)          (all of them)     (+ propagate)
//! ```
//!
//! Dependencies must already be stored before a dependant can be refreshed. A
//! missing dependency fails the refresh before anything is written; the caller
//! refreshes the dependency first and republishes.
//!
//! Every handler runs even when another one fails, so a single pass reports the
//! full picture. Follow-up work for dependants goes back through the queue as new
//! notifications carrying this event as parent, never as a recursive call. A
//! dependant whose version already appears in the event's parent chain is a
//! dependency cycle: it is reported on the outcome and not scheduled again.

use crate::config::RefreshConfig;
use crate::constants::MASTER_SNAPSHOT;
use crate::error::Result;
use crate::models::{
    ArtifactDependency, EventResponse, MetadataNotification, ProjectData, ProjectVersion,
};
use crate::orchestration::event_handler::NotificationEventHandler;
use crate::registry::ArtifactHandlerRegistry;
use crate::repository::{ArtifactRepository, RepositoryError};
use crate::store::{NotificationLog, NotificationQueue, ProjectStore};
use crate::validation::validate_notification;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct ArtifactRefreshOrchestrator {
    projects: Arc<dyn ProjectStore>,
    repository: Arc<dyn ArtifactRepository>,
    handlers: Arc<ArtifactHandlerRegistry>,
    queue: Arc<dyn NotificationQueue>,
    events: Arc<dyn NotificationLog>,
    config: RefreshConfig,
}

impl ArtifactRefreshOrchestrator {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        repository: Arc<dyn ArtifactRepository>,
        handlers: Arc<ArtifactHandlerRegistry>,
        queue: Arc<dyn NotificationQueue>,
        events: Arc<dyn NotificationLog>,
    ) -> Self {
        Self::with_config(
            projects,
            repository,
            handlers,
            queue,
            events,
            RefreshConfig::default(),
        )
    }

    pub fn with_config(
        projects: Arc<dyn ProjectStore>,
        repository: Arc<dyn ArtifactRepository>,
        handlers: Arc<ArtifactHandlerRegistry>,
        queue: Arc<dyn NotificationQueue>,
        events: Arc<dyn NotificationLog>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            projects,
            repository,
            handlers,
            queue,
            events,
            config,
        }
    }

    /// Refreshes the notification's version and returns the combined outcome.
    ///
    /// Domain failures land in the response: permanent ones for unknown upstream
    /// artifacts, missing or circular dependencies; retryable ones for repository
    /// outages and handler errors. `Err` only surfaces store failures.
    #[instrument(skip(self, event), fields(event_id = %event.event_id, gav = %event.gav()))]
    pub async fn refresh(&self, event: &MetadataNotification) -> Result<EventResponse> {
        let version = ProjectVersion::new(&event.group_id, &event.artifact_id, &event.version_id);

        if let Some(failure) = self.confirm_upstream(&version).await {
            return Ok(failure);
        }

        let dependencies = if event.transitive {
            match self.check_dependencies(&version).await? {
                Ok(dependencies) => dependencies,
                Err(failure) => return Ok(failure),
            }
        } else {
            BTreeSet::new()
        };

        let mut response = EventResponse::new();
        self.ensure_project(event, &mut response).await?;
        response.combine(self.run_handlers(&version, event.full_update).await);

        if response.has_errors() {
            warn!(
                errors = ?response.errors(),
                "Refresh completed with handler errors; version not recorded"
            );
            return Ok(response);
        }

        let dependencies: Vec<ArtifactDependency> = dependencies.into_iter().collect();
        self.projects.add_version(&version, &dependencies).await?;
        response.add_message(format!(
            "Version {} refreshed for {}-{}",
            version.version_id, version.group_id, version.artifact_id
        ));
        info!(
            handlers = self.handlers.len(),
            dependencies = dependencies.len(),
            "Version refreshed"
        );

        if event.full_update && self.config.propagate_to_dependants {
            self.schedule_dependants(event, &version, &mut response).await?;
        }

        Ok(response)
    }

    /// `None` when the repository knows the artifact and the version
    async fn confirm_upstream(&self, version: &ProjectVersion) -> Option<EventResponse> {
        match self
            .repository
            .find_versions(&version.group_id, &version.artifact_id)
            .await
        {
            Ok(versions) => {
                if version.version_id != MASTER_SNAPSHOT
                    && !versions.iter().any(|v| v == &version.version_id)
                {
                    return Some(EventResponse::with_permanent_error(format!(
                        "Version {} not found in repository for {}-{}",
                        version.version_id, version.group_id, version.artifact_id
                    )));
                }
                None
            }
            Err(RepositoryError::ArtifactNotFound { .. }) => {
                Some(EventResponse::with_permanent_error(format!(
                    "No Project found for {}-{}",
                    version.group_id, version.artifact_id
                )))
            }
            Err(e) => Some(EventResponse::with_error(format!(
                "Could not confirm {} against repository: {e}",
                version.gav()
            ))),
        }
    }

    /// Resolves the dependency set and requires every member to be stored.
    /// The inner `Err` is the failed response to return as-is.
    async fn check_dependencies(
        &self,
        version: &ProjectVersion,
    ) -> Result<std::result::Result<BTreeSet<ArtifactDependency>, EventResponse>> {
        let dependencies = match self
            .repository
            .find_dependencies(&version.group_id, &version.artifact_id, &version.version_id)
            .await
        {
            Ok(dependencies) => dependencies,
            Err(e) if e.is_retryable() => {
                return Ok(Err(EventResponse::with_error(format!(
                    "Could not resolve dependencies for {}: {e}",
                    version.gav()
                ))))
            }
            Err(e) => {
                return Ok(Err(EventResponse::with_permanent_error(format!(
                    "Could not resolve dependencies for {}: {e}",
                    version.gav()
                ))))
            }
        };

        let mut failure = EventResponse::new();
        for dependency in &dependencies {
            if dependency.group_id == version.group_id
                && dependency.artifact_id == version.artifact_id
            {
                failure.add_permanent_error(format!(
                    "Circular dependency detected: {}-{}-{} depends on {dependency}",
                    version.group_id, version.artifact_id, version.version_id
                ));
                continue;
            }
            let stored = self
                .projects
                .version_exists(&ProjectVersion::from(dependency.clone()))
                .await?;
            if !stored {
                failure.add_permanent_error(format!("Dependency {dependency} not found in store"));
            }
        }

        if failure.has_errors() {
            warn!(errors = ?failure.errors(), "Dependency check failed");
            return Ok(Err(failure));
        }
        debug!(dependencies = dependencies.len(), "All dependencies present in store");
        Ok(Ok(dependencies))
    }

    async fn ensure_project(
        &self,
        event: &MetadataNotification,
        response: &mut EventResponse,
    ) -> Result<()> {
        if self
            .projects
            .find(&event.group_id, &event.artifact_id)
            .await?
            .is_some()
        {
            return Ok(());
        }
        let project = ProjectData::new(&event.project_id, &event.group_id, &event.artifact_id);
        self.projects.create_or_update(&project).await?;
        info!(project_id = %project.project_id, "Registered new project");
        response.add_message(format!(
            "New project {} created {}-{}",
            project.project_id, project.group_id, project.artifact_id
        ));
        Ok(())
    }

    /// Runs every registered handler concurrently; responses merge in registry order
    async fn run_handlers(&self, version: &ProjectVersion, full_update: bool) -> EventResponse {
        let runs = self.handlers.handlers().map(|(artifact_type, handler)| async move {
            match handler.handle(version, full_update).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(artifact_type = %artifact_type, error = %e, "Artifact handler failed");
                    let message = format!("{artifact_type} handler failed: {e}");
                    if e.is_retryable() {
                        EventResponse::with_error(message)
                    } else {
                        EventResponse::with_permanent_error(message)
                    }
                }
            }
        });

        join_all(runs)
            .await
            .into_iter()
            .fold(EventResponse::new(), EventResponse::merged)
    }

    async fn schedule_dependants(
        &self,
        event: &MetadataNotification,
        version: &ProjectVersion,
        response: &mut EventResponse,
    ) -> Result<()> {
        let dependants = self.projects.find_dependants(version).await?;
        if dependants.is_empty() {
            return Ok(());
        }
        let lineage = self.lineage(event).await?;
        let queued: BTreeSet<String> = self
            .queue
            .get_all()
            .await?
            .iter()
            .map(MetadataNotification::gav)
            .collect();

        for dependant in dependants {
            if lineage.contains(&dependant.gav()) {
                warn!(dependant = %dependant.gav(), "Dependant already refreshed by a parent event");
                response.add_permanent_error(format!(
                    "Circular dependency detected: {} depends on {} which descends from it",
                    dependant.gav(),
                    version.gav()
                ));
                continue;
            }
            if queued.contains(&dependant.gav()) {
                debug!(dependant = %dependant.gav(), "Dependant refresh already queued");
                continue;
            }
            let Some(project) = self
                .projects
                .find(&dependant.group_id, &dependant.artifact_id)
                .await?
            else {
                continue;
            };
            let child = MetadataNotification::new(
                project.project_id,
                &dependant.group_id,
                &dependant.artifact_id,
                &dependant.version_id,
                true,
                false,
                Some(event.event_id.clone()),
            )
            .with_max_retries(event.max_retries);
            let child_id = self.queue.push(&child).await?;
            info!(dependant = %dependant.gav(), child_event_id = %child_id, "Scheduled dependant refresh");
            response.add_message(format!(
                "Scheduled refresh of {} as event {child_id}",
                dependant.gav()
            ));
        }
        Ok(())
    }

    /// Gavs of the event and every ancestor reachable through `parent_event_id`.
    /// Completed ancestors are read from the log, pending ones from the queue.
    async fn lineage(&self, event: &MetadataNotification) -> Result<BTreeSet<String>> {
        let mut gavs = BTreeSet::from([event.gav()]);
        let mut visited = BTreeSet::from([event.event_id.clone()]);
        let mut next = event.parent_event_id.clone();

        while let Some(parent_id) = next.take() {
            if !visited.insert(parent_id.clone()) {
                break;
            }
            let parent = match self.events.get(&parent_id).await? {
                Some(parent) => Some(parent),
                None => self.queue.get(&parent_id).await?,
            };
            let Some(parent) = parent else {
                debug!(parent_event_id = %parent_id, "Parent event no longer traceable");
                break;
            };
            gavs.insert(parent.gav());
            next = parent.parent_event_id;
        }
        Ok(gavs)
    }
}

#[async_trait]
impl NotificationEventHandler for ArtifactRefreshOrchestrator {
    fn validate_event(&self, event: &MetadataNotification) -> Vec<String> {
        validate_notification(event)
    }

    async fn handle_event(&self, event: &MetadataNotification) -> Result<EventResponse> {
        self.refresh(event).await
    }
}
