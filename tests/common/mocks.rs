use async_trait::async_trait;
use depot_core::error::{DepotError, Result};
use depot_core::models::{ArtifactDependency, EventResponse, MetadataNotification, ProjectVersion};
use depot_core::registry::{ArtifactHandler, ArtifactType};
use depot_core::repository::{ArtifactRepository, RepositoryError, RepositoryResult};
use depot_core::store::{EventFilter, NotificationLog};
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

type Coordinates = (String, String);

/// Repository of record backed by in-memory maps
#[derive(Debug, Default)]
pub struct StubRepository {
    versions: DashMap<Coordinates, Vec<String>>,
    dependencies: DashMap<ProjectVersion, BTreeSet<ArtifactDependency>>,
    unavailable: DashSet<Coordinates>,
    pub version_lookups: AtomicUsize,
}

impl StubRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(self, group_id: &str, artifact_id: &str, versions: &[&str]) -> Self {
        self.versions.insert(
            (group_id.to_string(), artifact_id.to_string()),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn with_dependencies(
        self,
        version: ProjectVersion,
        dependencies: impl IntoIterator<Item = ArtifactDependency>,
    ) -> Self {
        self.dependencies
            .insert(version, dependencies.into_iter().collect());
        self
    }

    /// Every call for the coordinates fails with a retryable error until `recover`
    pub fn unavailable_for(self, group_id: &str, artifact_id: &str) -> Self {
        self.unavailable
            .insert((group_id.to_string(), artifact_id.to_string()));
        self
    }

    pub fn recover(&self, group_id: &str, artifact_id: &str) {
        self.unavailable
            .remove(&(group_id.to_string(), artifact_id.to_string()));
    }

    fn check_available(&self, group_id: &str, artifact_id: &str) -> RepositoryResult<()> {
        if self
            .unavailable
            .contains(&(group_id.to_string(), artifact_id.to_string()))
        {
            return Err(RepositoryError::Unavailable(format!(
                "timed out reading {group_id}:{artifact_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactRepository for StubRepository {
    async fn find_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> RepositoryResult<Vec<String>> {
        self.version_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available(group_id, artifact_id)?;
        self.versions
            .get(&(group_id.to_string(), artifact_id.to_string()))
            .map(|v| v.clone())
            .ok_or_else(|| RepositoryError::not_found(group_id, artifact_id))
    }

    async fn find_dependencies(
        &self,
        group_id: &str,
        artifact_id: &str,
        version_id: &str,
    ) -> RepositoryResult<BTreeSet<ArtifactDependency>> {
        self.check_available(group_id, artifact_id)?;
        Ok(self
            .dependencies
            .get(&ProjectVersion::new(group_id, artifact_id, version_id))
            .map(|d| d.clone())
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerBehavior {
    Succeed,
    /// Returns `Err` with a retryable handler error
    Fail,
    /// Returns a response carrying an error
    Report,
    Panic,
}

/// Artifact handler that records every call
#[derive(Debug)]
pub struct RecordingHandler {
    artifact_type: ArtifactType,
    behavior: Mutex<HandlerBehavior>,
    pub handled: Mutex<Vec<(ProjectVersion, bool)>>,
    pub deleted: Mutex<Vec<ProjectVersion>>,
}

impl RecordingHandler {
    pub fn new(artifact_type: ArtifactType) -> Self {
        Self {
            artifact_type,
            behavior: Mutex::new(HandlerBehavior::Succeed),
            handled: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_behavior(self, behavior: HandlerBehavior) -> Self {
        *self.behavior.lock() = behavior;
        self
    }

    pub fn set_behavior(&self, behavior: HandlerBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn calls(&self) -> usize {
        self.handled.lock().len()
    }
}

#[async_trait]
impl ArtifactHandler for RecordingHandler {
    async fn handle(&self, version: &ProjectVersion, full_update: bool) -> Result<EventResponse> {
        self.handled.lock().push((version.clone(), full_update));
        let behavior = *self.behavior.lock();
        match behavior {
            HandlerBehavior::Succeed => {
                let mut response = EventResponse::new();
                response.add_message(format!("{} stored for {}", self.artifact_type, version.gav()));
                Ok(response)
            }
            HandlerBehavior::Fail => Err(DepotError::handler(
                self.artifact_type.as_str(),
                "upstream content unreadable",
            )),
            HandlerBehavior::Report => Ok(EventResponse::with_error(format!(
                "{} content rejected",
                self.artifact_type
            ))),
            HandlerBehavior::Panic => panic!("{} handler exploded", self.artifact_type),
        }
    }

    async fn delete(&self, version: &ProjectVersion) -> Result<EventResponse> {
        self.deleted.lock().push(version.clone());
        match *self.behavior.lock() {
            HandlerBehavior::Fail => Err(DepotError::handler(
                self.artifact_type.as_str(),
                "content store refused delete",
            )),
            _ => Ok(EventResponse::new()),
        }
    }
}

/// Notification log whose writes always fail, as if its database were down
#[derive(Debug, Default)]
pub struct UnavailableLog;

#[async_trait]
impl NotificationLog for UnavailableLog {
    async fn complete(&self, _event: MetadataNotification) -> Result<MetadataNotification> {
        Err(DepotError::store("complete", "connection refused"))
    }

    async fn get(&self, _event_id: &str) -> Result<Option<MetadataNotification>> {
        Ok(None)
    }

    async fn find(&self, _filter: &EventFilter) -> Result<Vec<MetadataNotification>> {
        Ok(Vec::new())
    }

    async fn get_all(&self) -> Result<Vec<MetadataNotification>> {
        Ok(Vec::new())
    }
}
