//! In-process store implementations.
//!
//! Used by tests and single-node deployments. The queue serializes claims under
//! one lock, which gives the same exclusive-take guarantee the Postgres queue gets
//! from `FOR UPDATE SKIP LOCKED`.

use super::{EventFilter, NotificationLog, NotificationQueue, ProjectStore};
use crate::config::QueueManagerConfig;
use crate::error::Result;
use crate::models::{ArtifactDependency, MetadataNotification, ProjectData, ProjectVersion};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{BTreeSet, VecDeque};
use std::time::{Duration, Instant};

type ProjectKey = (String, String);

fn key(group_id: &str, artifact_id: &str) -> ProjectKey {
    (group_id.to_string(), artifact_id.to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: DashMap<ProjectKey, ProjectData>,
    dependencies: DashMap<ProjectVersion, BTreeSet<ArtifactDependency>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: impl IntoIterator<Item = ProjectData>) -> Self {
        let store = Self::new();
        for project in projects {
            store
                .projects
                .insert(key(&project.group_id, &project.artifact_id), project);
        }
        store
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn find(&self, group_id: &str, artifact_id: &str) -> Result<Option<ProjectData>> {
        Ok(self
            .projects
            .get(&key(group_id, artifact_id))
            .map(|p| p.clone()))
    }

    async fn get_all(&self) -> Result<Vec<ProjectData>> {
        let mut projects: Vec<ProjectData> =
            self.projects.iter().map(|p| p.value().clone()).collect();
        projects.sort_by(|a, b| a.project_id.cmp(&b.project_id));
        Ok(projects)
    }

    async fn create_or_update(&self, project: &ProjectData) -> Result<()> {
        self.projects
            .entry(key(&project.group_id, &project.artifact_id))
            .and_modify(|existing| {
                existing.project_id = project.project_id.clone();
                existing.versions.extend(project.versions.iter().cloned());
            })
            .or_insert_with(|| project.clone());
        Ok(())
    }

    async fn add_version(
        &self,
        version: &ProjectVersion,
        dependencies: &[ArtifactDependency],
    ) -> Result<()> {
        if let Some(mut project) = self
            .projects
            .get_mut(&key(&version.group_id, &version.artifact_id))
        {
            project.versions.insert(version.version_id.clone());
        } else {
            return Err(crate::error::DepotError::NotFound(format!(
                "project {}-{}",
                version.group_id, version.artifact_id
            )));
        }
        if !dependencies.is_empty() {
            self.dependencies
                .insert(version.clone(), dependencies.iter().cloned().collect());
        }
        Ok(())
    }

    async fn remove_version(&self, version: &ProjectVersion) -> Result<bool> {
        self.dependencies.remove(version);
        Ok(self
            .projects
            .get_mut(&key(&version.group_id, &version.artifact_id))
            .is_some_and(|mut project| project.versions.remove(&version.version_id)))
    }

    async fn find_dependants(&self, version: &ProjectVersion) -> Result<Vec<ProjectVersion>> {
        let target = ArtifactDependency::new(
            &version.group_id,
            &version.artifact_id,
            &version.version_id,
        );
        let mut dependants: Vec<ProjectVersion> = self
            .dependencies
            .iter()
            .filter(|entry| entry.value().contains(&target))
            .map(|entry| entry.key().clone())
            .collect();
        dependants.sort();
        Ok(dependants)
    }
}

#[derive(Debug)]
struct QueueEntry {
    event: MetadataNotification,
    claimed_until: Option<Instant>,
}

impl QueueEntry {
    fn is_claimable(&self, now: Instant) -> bool {
        self.claimed_until.map_or(true, |until| until <= now)
    }
}

#[derive(Debug)]
pub struct InMemoryNotificationQueue {
    entries: Mutex<VecDeque<QueueEntry>>,
    visibility_timeout: Duration,
}

impl Default for InMemoryNotificationQueue {
    fn default() -> Self {
        Self::from_config(&QueueManagerConfig::default())
    }
}

impl InMemoryNotificationQueue {
    pub fn new(visibility_timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            visibility_timeout,
        }
    }

    /// Lease length taken from `queue.visibility_timeout_seconds`
    pub fn from_config(config: &QueueManagerConfig) -> Self {
        Self::new(config.visibility_timeout())
    }
}

#[async_trait]
impl NotificationQueue for InMemoryNotificationQueue {
    async fn push(&self, event: &MetadataNotification) -> Result<String> {
        let mut entries = self.entries.lock();
        entries.retain(|entry| entry.event.event_id != event.event_id);
        entries.push_back(QueueEntry {
            event: event.clone(),
            claimed_until: None,
        });
        Ok(event.event_id.clone())
    }

    async fn take_first(&self) -> Result<Option<MetadataNotification>> {
        let now = Instant::now();
        let wall_clock = Utc::now();
        let mut entries = self.entries.lock();
        let claimed = entries
            .iter_mut()
            .find(|entry| entry.is_claimable(now) && entry.event.is_eligible_at(wall_clock))
            .map(|entry| {
                entry.claimed_until = Some(now + self.visibility_timeout);
                entry.event.clone()
            });
        Ok(claimed)
    }

    async fn remove(&self, event_id: &str) -> Result<bool> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| entry.event.event_id != event_id);
        Ok(entries.len() != before)
    }

    async fn get(&self, event_id: &str) -> Result<Option<MetadataNotification>> {
        Ok(self
            .entries
            .lock()
            .iter()
            .find(|entry| entry.event.event_id == event_id)
            .map(|entry| entry.event.clone()))
    }

    async fn get_all(&self) -> Result<Vec<MetadataNotification>> {
        Ok(self
            .entries
            .lock()
            .iter()
            .map(|entry| entry.event.clone())
            .collect())
    }

    async fn size(&self) -> Result<u64> {
        Ok(self.entries.lock().len() as u64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationLog {
    events: DashMap<String, MetadataNotification>,
}

impl InMemoryNotificationLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationLog for InMemoryNotificationLog {
    async fn complete(&self, mut event: MetadataNotification) -> Result<MetadataNotification> {
        let now = Utc::now();
        event.last_updated = now;
        event.completed_at = Some(now);
        self.events.insert(event.event_id.clone(), event.clone());
        Ok(event)
    }

    async fn get(&self, event_id: &str) -> Result<Option<MetadataNotification>> {
        Ok(self.events.get(event_id).map(|e| e.clone()))
    }

    async fn find(&self, filter: &EventFilter) -> Result<Vec<MetadataNotification>> {
        let now = Utc::now();
        let mut found: Vec<MetadataNotification> = self
            .events
            .iter()
            .filter(|e| filter.matches(e.value(), now))
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<MetadataNotification>> {
        let mut all: Vec<MetadataNotification> =
            self.events.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(all)
    }
}
