//! # Store Contracts
//!
//! Persistence boundaries of the refresh pipeline:
//!
//! - [`ProjectStore`] - projects, their stored versions and declared dependencies
//! - [`NotificationQueue`] - pending and retryable notifications, FIFO by arrival
//! - [`NotificationLog`] - completed notifications, queryable by identity or filter
//!
//! A notification is owned by exactly one of the queue and the log at any time.
//! [`memory`] holds in-process implementations; Postgres implementations live in
//! `crate::database` behind the `postgres` feature.

pub mod memory;

use crate::constants::DEFAULT_EVENT_QUERY_WINDOW_MINUTES;
use crate::error::Result;
use crate::models::{ArtifactDependency, MetadataNotification, ProjectData, ProjectVersion};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

pub use memory::{InMemoryNotificationLog, InMemoryNotificationQueue, InMemoryProjectStore};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find(&self, group_id: &str, artifact_id: &str) -> Result<Option<ProjectData>>;

    async fn get_all(&self) -> Result<Vec<ProjectData>>;

    /// Upsert by `(group_id, artifact_id)`. Stored versions are merged with the
    /// record's versions so a repeated create never drops history.
    async fn create_or_update(&self, project: &ProjectData) -> Result<()>;

    /// Marks a version as stored. A non-empty `dependencies` replaces the set
    /// recorded for the version; an empty one leaves earlier records alone, since
    /// only transitive refreshes resolve dependencies.
    async fn add_version(
        &self,
        version: &ProjectVersion,
        dependencies: &[ArtifactDependency],
    ) -> Result<()>;

    /// Returns false when the version was not stored
    async fn remove_version(&self, version: &ProjectVersion) -> Result<bool>;

    /// Stored versions whose recorded dependencies include `version`
    async fn find_dependants(&self, version: &ProjectVersion) -> Result<Vec<ProjectVersion>>;

    async fn version_exists(&self, version: &ProjectVersion) -> Result<bool> {
        Ok(self
            .find(&version.group_id, &version.artifact_id)
            .await?
            .is_some_and(|project| project.has_version(&version.version_id)))
    }
}

#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Appends the notification at the back of the queue, replacing any entry
    /// with the same event id. Returns the event id.
    async fn push(&self, event: &MetadataNotification) -> Result<String>;

    /// Atomically claims the oldest eligible entry. The entry stays stored but
    /// is hidden from other claimers until it is removed, re-pushed, or its
    /// visibility timeout lapses.
    async fn take_first(&self) -> Result<Option<MetadataNotification>>;

    /// Returns false when no entry had the event id
    async fn remove(&self, event_id: &str) -> Result<bool>;

    async fn get(&self, event_id: &str) -> Result<Option<MetadataNotification>>;

    /// Every entry in arrival order, claimed ones included
    async fn get_all(&self) -> Result<Vec<MetadataNotification>>;

    async fn size(&self) -> Result<u64>;

    /// Queued entries for one `(group_id, artifact_id)`, in arrival order
    async fn find_by_coordinates(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<MetadataNotification>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|e| e.group_id == group_id && e.artifact_id == artifact_id)
            .collect())
    }
}

#[async_trait]
pub trait NotificationLog: Send + Sync {
    /// Stamps completion time, then upserts by event id
    async fn complete(&self, event: MetadataNotification) -> Result<MetadataNotification>;

    async fn get(&self, event_id: &str) -> Result<Option<MetadataNotification>>;

    /// Matching events, most recently updated first
    async fn find(&self, filter: &EventFilter) -> Result<Vec<MetadataNotification>>;

    async fn get_all(&self) -> Result<Vec<MetadataNotification>>;
}

/// Conjunctive filter over completed notifications.
///
/// Each missing time bound defaults on its own: `from` to thirty minutes
/// before now, `to` to now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version_id: Option<String>,
    pub parent_event_id: Option<String>,
    pub success: Option<bool>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
        self.artifact_id = Some(artifact_id.into());
        self
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn parent_event_id(mut self, parent_event_id: impl Into<String>) -> Self {
        self.parent_event_id = Some(parent_event_id.into());
        self
    }

    pub fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn resolved_range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = self
            .from
            .unwrap_or_else(|| now - Duration::minutes(DEFAULT_EVENT_QUERY_WINDOW_MINUTES));
        let to = self.to.unwrap_or(now);
        (from, to)
    }

    /// Whether a completed notification satisfies every provided criterion
    pub fn matches(&self, event: &MetadataNotification, now: DateTime<Utc>) -> bool {
        let (from, to) = self.resolved_range(now);
        fn eq(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().map_or(true, |f| f == value)
        }

        event.last_updated >= from
            && event.last_updated <= to
            && eq(&self.group_id, &event.group_id)
            && eq(&self.artifact_id, &event.artifact_id)
            && eq(&self.version_id, &event.version_id)
            && self
                .parent_event_id
                .as_deref()
                .map_or(true, |p| event.parent_event_id.as_deref() == Some(p))
            && self
                .success
                .map_or(true, |s| s != event.response.has_errors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(group: &str, version: &str, at: DateTime<Utc>) -> MetadataNotification {
        let mut event = MetadataNotification::partial("PROD-1", group, "test", version);
        event.last_updated = at;
        event.completed_at = Some(at);
        event
    }

    #[test]
    fn default_window_is_last_thirty_minutes() {
        let now = Utc::now();
        let filter = EventFilter::new();
        let (from, to) = filter.resolved_range(now);
        assert_eq!(to, now);
        assert_eq!(to - from, Duration::minutes(30));

        assert!(filter.matches(&completed("examples.metadata", "1.0.0", now - Duration::minutes(5)), now));
        assert!(!filter.matches(&completed("examples.metadata", "1.0.0", now - Duration::minutes(31)), now));
    }

    #[test]
    fn provided_filters_are_anded() {
        let now = Utc::now();
        let mut failed = completed("examples.metadata", "1.0.0", now);
        failed.add_error("boom");
        let ok = completed("examples.metadata", "2.0.0", now);

        let filter = EventFilter::new()
            .group_id("examples.metadata")
            .success(false);
        assert!(filter.matches(&failed, now));
        assert!(!filter.matches(&ok, now));

        let filter = EventFilter::new().version_id("2.0.0").success(true);
        assert!(filter.matches(&ok, now));
        assert!(!filter.matches(&failed, now));
    }

    #[test]
    fn default_lookups_go_through_the_primitive_operations() {
        let queue = InMemoryNotificationQueue::default();
        let projects = InMemoryProjectStore::with_projects([
            ProjectData::new("PROD-1", "examples.metadata", "test").with_versions(["1.0.0"]),
        ]);
        let queued = MetadataNotification::partial("PROD-1", "examples.metadata", "test", "2.0.0");
        let other = MetadataNotification::partial("PROD-2", "examples.other", "test", "1.0.0");

        tokio_test::block_on(async {
            queue.push(&queued).await.unwrap();
            queue.push(&other).await.unwrap();

            let found = queue
                .find_by_coordinates("examples.metadata", "test")
                .await
                .unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].event_id, queued.event_id);

            let stored = ProjectVersion::new("examples.metadata", "test", "1.0.0");
            let missing = ProjectVersion::new("examples.metadata", "test", "2.0.0");
            assert!(projects.version_exists(&stored).await.unwrap());
            assert!(!projects.version_exists(&missing).await.unwrap());
        });
    }

    #[test]
    fn parent_filter_requires_a_parent() {
        let now = Utc::now();
        let mut child = completed("examples.metadata", "1.0.0", now);
        child.parent_event_id = Some("parent-1".to_string());
        let orphan = completed("examples.metadata", "1.0.0", now);

        let filter = EventFilter::new().parent_event_id("parent-1");
        assert!(filter.matches(&child, now));
        assert!(!filter.matches(&orphan, now));
    }
}
