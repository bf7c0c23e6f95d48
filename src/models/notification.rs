//! # Metadata Notification
//!
//! A request to refresh one version of one artifact. Notifications live in the
//! queue until they complete, then move to the notification log.

use crate::constants::DEFAULT_MAX_RETRIES;
use crate::models::response::{EventResponse, EventStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataNotification {
    pub event_id: String,
    /// Event that caused this one to be scheduled, if any
    pub parent_event_id: Option<String>,
    pub project_id: String,
    pub group_id: String,
    pub artifact_id: String,
    pub version_id: String,
    /// Reprocess all content for the version instead of changed content only
    pub full_update: bool,
    /// Require the full dependency closure to be stored before refreshing
    pub transitive: bool,
    pub retries: u32,
    pub max_retries: u32,
    pub response: EventResponse,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Set once the notification log has accepted the event
    pub completed_at: Option<DateTime<Utc>>,
    /// Earliest time the queue may hand this event out again
    pub next_eligible_at: Option<DateTime<Utc>>,
}

impl MetadataNotification {
    pub fn new(
        project_id: impl Into<String>,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version_id: impl Into<String>,
        full_update: bool,
        transitive: bool,
        parent_event_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            event_id: Uuid::new_v4().to_string(),
            parent_event_id,
            project_id: project_id.into(),
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version_id: version_id.into(),
            full_update,
            transitive,
            retries: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            response: EventResponse::new(),
            created_at: now,
            last_updated: now,
            completed_at: None,
            next_eligible_at: None,
        }
    }

    /// Partial, non-transitive refresh as produced by `notify`
    pub fn partial(
        project_id: impl Into<String>,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version_id: impl Into<String>,
    ) -> Self {
        Self::new(
            project_id,
            group_id,
            artifact_id,
            version_id,
            false,
            false,
            None,
        )
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn retries_exceeded(&self) -> bool {
        self.retries >= self.max_retries
    }

    pub fn increase_retries(&mut self) -> &mut Self {
        self.retries += 1;
        self
    }

    pub fn set_response(&mut self, response: EventResponse) -> &mut Self {
        self.response = response;
        self.last_updated = Utc::now();
        self
    }

    pub fn add_error(&mut self, error: impl Into<String>) -> &mut Self {
        self.response.add_error(error);
        self
    }

    pub fn add_permanent_error(&mut self, error: impl Into<String>) -> &mut Self {
        self.response.add_permanent_error(error);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// `Unknown` while queued; the response's status once completed
    pub fn status(&self) -> EventStatus {
        if self.is_completed() {
            self.response.status()
        } else {
            EventStatus::Unknown
        }
    }

    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        self.next_eligible_at.map_or(true, |at| at <= now)
    }

    /// `group:artifact:version`
    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version_id)
    }
}
