//! # Domain Models
//!
//! - [`notification`] - Refresh requests flowing through the queue and the log
//! - [`response`] - Outcome of processing a notification
//! - [`project`] - Stored projects, versions and dependency references
//! - [`version`] - Semantic version ids and reconciliation reports

pub mod notification;
pub mod project;
pub mod response;
pub mod version;

pub use notification::MetadataNotification;
pub use project::{ArtifactDependency, ProjectData, ProjectVersion};
pub use response::{EventResponse, EventStatus};
pub use version::{ParseVersionError, VersionId, VersionMismatch};
