//! Input validation for artifact coordinates.
//!
//! Group ids are dot-separated lower-case segments (`examples.metadata`),
//! artifact ids are dash-separated lower-case segments (`test-dependencies`),
//! and versions are either `master-SNAPSHOT` or `major.minor.patch`.

use crate::constants::MASTER_SNAPSHOT;
use crate::models::{MetadataNotification, VersionId};

/// Maximum length accepted for any single coordinate
const MAX_COORDINATE_LENGTH: usize = 256;

/// `[a-z][a-z0-9_]*`
fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn is_valid_separated(value: &str, separator: char) -> bool {
    !value.is_empty()
        && value.len() <= MAX_COORDINATE_LENGTH
        && value.split(separator).all(is_valid_segment)
}

pub fn is_valid_group_id(group_id: &str) -> bool {
    is_valid_separated(group_id, '.')
}

pub fn is_valid_artifact_id(artifact_id: &str) -> bool {
    is_valid_separated(artifact_id, '-')
}

pub fn is_valid_version_id(version_id: &str) -> bool {
    version_id == MASTER_SNAPSHOT || version_id.parse::<VersionId>().is_ok()
}

/// Returns every problem with the notification's coordinates; empty when valid
pub fn validate_notification(event: &MetadataNotification) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_valid_group_id(&event.group_id) || !is_valid_artifact_id(&event.artifact_id) {
        errors.push(format!(
            "invalid groupId {} or artifactId {}",
            event.group_id, event.artifact_id
        ));
    }
    if !is_valid_version_id(&event.version_id) {
        errors.push(format!("invalid versionId {}", event.version_id));
    }
    errors
}
