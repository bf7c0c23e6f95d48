//! Semantic version ids and version drift reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A released `major.minor.patch` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionId {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version id '{0}': expected major.minor.patch")]
pub struct ParseVersionError(pub String);

impl FromStr for VersionId {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let mut next = || -> Result<u32, ParseVersionError> {
            let part = parts.next().ok_or_else(|| ParseVersionError(s.to_string()))?;
            // "01" and "+1" parse as integers but are not canonical versions
            if part.is_empty()
                || !part.chars().all(|c| c.is_ascii_digit())
                || (part.len() > 1 && part.starts_with('0'))
            {
                return Err(ParseVersionError(s.to_string()));
            }
            part.parse().map_err(|_| ParseVersionError(s.to_string()))
        };
        let version = VersionId::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(ParseVersionError(s.to_string()));
        }
        Ok(version)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Drift between the versions stored for a project and those published upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMismatch {
    pub project_id: String,
    pub group_id: String,
    pub artifact_id: String,
    pub versions_not_in_store: Vec<String>,
    pub versions_not_in_repository: Vec<String>,
    pub errors: Vec<String>,
}

impl VersionMismatch {
    pub fn new(
        project_id: impl Into<String>,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            versions_not_in_store: Vec::new(),
            versions_not_in_repository: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.versions_not_in_store.is_empty()
            && self.versions_not_in_repository.is_empty()
            && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_numerically() {
        let a: VersionId = "2.10.0".parse().unwrap();
        let b: VersionId = "2.9.1".parse().unwrap();
        assert!(a > b);
        assert_eq!(a.to_string(), "2.10.0");
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["", "1", "1.0", "1.0.0.0", "1.a.0", "01.0.0", "1.0.-1", "master-SNAPSHOT"] {
            assert!(bad.parse::<VersionId>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn mismatch_without_differences_is_empty() {
        let mismatch = VersionMismatch::new("PROD-A", "examples.metadata", "test1");
        assert!(mismatch.is_empty());
    }
}
