//! Project records and version coordinates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A project known to the depot, unique per `(group_id, artifact_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub project_id: String,
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub versions: BTreeSet<String>,
}

impl ProjectData {
    pub fn new(
        project_id: impl Into<String>,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            versions: BTreeSet::new(),
        }
    }

    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions.extend(versions.into_iter().map(Into::into));
        self
    }

    pub fn has_version(&self, version_id: &str) -> bool {
        self.versions.contains(version_id)
    }

    pub fn coordinates(&self) -> String {
        format!("{}-{}", self.group_id, self.artifact_id)
    }
}

/// Reference to a specific version of another artifact
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version_id: String,
}

impl ArtifactDependency {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version_id: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version_id: version_id.into(),
        }
    }

    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version_id)
    }
}

impl fmt::Display for ArtifactDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.group_id, self.artifact_id, self.version_id)
    }
}

/// One stored version of one project
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersion {
    pub group_id: String,
    pub artifact_id: String,
    pub version_id: String,
}

impl ProjectVersion {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version_id: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version_id: version_id.into(),
        }
    }

    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version_id)
    }
}

impl From<ArtifactDependency> for ProjectVersion {
    fn from(dep: ArtifactDependency) -> Self {
        Self {
            group_id: dep.group_id,
            artifact_id: dep.artifact_id,
            version_id: dep.version_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_display_uses_dashes() {
        let dep = ArtifactDependency::new("examples.metadata", "c", "1.0.0");
        assert_eq!(dep.to_string(), "examples.metadata-c-1.0.0");
        assert_eq!(dep.gav(), "examples.metadata:c:1.0.0");
    }

    #[test]
    fn project_versions_are_a_set() {
        let project = ProjectData::new("PROD-A", "examples.metadata", "test1")
            .with_versions(["2.3.0", "2.2.0", "2.3.0"]);
        assert_eq!(project.versions.len(), 2);
        assert!(project.has_version("2.2.0"));
        assert_eq!(project.coordinates(), "examples.metadata-test1");
    }
}
