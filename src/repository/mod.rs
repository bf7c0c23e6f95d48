//! # Repository of Record
//!
//! Read-only contract for the upstream system that enumerates published
//! versions and per-version dependencies. Implementations live outside this
//! crate; callers should put a call-level timeout on them because the refresh
//! pipeline waits on every call.

pub mod reconciler;

use crate::models::ArtifactDependency;
use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

pub use reconciler::VersionReconciler;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("artifact {group_id}:{artifact_id} not found in repository")]
    ArtifactNotFound {
        group_id: String,
        artifact_id: String,
    },

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn not_found(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self::ArtifactNotFound {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_))
    }
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Every published version of the artifact; fails when the artifact is unknown upstream
    async fn find_versions(&self, group_id: &str, artifact_id: &str)
        -> RepositoryResult<Vec<String>>;

    /// Full dependency set declared by one version
    async fn find_dependencies(
        &self,
        group_id: &str,
        artifact_id: &str,
        version_id: &str,
    ) -> RepositoryResult<BTreeSet<ArtifactDependency>>;
}
