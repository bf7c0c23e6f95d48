//! # Artifact Handler Registry
//!
//! Maps an artifact type to the handler that fetches and persists that type's
//! content for one version. The registry is assembled once at startup and shared
//! by reference; adding an artifact type means registering another handler, not
//! touching the orchestrator.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = ArtifactHandlerRegistry::builder()
//!     .register(ArtifactType::Entities, Arc::new(entities_handler))
//!     .register(ArtifactType::FileGenerations, Arc::new(generations_handler))
//!     .build();
//! ```

use crate::error::Result;
use crate::models::{EventResponse, ProjectVersion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactType {
    Entities,
    VersionedEntities,
    FileGenerations,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Entities => "entities",
            ArtifactType::VersionedEntities => "versioned-entities",
            ArtifactType::FileGenerations => "file-generations",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetches one artifact type's content for a version and persists it
#[async_trait]
pub trait ArtifactHandler: Send + Sync {
    /// `full_update` asks for all content instead of what changed since the last refresh
    async fn handle(&self, version: &ProjectVersion, full_update: bool) -> Result<EventResponse>;

    /// Drops everything this handler stored for the version
    async fn delete(&self, _version: &ProjectVersion) -> Result<EventResponse> {
        Ok(EventResponse::new())
    }
}

#[derive(Clone, Default)]
pub struct ArtifactHandlerRegistry {
    handlers: BTreeMap<ArtifactType, Arc<dyn ArtifactHandler>>,
}

impl fmt::Debug for ArtifactHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactHandlerRegistry")
            .field("artifact_types", &self.artifact_types())
            .finish()
    }
}

impl ArtifactHandlerRegistry {
    pub fn builder() -> ArtifactHandlerRegistryBuilder {
        ArtifactHandlerRegistryBuilder::default()
    }

    pub fn get(&self, artifact_type: ArtifactType) -> Option<&Arc<dyn ArtifactHandler>> {
        self.handlers.get(&artifact_type)
    }

    /// Registered handlers in artifact type order
    pub fn handlers(&self) -> impl Iterator<Item = (ArtifactType, &Arc<dyn ArtifactHandler>)> {
        self.handlers.iter().map(|(t, h)| (*t, h))
    }

    pub fn artifact_types(&self) -> Vec<ArtifactType> {
        self.handlers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[derive(Default)]
pub struct ArtifactHandlerRegistryBuilder {
    handlers: BTreeMap<ArtifactType, Arc<dyn ArtifactHandler>>,
}

impl ArtifactHandlerRegistryBuilder {
    /// Registers a handler; a later registration for the same type replaces the earlier one
    pub fn register(mut self, artifact_type: ArtifactType, handler: Arc<dyn ArtifactHandler>) -> Self {
        if self.handlers.insert(artifact_type, handler).is_some() {
            debug!(artifact_type = %artifact_type, "Replaced artifact handler registration");
        }
        self
    }

    pub fn build(self) -> ArtifactHandlerRegistry {
        ArtifactHandlerRegistry {
            handlers: self.handlers,
        }
    }
}
