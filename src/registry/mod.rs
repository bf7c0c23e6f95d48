//! # Registry Infrastructure
//!
//! - **ArtifactHandlerRegistry**: artifact type to content handler, built once at startup

pub mod artifact_handler_registry;

pub use artifact_handler_registry::{
    ArtifactHandler, ArtifactHandlerRegistry, ArtifactHandlerRegistryBuilder, ArtifactType,
};
