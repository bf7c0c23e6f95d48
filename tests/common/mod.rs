#![allow(dead_code)]

pub mod builders;
pub mod mocks;
pub mod strategies;

pub use builders::*;
pub use mocks::*;

pub const GROUP: &str = "examples.metadata";
pub const ARTIFACT: &str = "test";
pub const PROJECT: &str = "PROD-1";
