use depot_core::models::{EventResponse, VersionId};
use proptest::prelude::*;

/// Strategy for well-formed `major.minor.patch` identifiers
pub fn version_id_strategy() -> impl Strategy<Value = VersionId> {
    (0u32..50, 0u32..50, 0u32..50).prop_map(|(major, minor, patch)| VersionId {
        major,
        minor,
        patch,
    })
}

/// Strategy for dot-separated lowercase group ids
pub fn group_id_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9_]{0,8}", 1..4).prop_map(|parts| parts.join("."))
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Message(String),
    Error(String),
    PermanentError(String),
}

pub fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        "[a-z ]{1,12}".prop_map(Outcome::Message),
        "[a-z ]{1,12}".prop_map(Outcome::Error),
        "[a-z ]{1,12}".prop_map(Outcome::PermanentError),
    ]
}

pub fn response_strategy() -> impl Strategy<Value = EventResponse> {
    prop::collection::vec(outcome_strategy(), 0..6).prop_map(|outcomes| {
        let mut response = EventResponse::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Message(m) => response.add_message(m),
                Outcome::Error(e) => response.add_error(e),
                Outcome::PermanentError(e) => response.add_permanent_error(e),
            };
        }
        response
    })
}
