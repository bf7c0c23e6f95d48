//! # Event Response
//!
//! The outcome of processing a notification. Status is never stored on its own:
//! a response with any error is failed, one without is successful.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Success,
    Failed,
    /// Not processed to completion yet
    Unknown,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Success => "SUCCESS",
            EventStatus::Failed => "FAILED",
            EventStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages and errors collected while handling one notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    errors: Vec<String>,
    /// Set when at least one error can never be fixed by retrying
    #[serde(default)]
    permanent: bool,
}

impl EventResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        let mut response = Self::new();
        response.add_error(error);
        response
    }

    pub fn with_permanent_error(error: impl Into<String>) -> Self {
        let mut response = Self::new();
        response.add_permanent_error(error);
        response
    }

    pub fn status(&self) -> EventStatus {
        if self.errors.is_empty() {
            EventStatus::Success
        } else {
            EventStatus::Failed
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_permanent_failure(&self) -> bool {
        self.permanent && self.has_errors()
    }

    pub fn add_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.messages.push(message.into());
        self
    }

    /// Records an error that a later attempt may not hit again
    pub fn add_error(&mut self, error: impl Into<String>) -> &mut Self {
        self.errors.push(error.into());
        self
    }

    /// Records an error that retrying cannot fix
    pub fn add_permanent_error(&mut self, error: impl Into<String>) -> &mut Self {
        self.errors.push(error.into());
        self.permanent = true;
        self
    }

    /// Appends the other response's messages and errors after this one's
    pub fn combine(&mut self, other: EventResponse) -> &mut Self {
        self.messages.extend(other.messages);
        self.errors.extend(other.errors);
        self.permanent |= other.permanent;
        self
    }

    pub fn merged(mut self, other: EventResponse) -> Self {
        self.combine(other);
        self
    }
}
