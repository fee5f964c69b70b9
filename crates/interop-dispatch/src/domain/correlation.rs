//! Correlation ID for matching calls with their completions.
//!
//! Locally issued ids are UUID v7 (time-ordered). The canonical wire form
//! is the string rendering; completion messages that carry a JSON integer
//! in the id slot are canonicalized to the decimal string at decode time.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlation ID tying an outbound call to its completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a fresh correlation ID (UUID v7 string)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Canonical form of an integer wire id
    pub fn from_integer(id: u64) -> Self {
        Self(id.to_string())
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
