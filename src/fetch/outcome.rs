// Fetch outcome.
// Terminal states of a fetch or send.

use serde_json::Value;

use crate::error::StoreError;

/// How a fetch or send finished.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The server sent a fresh payload; holds the transformed value.
    Success(Value),
    /// The cached copy is still current; holds it, if one was cached.
    NotModified(Option<Value>),
    /// The server answered with any other status.
    Failed { status: u16, body: String },
    /// The request could not be built or completed.
    Error(StoreError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_) | FetchOutcome::NotModified(_))
    }

    /// The value a caller should use, fresh or cached.
    pub fn value(&self) -> Option<&Value> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            FetchOutcome::NotModified(value) => value.as_ref(),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            FetchOutcome::NotModified(value) => value,
            _ => None,
        }
    }
}
