//! Append-only revision history.
//!
//! Every accepted edit becomes a [`Revision`]: a numbered, immutable record
//! of who changed what and when. Numbers start at 1 and are strictly
//! increasing and gap-free; the history is the authoritative account of the
//! project and is never rewritten.

use serde::{Deserialize, Serialize};

use crate::change::ChangeBatch;
use crate::error::RevisionError;

pub mod store;

pub use store::RevisionStore;

pub type RevisionResult<T> = std::result::Result<T, RevisionError>;

/// A 1-based revision number. Zero means "before any revision".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RevisionNumber(u64);

impl RevisionNumber {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RevisionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Identity of the user who authored an edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One accepted edit: the change batch plus its authorship metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub number: RevisionNumber,
    pub author: UserId,
    pub timestamp_ms: u64,
    pub comment: String,
    pub changes: ChangeBatch,
}

impl Revision {
    /// The literal number of change records in this revision.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}
