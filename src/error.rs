//! Error types for the event store, its storage backends and input parsing.

use crate::model::Slot;
use thiserror::Error;

/// Errors returned by the mutating operations of [`crate::store::EventStore`].
///
/// Every variant aborts only the operation that produced it; the event set is
/// left exactly as it was before the call.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("an event is already scheduled at {slot}")]
    Conflict { slot: Slot, existing: String },

    #[error("event not found: {0}")]
    NotFound(String),

    #[error("event title must not be empty")]
    EmptyTitle,

    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures of a [`crate::storage::Storage`] backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored events are malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("failed to serialize events: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors from parsing user-typed times, slots and smart input lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("invalid date-time '{0}', expected YYYY-MM-DDTHH:MM")]
    InvalidSlot(String),

    #[error("unknown recurrence '{0}'")]
    InvalidRecurrence(String),

    #[error("no time given, add one like @09:00")]
    MissingTime,
}
