//! Error types for Badge Flow operations.
//!
//! Every variant is recoverable: request handlers turn it into a transient
//! status message and the document is left untouched.

use crate::config::NotifyTimeouts;
use crate::id::{NodeId, SequenceId};
use crate::model::ItemKind;
use thiserror::Error;

/// Main error type for item creation and renumbering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BfError {
    /// Malformed size, colour, or requested number.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The id does not resolve to a tagged item of the expected kind.
    #[error("{kind} {id} not found or not a valid item")]
    ItemNotFound { kind: ItemKind, id: NodeId },

    /// Stored metadata is present but unusable.
    #[error("Corrupt {kind} metadata: {message}")]
    CorruptState { kind: ItemKind, message: String },

    /// No valid item carries the sequence id.
    #[error("No {kind} found in sequence {sequence}")]
    SequenceNotFound { kind: ItemKind, sequence: SequenceId },

    /// Requested number exceeds the sequence length.
    #[error("New number {requested} exceeds the {len} {kind} items in the sequence")]
    OutOfRange {
        kind: ItemKind,
        requested: u64,
        len: usize,
    },

    /// The host did not produce the node it was asked to build.
    #[error("Failed to create {0}")]
    MaterializationFailure(String),

    /// Unexpected failure reported by a host collaborator (font loading, ...).
    #[error("{0}")]
    Host(String),
}

impl BfError {
    /// Short rule-style identifier, handy for logs and tests.
    pub fn code(&self) -> &'static str {
        match self {
            BfError::InvalidInput(_) => "invalid-input",
            BfError::ItemNotFound { .. } => "item-not-found",
            BfError::CorruptState { .. } => "corrupt-state",
            BfError::SequenceNotFound { .. } => "sequence-not-found",
            BfError::OutOfRange { .. } => "out-of-range",
            BfError::MaterializationFailure(_) => "materialization-failure",
            BfError::Host(_) => "host",
        }
    }

    /// Whether the error comes from a collaborator rather than from
    /// validating the request against the document.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, BfError::Host(_))
    }

    /// How long the status message for this error stays up.
    pub fn status_timeout_ms(&self, timeouts: &NotifyTimeouts) -> u32 {
        match self {
            BfError::OutOfRange { .. } => timeouts.out_of_range,
            _ => timeouts.error,
        }
    }
}

/// Result type alias for Badge Flow operations.
pub type Result<T> = std::result::Result<T, BfError>;
