//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::{Entity, Field};

/// Domain errors abort the current conversion; no partial tree is returned.
///
/// Row indices are zero-based positions in the row sequence handed to the codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("row {row} has {cells} cells, at least {expected} required")]
    MalformedRow {
        row: usize,
        cells: usize,
        expected: usize,
    },

    #[error("one or more entity fields are empty: `{field}` is blank")]
    EmptyField { field: Field, entity: Box<Entity> },

    #[error("row {row} is a branch but no top-level entity precedes it")]
    OrphanBranch { row: usize },

    #[error("expected {expected}, found {found}")]
    InvalidShape {
        expected: &'static str,
        found: String,
    },

    #[error("row {row} nests a branch inside a branch, only two levels are supported")]
    NestedBranch { row: usize },

    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },
}

impl DomainError {
    /// Stable kind name shown to users.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::MalformedRow { .. } => "MalformedRowError",
            DomainError::EmptyField { .. } => "EmptyFieldError",
            DomainError::OrphanBranch { .. } => "OrphanBranchError",
            DomainError::InvalidShape { .. } => "InvalidShapeError",
            DomainError::NestedBranch { .. } => "NestedBranchError",
            DomainError::MalformedHeader { .. } => "MalformedHeaderError",
        }
    }

    /// JSON of the offending entity, when the error carries one.
    pub fn offending_value(&self) -> Option<String> {
        match self {
            DomainError::EmptyField { entity, .. } => Some(entity.to_json_pretty()),
            _ => None,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
