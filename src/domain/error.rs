//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Domain errors represent violations of the tree structure or failed lookups.
/// These are independent of I/O concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A path segment matched no child at its level.
    #[error("node not found: {path} (no child named '{segment}')")]
    NotFound { path: String, segment: String },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("duplicate child '{name}' under {parent}")]
    DuplicateSibling { parent: String, name: String },

    #[error("invalid node name: {0:?}")]
    InvalidName(String),

    #[error("node handle does not belong to this tree: {0:?}")]
    ForeignNode(NodeId),
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
