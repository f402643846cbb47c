//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

/// Domain errors represent wiring violations detected by the checked operations.
/// The permissive operations (`add`, `set_next`) never produce them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0:?}")]
    NodeNotFound(Index),

    #[error("node is a leaf and cannot hold children: {0}")]
    NotAContainer(String),

    #[error("node already attached to a parent: {0}")]
    AlreadyAttached(String),

    #[error("weight overflow in: {0}")]
    WeightOverflow(String),

    #[error("cycle detected at: {0}")]
    CycleDetected(String),

    #[error("successor already set for handler: {0}")]
    SuccessorAlreadySet(String),

    #[error("unknown handler: {0}")]
    UnknownHandler(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
