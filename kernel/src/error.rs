use std::fmt::Display;

use error_stack::Context;

use crate::entity::BookState;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum KernelError {
    /// The workflow has no edge from `from` to `to`.
    InvalidTransition {
        from: BookState,
        to: BookState,
    },
    Validation,
    /// Raised by storage drivers only.
    UniquenessViolation,
    /// Raised by storage drivers only.
    PositiveValueViolation,
    NotFound,
    Concurrency,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::InvalidTransition { from, to } => {
                write!(f, "Transition from {from} to {to} is not allowed")
            }
            KernelError::Validation => write!(f, "Validation error"),
            KernelError::UniquenessViolation => write!(f, "Unique constraint violated"),
            KernelError::PositiveValueViolation => write!(f, "Value must be positive"),
            KernelError::NotFound => write!(f, "Record not found"),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
