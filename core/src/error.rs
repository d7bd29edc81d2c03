//! Error types for the mapping pipeline.

use thiserror::Error;

use crate::validate::ValidationError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors surfaced by mapping operations.
///
/// Coercion itself never fails; the only runtime failure is a
/// [`ValidationError`] bubbling up from this shape or a nested one.
/// [`UnknownShape`](MapError::UnknownShape) indicates a configuration
/// mistake: hydrating a shape name that was never registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// One or more declared constraints failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The requested shape is not in the registry.
    #[error("unknown shape: {0}")]
    UnknownShape(String),
}

impl MapError {
    /// Borrows the violation set when this is a validation failure.
    pub fn violations(&self) -> Option<&[crate::validate::Violation]> {
        match self {
            Self::Validation(error) => Some(&error.violations),
            Self::UnknownShape(_) => None,
        }
    }
}
