//! State error types

use thiserror::Error;

use crate::state::StateKey;

/// Errors raised by typed access to container state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A key was required but is neither stored nor controlled
    #[error("state key not found: {0}")]
    MissingKey(StateKey),
}

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;
