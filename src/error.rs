//! Crate-level error taxonomy for board operations.
//!
//! Propagation policy: every core function either returns a value or fails
//! explicitly. Read paths report a missing document as `None`; update and
//! delete on a missing board are errors. Validation failures are raised
//! before any I/O. No operation retries.

use crate::contract::{CompletionError, StoreError};
use crate::extract::ExtractError;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// A required identifier (board id, owner id) was missing or empty.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Update or delete targeted a board that does not exist.
    #[error("board {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Extraction(#[from] ExtractError),
}
