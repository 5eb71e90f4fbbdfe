use thiserror::Error;

use crate::data::value::Datatype;

// ---------------------------------------------------------------------------
// Error kinds raised by the core
// ---------------------------------------------------------------------------

/// Every failure the dataset engine can report.
///
/// Errors are raised at the point of violation; no operation mutates its
/// inputs, so there is never anything to roll back.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A precondition on an argument was violated (range, join shape, ...).
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("nominal not found: {0}")]
    NominalNotFound(String),

    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("schema violation: {0}")]
    Schema(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Datatype, found: String },

    /// More than one row claims the same key where only one is allowed.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
