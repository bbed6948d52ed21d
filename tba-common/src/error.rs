//! Error kinds for codec, container and retargeting operations.
//!
//! Every failure is final for the operation in progress: nothing is retried and
//! no partially decoded clip is ever returned.

use std::fmt;

/// Error type for every `tba-common` operation.
#[derive(Debug, thiserror::Error)]
pub enum TbaError {
    /// Structured form is malformed or incomplete (missing key, wrong type,
    /// unknown enum tag, element count mismatch).
    #[error("Schema error: {0}")]
    Schema(String),

    /// Compressed stream is truncated or invalid.
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// Retargeting could not run (missing hip bone, missing bind pose, bad options).
    #[error("Retarget error: {0}")]
    Retarget(String),

    /// Clip or skeleton invariants violated.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Discriminant of [`TbaError`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Schema,
    CorruptData,
    Retarget,
    Validation,
}

impl TbaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TbaError::Schema(_) => ErrorKind::Schema,
            TbaError::CorruptData(_) => ErrorKind::CorruptData,
            TbaError::Retarget(_) => ErrorKind::Retarget,
            TbaError::Validation(_) => ErrorKind::Validation,
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        TbaError::Schema(message.into())
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        TbaError::CorruptData(message.into())
    }

    pub(crate) fn retarget(message: impl Into<String>) -> Self {
        TbaError::Retarget(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        TbaError::Validation(message.into())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Schema => "SchemaError",
            ErrorKind::CorruptData => "CorruptDataError",
            ErrorKind::Retarget => "RetargetError",
            ErrorKind::Validation => "ValidationError",
        };
        f.write_str(name)
    }
}
