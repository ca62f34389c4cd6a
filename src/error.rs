//! Error types for the text core.
use thiserror::Error;

/// Errors raised by the piece table and the session built on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Offset or length outside `[0, document_length]`
    #[error("range {offset}+{length} is outside document of length {document_length}")]
    OutOfRange {
        offset: usize,
        length: usize,
        document_length: usize,
    },

    /// Line/column position outside the document or past the end of its line
    #[error("position {line}:{column} is outside document of {line_count} lines")]
    PositionOutOfRange {
        line: usize,
        column: usize,
        line_count: usize,
    },

    /// No piece owns the requested line
    #[error("no piece owns line {line}")]
    LineNotFound { line: usize },

    /// Highlight response computed against an older document generation
    #[error("stale highlight result: expected generation {expected}, received {received}")]
    StaleHighlightResult { expected: u64, received: u64 },

    /// Save requested with no destination path
    #[error("no destination path")]
    MissingPath,

    /// Offset lands inside a multi-byte character
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// Offset lands between the two bytes of a CRLF separator
    #[error("offset {offset} splits a line ending")]
    SplitsLineEnding { offset: usize },

    #[error("highlight provider failed: {0}")]
    HighlightFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
