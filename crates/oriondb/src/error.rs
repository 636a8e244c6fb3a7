//! Database error types.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("invalid archive: bad magic bytes")]
    BadMagic,

    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    #[error("truncated archive record")]
    Truncated,

    #[error("corrupt archive record: {0}")]
    Corrupt(String),

    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("index sidecar not found: {0}")]
    MissingSidecar(String),

    #[error("index sidecar error: {0}")]
    Sidecar(#[from] serde_json::Error),

    #[error("invalid FEN in query: {0}")]
    InvalidFen(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Cql(#[from] CqlError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CqlError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("expected {expected} at position {pos}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        pos: usize,
    },

    #[error("operator '{op}' is not supported for field '{field}'")]
    UnsupportedOperator { op: String, field: String },

    #[error("field '{field}' expects a numeric value")]
    ExpectedNumber { field: String },
}
