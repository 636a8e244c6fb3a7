//! Kernel error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN has {0} fields, expected at least 4")]
    MissingFields(usize),

    #[error("FEN board has {0} ranks, expected 8")]
    BadRankCount(usize),

    #[error("invalid character '{0}' in FEN board field")]
    BadPieceChar(char),

    #[error("FEN rank overflows 8 files: {0}")]
    RankOverflow(String),

    #[error("invalid en passant square '{0}'")]
    BadEnPassant(String),

    #[error("invalid clock field '{0}'")]
    BadClock(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("empty SAN token")]
    Empty,

    #[error("unparseable SAN token '{0}'")]
    Invalid(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error(transparent)]
    San(#[from] SanError),

    #[error("no piece can play '{0}'")]
    NoSource(String),

    #[error("ambiguous SAN '{0}': {1} candidate pieces")]
    Ambiguous(String, usize),
}
