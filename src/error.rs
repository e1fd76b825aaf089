//! Error kinds surfaced by the core (see spec §7).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid FEN field `{field}`: {reason}")]
    ParseError { field: &'static str, reason: String },

    #[error("illegal move passed to make_move: {reason}")]
    IllegalMove { reason: String },

    #[error("internal invariant violated: {0}")]
    CoherenceError(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
