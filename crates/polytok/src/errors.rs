//! # Error Types

use crate::types::TokenId;

/// Errors from polytok operations.
#[derive(Debug, thiserror::Error)]
pub enum PolytokError {
    /// A raw input was not valid UTF-8 where text was expected.
    #[error("invalid input text: {0}")]
    InvalidInputText(String),

    /// File-system read or write failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Artifact JSON was invalid, structurally unexpected, or held a key
    /// that does not parse as two comma-separated integers.
    #[error("model parse error: {0}")]
    ModelParse(String),

    /// A loaded model failed a merge-table invariant.
    #[error("model invariant violation: {0}")]
    ModelInvariant(String),

    /// Decode received a token with no reconstruction entry.
    #[error("unknown token {token}")]
    UnknownToken {
        /// The offending token id.
        token: TokenId,
    },

    /// Training was asked to stop between merge iterations.
    #[error("training cancelled")]
    Cancelled,

    /// The corpus source surfaced a failure.
    #[error("corpus source error: {0}")]
    Source(String),
}

/// Result type for polytok operations.
pub type PtResult<T> = core::result::Result<T, PolytokError>;
