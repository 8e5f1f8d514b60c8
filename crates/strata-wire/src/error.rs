//! Error types for the wire format.

use strata_path::TreePath;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a tree.
#[derive(Debug, Error)]
pub enum WireError {
    /// Underlying stream failure (including truncated input).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The input carried a node type tag outside the defined codes.
    #[error("unknown node type tag: {0}")]
    InvalidTypeTag(u8),

    /// A name field was not valid UTF-8.
    #[error("invalid UTF-8 in name field")]
    InvalidString,

    /// A length does not fit the wire format's 4-byte escape.
    #[error("length does not fit the wire format")]
    LengthOverflow,

    /// Structurally invalid record (e.g. a deleted node carrying children).
    #[error("malformed record: {0}")]
    Malformed(String),

    /// A path-scoped write addressed a path the tree does not contain.
    #[error("path not present in tree: {0}")]
    NotFound(TreePath),

    /// The payload codec failed to encode or decode a value.
    #[error("payload codec error: {0}")]
    Flatten(String),
}

/// Convenience alias for wire results.
pub type WireResult<T> = Result<T, WireError>;
