use thiserror::Error;

/// Errors produced when parsing textual paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The textual form contained an empty segment (e.g. `"a//b"`).
    #[error("path contains an empty segment: {0:?}")]
    EmptySegment(String),
}
