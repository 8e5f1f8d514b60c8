//! Error types for tree operations.

use strata_path::TreePath;
use thiserror::Error;

/// Errors that can occur while reading or mutating a tree.
///
/// Structural invariant violations (a delta chain with no complete anchor)
/// are not represented here: they indicate a bug in the code that built the
/// chain and surface as panics instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The path does not resolve to a present node in the tree (missing,
    /// or explicitly deleted in a delta layer).
    #[error("path not found in tree: {0}")]
    NotFound(TreePath),

    /// A mutation was attempted on a tree that has been sealed.
    #[error("tree is immutable")]
    ImmutableTree,

    /// An operation that needs a frozen base (branching a new delta,
    /// rerooting) was attempted on a tree that is still mutable.
    #[error("operation requires an immutable tree")]
    ImmutableRequired,
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
