//! Read-resolution result type.

use strata_path::TreePath;

/// The outcome of resolving a path against a tree, without raising on
/// absence.
///
/// `in_top_layer` reports whether the match came from the queried tree's own
/// layer rather than an ancestor; callers implementing read-your-own-writes
/// semantics use it to distinguish local changes from inherited state.
#[derive(Clone, Debug, PartialEq)]
pub struct Lookup<T> {
    /// The path that was resolved.
    pub key: TreePath,
    /// Whether the path resolves to a present node.
    pub found: bool,
    /// The node's data, when found (a node may be present with no data).
    pub data: Option<T>,
    /// Whether the match came from the top-most layer of the chain.
    pub in_top_layer: bool,
}

impl<T> Lookup<T> {
    /// A successful resolution.
    pub fn found(key: TreePath, data: Option<T>, in_top_layer: bool) -> Self {
        Self {
            key,
            found: true,
            data,
            in_top_layer,
        }
    }

    /// A failed resolution.
    pub fn absent(key: TreePath) -> Self {
        Self {
            key,
            found: false,
            data: None,
            in_top_layer: false,
        }
    }
}
