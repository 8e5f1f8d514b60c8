//! Path value type for strata trees.
//!
//! A [`TreePath`] is an ordered sequence of string segments addressing a node
//! in a hierarchical tree. The root path has zero segments. Paths are
//! immutable values: structural operations like [`TreePath::append`] and
//! [`TreePath::remove_last_segments`] return new paths.

pub mod error;
pub mod path;

pub use error::PathError;
pub use path::TreePath;
