//! Versioned, hierarchical key-value trees.
//!
//! strata maintains families of logical tree snapshots over slash-separated
//! paths. Each snapshot is either a complete tree or a delta against a
//! frozen parent snapshot, so holding many historical or parallel versions
//! of a large tree costs memory proportional to what actually changed.
//!
//! # Key Types
//!
//! - [`Node`] / [`NodeRef`] — The four node variants (complete, data-delta,
//!   no-data-delta, deleted) forming every tree
//! - [`CompleteTree`] — A standalone, fully materialized tree
//! - [`DeltaTree`] — A tree expressed as a chain of overlays; the public
//!   read/write API and the delta algebra (forward/backward deltas,
//!   comparison, collapse, reroot)
//! - [`Comparator`] / [`NodeComparison`] / [`ChangeKind`] — Payload
//!   comparison and the comparison-tree payload
//! - [`Lookup`] — Non-raising read resolution result
//! - [`StringPool`] / [`InternStrings`] — Optional string-compaction hook

pub mod assemble;
pub mod compare;
pub mod delta;
pub mod error;
pub mod lookup;
pub mod node;
pub mod pool;
pub mod tree;

mod diff;

pub use assemble::assemble_children;
pub use compare::{ChangeKind, Comparator, EqualityComparator, NodeComparison};
pub use delta::DeltaTree;
pub use error::{TreeError, TreeResult};
pub use lookup::Lookup;
pub use node::{Node, NodeRef};
pub use pool::{InternStrings, StringPool};
pub use tree::CompleteTree;
