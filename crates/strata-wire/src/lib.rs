//! Binary serialization for strata trees.
//!
//! Encodes and decodes a single tree (no parent chain) with a compact,
//! implementation-independent layout: variable-length integers, UTF-8
//! names, one type tag per node variant, and payloads flattened through a
//! caller-supplied codec. Supports full, bounded-depth, and path-scoped
//! encodes.
//!
//! # Key Types
//!
//! - [`TreeWriter`] / [`TreeReader`] — Recursive node-record codec
//! - [`Depth`] — Unbounded or bounded-depth traversal
//! - [`Flattener`] — Pluggable payload codec ([`JsonFlattener`] for any
//!   serde payload)
//! - [`WireError`] — Typed decode/encode failures

pub mod error;
pub mod flatten;
pub mod reader;
pub mod writer;

mod varint;

pub use error::{WireError, WireResult};
pub use flatten::{Flattener, JsonFlattener};
pub use reader::TreeReader;
pub use writer::{Depth, TreeWriter};
