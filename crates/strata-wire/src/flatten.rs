//! Pluggable payload codec.

use serde::de::DeserializeOwned;
use serde::Serialize;
use strata_path::TreePath;

use crate::error::{WireError, WireResult};

/// Encodes and decodes tree payloads.
///
/// The path is passed through so codecs can vary their representation by
/// location in the tree. A node may exist with no payload at all; the wire
/// layer handles that case itself, so a flattener only ever sees present
/// values.
pub trait Flattener<T> {
    fn encode(&self, path: &TreePath, value: &T) -> WireResult<Vec<u8>>;
    fn decode(&self, path: &TreePath, bytes: &[u8]) -> WireResult<T>;
}

/// JSON-backed flattener for any serde-capable payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFlattener;

impl<T: Serialize + DeserializeOwned> Flattener<T> for JsonFlattener {
    fn encode(&self, _path: &TreePath, value: &T) -> WireResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| WireError::Flatten(e.to_string()))
    }

    fn decode(&self, _path: &TreePath, bytes: &[u8]) -> WireResult<T> {
        serde_json::from_slice(bytes).map_err(|e| WireError::Flatten(e.to_string()))
    }
}
