//! Binary tree decoding.

use std::io::Read;

use strata_path::TreePath;
use strata_tree::{DeltaTree, Node, NodeRef};

use crate::error::{WireError, WireResult};
use crate::flatten::Flattener;
use crate::varint::{read_bytes, read_string, read_u8, read_varint};
use crate::writer::{TAG_COMPLETE, TAG_DATA_DELTA, TAG_DELETED, TAG_NO_DATA_DELTA};

/// Decodes a single tree (no parent chain) from a byte stream.
pub struct TreeReader<'a, T> {
    flattener: &'a dyn Flattener<T>,
}

impl<'a, T: Clone> TreeReader<'a, T> {
    pub fn new(flattener: &'a dyn Flattener<T>) -> Self {
        Self { flattener }
    }

    /// Read one tree and wrap it as a parentless, mutable delta tree.
    ///
    /// Path-scoped encodes read back naturally: the spine appears as a
    /// chain of single-child nodes.
    pub fn read_tree<R: Read>(&self, input: &mut R) -> WireResult<DeltaTree<T>> {
        Ok(DeltaTree::with_root(
            self.read_node(&TreePath::root(), input)?,
        ))
    }

    /// Read one node record (recursively). `parent_path` is the path of the
    /// record's parent; the node's own name is part of the record. Only the
    /// unnamed root encodes an empty name.
    pub fn read_node<R: Read>(
        &self,
        parent_path: &TreePath,
        input: &mut R,
    ) -> WireResult<NodeRef<T>> {
        let name = read_string(input)?;
        let node_path = if name.is_empty() {
            parent_path.clone()
        } else {
            parent_path.append(&name)
        };
        let node_name = if name.is_empty() {
            None
        } else {
            Some(name.as_str())
        };

        let tag = read_u8(input)?;
        match tag {
            TAG_COMPLETE | TAG_DATA_DELTA => {
                let data = if read_u8(input)? != 0 {
                    let bytes = read_bytes(input)?;
                    Some(self.flattener.decode(&node_path, &bytes)?)
                } else {
                    None
                };
                let children = self.read_children(&node_path, input)?;
                Ok(if tag == TAG_COMPLETE {
                    Node::complete(node_name, data, children)
                } else {
                    Node::data_delta(node_name, data, children)
                })
            }
            TAG_NO_DATA_DELTA => {
                let children = self.read_children(&node_path, input)?;
                Ok(Node::no_data_delta(node_name, children))
            }
            TAG_DELETED => {
                let child_count = read_varint(input)?;
                if child_count != 0 {
                    return Err(WireError::Malformed(format!(
                        "deleted node {node_path} carries {child_count} children"
                    )));
                }
                Ok(Node::deleted(node_name))
            }
            other => Err(WireError::InvalidTypeTag(other)),
        }
    }

    fn read_children<R: Read>(
        &self,
        node_path: &TreePath,
        input: &mut R,
    ) -> WireResult<Vec<NodeRef<T>>> {
        let count = read_varint(input)?;
        let mut children = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            children.push(self.read_node(node_path, input)?);
        }
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::JsonFlattener;
    use crate::writer::{Depth, TreeWriter};

    fn roundtrip(root: &NodeRef<u32>) -> NodeRef<u32> {
        let mut buffer = Vec::new();
        TreeWriter::new(&JsonFlattener)
            .write_node(root, &TreePath::root(), Depth::Infinite, &mut buffer)
            .unwrap();
        TreeReader::new(&JsonFlattener)
            .read_node(&TreePath::root(), &mut buffer.as_slice())
            .unwrap()
    }

    #[test]
    fn complete_tree_roundtrip() {
        let root = Node::complete(
            None,
            Some(0u32),
            vec![
                Node::complete(
                    Some("a"),
                    Some(1),
                    vec![Node::complete(Some("b"), None, vec![])],
                ),
                Node::complete(Some("z"), Some(26), vec![]),
            ],
        );
        assert_eq!(&*roundtrip(&root), &*root);
    }

    #[test]
    fn all_variants_roundtrip() {
        let root: NodeRef<u32> = Node::no_data_delta(
            None,
            vec![
                Node::complete(Some("added"), Some(1), vec![]),
                Node::data_delta(Some("changed"), Some(2), vec![Node::deleted(Some("gone"))]),
                Node::deleted(Some("removed")),
            ],
        );
        assert_eq!(&*roundtrip(&root), &*root);
    }

    #[test]
    fn unknown_tag_rejected() {
        let raw = vec![0x00, 0x09];
        let err = TreeReader::<u32>::new(&JsonFlattener)
            .read_node(&TreePath::root(), &mut raw.as_slice())
            .unwrap_err();
        assert!(matches!(err, WireError::InvalidTypeTag(9)));
    }

    #[test]
    fn deleted_node_with_children_rejected() {
        // name "", tag deleted, child count 1
        let raw = vec![0x00, 0x02, 0x01];
        let err = TreeReader::<u32>::new(&JsonFlattener)
            .read_node(&TreePath::root(), &mut raw.as_slice())
            .unwrap_err();
        assert!(matches!(err, WireError::Malformed(_)));
    }

    #[test]
    fn truncated_stream_is_io_error() {
        let root = Node::complete(None, Some(5u32), vec![]);
        let mut buffer = Vec::new();
        TreeWriter::new(&JsonFlattener)
            .write_node(&root, &TreePath::root(), Depth::Infinite, &mut buffer)
            .unwrap();
        buffer.truncate(buffer.len() - 1);
        let err = TreeReader::<u32>::new(&JsonFlattener)
            .read_node(&TreePath::root(), &mut buffer.as_slice())
            .unwrap_err();
        assert!(matches!(err, WireError::Io(_)));
    }
}
