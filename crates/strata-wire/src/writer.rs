//! Binary tree encoding.
//!
//! A node record is: name (UTF-8 string, `""` for the unnamed root), type
//! tag, then — for the data-bearing variants — a presence flag and the
//! flattened payload, then child count and child records. A bounded-depth
//! encode writes `child_count = 0` past the limit. A path-scoped encode
//! writes the spine from the root to the target path (each spine node with
//! its own data and a child count of 1) followed by the subtree at the path.

use std::io::Write;

use strata_path::TreePath;
use strata_tree::{DeltaTree, Node};

use crate::error::{WireError, WireResult};
use crate::flatten::Flattener;
use crate::varint::{write_bytes, write_string, write_u8, write_varint};

/// Wire codes for the four node variants.
pub(crate) const TAG_COMPLETE: u8 = 0;
pub(crate) const TAG_DATA_DELTA: u8 = 1;
pub(crate) const TAG_DELETED: u8 = 2;
pub(crate) const TAG_NO_DATA_DELTA: u8 = 3;

/// How deep an encode descends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Depth {
    /// Encode the full subtree.
    Infinite,
    /// Encode this many levels below the starting node; children beyond the
    /// limit are written as `child_count = 0`.
    Limit(u32),
}

impl Depth {
    fn exhausted(self) -> bool {
        matches!(self, Depth::Limit(0))
    }

    fn descend(self) -> Self {
        match self {
            Depth::Infinite => Depth::Infinite,
            Depth::Limit(0) => Depth::Limit(0),
            Depth::Limit(n) => Depth::Limit(n - 1),
        }
    }
}

/// Encodes a single tree (no parent chain) to a byte stream.
pub struct TreeWriter<'a, T> {
    flattener: &'a dyn Flattener<T>,
}

impl<'a, T: Clone> TreeWriter<'a, T> {
    pub fn new(flattener: &'a dyn Flattener<T>) -> Self {
        Self { flattener }
    }

    /// Write the tree's own node graph scoped to `path`: the spine from the
    /// root down to `path`, then the subtree at `path` to the given depth.
    ///
    /// The path must be present in the tree's own layer.
    pub fn write_tree<W: Write>(
        &self,
        tree: &DeltaTree<T>,
        path: &TreePath,
        depth: Depth,
        out: &mut W,
    ) -> WireResult<()> {
        let mut prefix = TreePath::root();
        let mut current = tree.root_node();
        for index in 0..path.segment_count() {
            self.write_header(&current, &prefix, out)?;
            write_varint(out, 1)?;
            let segment = path
                .segment(index)
                .expect("index is bounded by the segment count");
            current = current
                .child(segment)
                .cloned()
                .ok_or_else(|| WireError::NotFound(path.clone()))?;
            prefix = prefix.append(segment);
        }
        self.write_node(&current, &prefix, depth, out)
    }

    /// Write one node record (recursively, to the given depth). `path` is
    /// the node's own path, used only by the payload flattener.
    pub fn write_node<W: Write>(
        &self,
        node: &Node<T>,
        path: &TreePath,
        depth: Depth,
        out: &mut W,
    ) -> WireResult<()> {
        self.write_header(node, path, out)?;
        let children = node.children();
        if depth.exhausted() {
            write_varint(out, 0)?;
            return Ok(());
        }
        write_varint(out, children.len())?;
        let below = depth.descend();
        for child in children {
            self.write_node(child, &path.append(child.name_str()), below, out)?;
        }
        Ok(())
    }

    fn write_header<W: Write>(
        &self,
        node: &Node<T>,
        path: &TreePath,
        out: &mut W,
    ) -> WireResult<()> {
        write_string(out, node.name_str())?;
        write_u8(out, type_tag(node))?;
        if node.has_data() {
            match node.data() {
                Some(value) => {
                    write_u8(out, 1)?;
                    write_bytes(out, &self.flattener.encode(path, value)?)?;
                }
                None => write_u8(out, 0)?,
            }
        }
        Ok(())
    }
}

fn type_tag<T>(node: &Node<T>) -> u8 {
    match node {
        Node::Complete { .. } => TAG_COMPLETE,
        Node::DataDelta { .. } => TAG_DATA_DELTA,
        Node::Deleted { .. } => TAG_DELETED,
        Node::NoDataDelta { .. } => TAG_NO_DATA_DELTA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::JsonFlattener;

    #[test]
    fn encoded_bytes_match_layout() {
        // root (no name, no data) with one child "a" carrying JSON 7
        let root = Node::complete(
            None,
            None,
            vec![Node::complete(Some("a"), Some(7u32), vec![])],
        );
        let mut buffer = Vec::new();
        TreeWriter::new(&JsonFlattener)
            .write_node(&root, &TreePath::root(), Depth::Infinite, &mut buffer)
            .unwrap();
        assert_eq!(
            buffer,
            vec![
                0x00, // root name: empty string
                TAG_COMPLETE,
                0x00, // no data
                0x01, // one child
                0x01, b'a', // child name
                TAG_COMPLETE,
                0x01, // has data
                0x01, b'7', // payload: one byte of JSON
                0x00, // no grandchildren
            ]
        );
    }

    #[test]
    fn depth_zero_cuts_children() {
        let root = Node::complete(
            None,
            Some(1u32),
            vec![Node::complete(Some("a"), Some(2), vec![])],
        );
        let mut full = Vec::new();
        let mut bounded = Vec::new();
        let writer = TreeWriter::new(&JsonFlattener);
        writer
            .write_node(&root, &TreePath::root(), Depth::Infinite, &mut full)
            .unwrap();
        writer
            .write_node(&root, &TreePath::root(), Depth::Limit(0), &mut bounded)
            .unwrap();
        assert!(bounded.len() < full.len());
        assert_eq!(bounded.last(), Some(&0x00)); // child count written as zero
    }

    #[test]
    fn path_scoped_write_requires_spine() {
        let tree: DeltaTree<u32> = DeltaTree::new();
        let mut buffer = Vec::new();
        let err = TreeWriter::new(&JsonFlattener)
            .write_tree(
                &tree,
                &"/missing".parse().unwrap(),
                Depth::Infinite,
                &mut buffer,
            )
            .unwrap_err();
        assert!(matches!(err, WireError::NotFound(_)));
    }
}
