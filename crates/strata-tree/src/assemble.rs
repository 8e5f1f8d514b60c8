//! The merge engine: reconciling a base node with a forward-delta overlay.
//!
//! Every higher-level operation (chain reads, mutations, delta compression,
//! rerooting) bottoms out in the two primitives here: a two-pointer merge of
//! sorted child arrays ([`assemble_children`]) and the node-level
//! reconciliation rule table ([`Node::assemble_with`]).

use strata_path::TreePath;

use crate::node::{Node, NodeRef};

/// Merge two name-sorted child arrays, treating `new` as a forward delta
/// over `old`.
///
/// Matching names assemble recursively; names only in `old` are kept as-is;
/// names only in `new` are kept unless they are deletion markers and
/// `keep_deleted` is false. A merged result that comes out deleted is
/// dropped under the same rule. `keep_deleted` is true while reconciling two
/// delta layers (a deletion recorded partway up a chain must keep shadowing
/// complete ancestors further down) and false once one side is complete.
pub fn assemble_children<T: Clone>(
    old: &[NodeRef<T>],
    new: &[NodeRef<T>],
    keep_deleted: bool,
) -> Vec<NodeRef<T>> {
    if should_binary_insert(old.len(), new.len()) {
        return assemble_by_insertion(old, new, keep_deleted);
    }

    let mut result = Vec::with_capacity(old.len() + new.len());
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        match old[i].name_str().cmp(new[j].name_str()) {
            std::cmp::Ordering::Less => {
                result.push(old[i].clone());
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                let node = &new[j];
                if keep_deleted || !node.is_deleted() {
                    result.push(node.clone());
                }
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                let merged = old[i].assemble_with(&new[j]);
                if keep_deleted || !merged.is_deleted() {
                    result.push(merged);
                }
                i += 1;
                j += 1;
            }
        }
    }
    result.extend(old[i..].iter().cloned());
    for node in &new[j..] {
        if keep_deleted || !node.is_deleted() {
            result.push(node.clone());
        }
    }
    result
}

/// Heuristic switch: when the overlay is much smaller than the base (by more
/// than a log factor), per-element binary insertion beats the linear merge.
/// This is a performance choice only; the linear merge is always correct.
fn should_binary_insert(old_len: usize, new_len: usize) -> bool {
    new_len > 0 && new_len * log2(old_len) < old_len
}

fn log2(n: usize) -> usize {
    (usize::BITS - n.leading_zeros()) as usize
}

fn assemble_by_insertion<T: Clone>(
    old: &[NodeRef<T>],
    new: &[NodeRef<T>],
    keep_deleted: bool,
) -> Vec<NodeRef<T>> {
    let mut result = old.to_vec();
    for node in new {
        match result.binary_search_by(|c| c.name_str().cmp(node.name_str())) {
            Ok(index) => {
                let merged = result[index].assemble_with(node);
                if keep_deleted || !merged.is_deleted() {
                    result[index] = merged;
                } else {
                    result.remove(index);
                }
            }
            Err(index) => {
                if keep_deleted || !node.is_deleted() {
                    result.insert(index, node.clone());
                }
            }
        }
    }
    result
}

impl<T: Clone> Node<T> {
    /// Reconcile this node (the base) with `other` (a forward delta on it),
    /// producing the assembled node.
    ///
    /// A deleted base contributes nothing, and a complete-shaped overlay
    /// (complete node or deletion marker) is authoritative, so either way the
    /// overlay passes through verbatim. Otherwise the overlay is a delta:
    /// its data wins when it carries any, and the children merge with
    /// deletions kept only while both sides are still deltas.
    pub fn assemble_with(&self, other: &NodeRef<T>) -> NodeRef<T> {
        if self.is_deleted() || !other.is_delta() {
            return other.clone();
        }
        let keep_deleted = self.is_delta();
        let children = assemble_children(self.children(), other.children(), keep_deleted);
        let name = other.name().cloned();
        match (self, &**other) {
            (Node::Complete { data, .. }, Node::NoDataDelta { .. }) => {
                Node::complete_named(name, data.clone(), children)
            }
            (Node::Complete { .. }, Node::DataDelta { data, .. }) => {
                Node::complete_named(name, data.clone(), children)
            }
            (Node::DataDelta { data, .. }, Node::NoDataDelta { .. }) => {
                Node::data_delta_named(name, data.clone(), children)
            }
            (_, Node::DataDelta { data, .. }) => {
                Node::data_delta_named(name, data.clone(), children)
            }
            (Node::NoDataDelta { .. }, Node::NoDataDelta { .. }) => {
                Node::no_data_delta_named(name, children)
            }
            // Deleted base and complete-shaped overlays returned above.
            _ => unreachable!("assemble rule table is exhaustive"),
        }
    }

    /// Path-directed assemble: descend to the child addressed by `key`
    /// (starting at segment `depth`), copy-on-write along the spine, and
    /// reconcile the node at `key` with `delta`.
    ///
    /// `delta` is a node named after `key`'s final segment. When the spine
    /// dead-ends before reaching `key`, the missing interior levels are
    /// synthesized as a chain of `NoDataDelta` wrappers around `delta`.
    pub fn assemble_at(&self, delta: &NodeRef<T>, key: &TreePath, depth: usize) -> NodeRef<T> {
        let segment_count = key.segment_count();
        if depth == segment_count {
            return self.assemble_with(delta);
        }
        let segment = key
            .segment(depth)
            .expect("depth is bounded by the segment count");
        match self.child_index(segment) {
            Ok(index) => {
                let children = self.children();
                let replaced = children[index].assemble_at(delta, key, depth + 1);
                let mut new_children = children.to_vec();
                new_children[index] = replaced;
                self.with_children(new_children)
            }
            Err(index) => {
                // The spine stops here: wrap the delta in one NoDataDelta
                // per missing interior level, then splice it in.
                let mut node = delta.clone();
                for level in (depth..segment_count - 1).rev() {
                    let wrapper_name = key
                        .segment(level)
                        .expect("level is bounded by the segment count");
                    node = Node::no_data_delta(Some(wrapper_name), vec![node]);
                }
                let mut new_children = self.children().to_vec();
                new_children.insert(index, node);
                self.with_children(new_children)
            }
        }
    }
}
