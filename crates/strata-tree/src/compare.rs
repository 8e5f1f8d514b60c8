//! Tree-to-tree comparison: the `NodeComparison` payload and the mirror
//! merges that produce comparison trees.
//!
//! A comparison tree is an ordinary tree whose payload type is
//! [`NodeComparison`]; subtrees with no meaningful change (zero `user_bits`
//! and no changed descendants) are pruned while it is built.

use serde::{Deserialize, Serialize};
use strata_path::TreePath;

use crate::delta::DeltaTree;
use crate::node::{Node, NodeRef};

/// Decides whether two payloads differ.
///
/// `compare` must return exactly `0` to mean "no change"; any non-zero value
/// is caller-defined, becomes the comparison's `user_bits`, and marks the
/// node for inclusion in comparison trees. Either side may be absent: a node
/// can exist with no data, and added/removed nodes are compared against
/// nothing.
pub trait Comparator<T> {
    fn compare(&self, old: Option<&T>, new: Option<&T>) -> i32;
}

/// Default comparator: plain equality, reporting `1` for any change.
#[derive(Clone, Copy, Debug, Default)]
pub struct EqualityComparator;

impl<T: PartialEq> Comparator<T> for EqualityComparator {
    fn compare(&self, old: Option<&T>, new: Option<&T>) -> i32 {
        if old == new {
            0
        } else {
            1
        }
    }
}

/// Structural classification of a single node's change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Present on both sides with equal data.
    Unchanged,
    /// Present only on the new side.
    Added,
    /// Present only on the old side.
    Removed,
    /// Present on both sides with differing data.
    Changed,
}

/// Per-node result of diffing two trees.
///
/// `user_bits` is the comparator's verdict for this node; `0` means "no
/// meaningful change" for pruning purposes, independent of `kind`.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeComparison<T> {
    pub old_data: Option<T>,
    pub new_data: Option<T>,
    pub kind: ChangeKind,
    pub user_bits: i32,
}

impl<T> NodeComparison<T> {
    pub fn new(old_data: Option<T>, new_data: Option<T>, kind: ChangeKind, user_bits: i32) -> Self {
        Self {
            old_data,
            new_data,
            kind,
            user_bits,
        }
    }

    /// The no-change comparison, used for the root of empty comparison trees.
    pub fn unchanged() -> Self {
        Self::new(None, None, ChangeKind::Unchanged, 0)
    }
}

impl<T: Clone> NodeComparison<T> {
    /// Flip the comparison's orientation: old and new swap, additions become
    /// removals and vice versa, and `user_bits` is re-evaluated on the
    /// swapped payloads.
    pub fn reversed(&self, comparator: &dyn Comparator<T>) -> Self {
        let old_data = self.new_data.clone();
        let new_data = self.old_data.clone();
        let user_bits = comparator.compare(old_data.as_ref(), new_data.as_ref());
        let kind = match self.kind {
            ChangeKind::Added => ChangeKind::Removed,
            ChangeKind::Removed => ChangeKind::Added,
            other => other,
        };
        Self {
            old_data,
            new_data,
            kind,
            user_bits,
        }
    }
}

/// Whether a comparison node describes no meaningful change and can be
/// dropped from its parent.
fn is_vacuous<T>(node: &NodeRef<NodeComparison<T>>) -> bool {
    node.children().is_empty() && node.data().map_or(true, |c| c.user_bits == 0)
}

impl<T: Clone> Node<T> {
    /// Compare two complete nodes, producing a comparison node.
    ///
    /// Children present on one side only convert to added/removed subtrees;
    /// children present on both sides recurse. Unchanged subtrees are
    /// pruned; the top node itself is always returned so the caller can
    /// decide what an empty comparison means at its level.
    pub fn compare_with(
        &self,
        other: &Node<T>,
        comparator: &dyn Comparator<T>,
    ) -> NodeRef<NodeComparison<T>> {
        let old_children = self.children();
        let new_children = other.children();
        let mut children = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < old_children.len() && j < new_children.len() {
            let old_child = &old_children[i];
            let new_child = &new_children[j];
            match old_child.name_str().cmp(new_child.name_str()) {
                std::cmp::Ordering::Less => {
                    children.extend(removed_subtree(old_child, comparator));
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    children.extend(added_subtree(new_child, comparator));
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    let compared = old_child.compare_with(new_child, comparator);
                    if !is_vacuous(&compared) {
                        children.push(compared);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        for old_child in &old_children[i..] {
            children.extend(removed_subtree(old_child, comparator));
        }
        for new_child in &new_children[j..] {
            children.extend(added_subtree(new_child, comparator));
        }

        let user_bits = comparator.compare(self.data(), other.data());
        let kind = if user_bits != 0 {
            ChangeKind::Changed
        } else {
            ChangeKind::Unchanged
        };
        Node::complete_named(
            other.name().cloned(),
            Some(NodeComparison::new(
                self.data().cloned(),
                other.data().cloned(),
                kind,
                user_bits,
            )),
            children,
        )
    }

    /// Convert a complete subtree into an all-`Added` comparison subtree.
    ///
    /// The comparator verdict is computed once at the conversion root and
    /// propagated to every descendant; a zero verdict prunes the whole
    /// subtree.
    pub fn to_added_comparison(&self, user_bits: i32) -> Option<NodeRef<NodeComparison<T>>> {
        self.convert_comparison(user_bits, ChangeKind::Added)
    }

    /// Convert a complete subtree into an all-`Removed` comparison subtree.
    pub fn to_removed_comparison(&self, user_bits: i32) -> Option<NodeRef<NodeComparison<T>>> {
        self.convert_comparison(user_bits, ChangeKind::Removed)
    }

    fn convert_comparison(
        &self,
        user_bits: i32,
        kind: ChangeKind,
    ) -> Option<NodeRef<NodeComparison<T>>> {
        let children: Vec<_> = self
            .children()
            .iter()
            .filter_map(|child| child.convert_comparison(user_bits, kind))
            .collect();
        if user_bits == 0 && children.is_empty() {
            return None;
        }
        let comparison = match kind {
            ChangeKind::Added => {
                NodeComparison::new(None, self.data().cloned(), ChangeKind::Added, user_bits)
            }
            _ => NodeComparison::new(self.data().cloned(), None, ChangeKind::Removed, user_bits),
        };
        Some(Node::complete_named(
            self.name().cloned(),
            Some(comparison),
            children,
        ))
    }

    /// Compare an assembled forward-delta node against the base tree it
    /// overlays, producing a comparison node rooted at `key`.
    ///
    /// Returns `None` when the delta describes no meaningful change at or
    /// below `key`.
    pub(crate) fn compare_with_base(
        &self,
        key: &TreePath,
        base: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
    ) -> Option<NodeRef<NodeComparison<T>>> {
        match self {
            Node::Complete { .. } => match base.copy_complete_subtree(key) {
                Ok(old) => {
                    let compared = old.compare_with(self, comparator);
                    (!is_vacuous(&compared)).then_some(compared)
                }
                Err(_) => self.to_added_comparison(comparator.compare(None, self.data())),
            },
            Node::DataDelta { name, data, .. } => {
                let lookup = base.lookup(key);
                assert!(
                    lookup.found,
                    "malformed tree: data delta at {key} has no base node"
                );
                let user_bits = comparator.compare(lookup.data.as_ref(), data.as_ref());
                let kind = if user_bits != 0 {
                    ChangeKind::Changed
                } else {
                    ChangeKind::Unchanged
                };
                let children = self.compare_children_with_base(key, base, comparator);
                if user_bits == 0 && children.is_empty() {
                    return None;
                }
                Some(Node::complete_named(
                    name.clone(),
                    Some(NodeComparison::new(lookup.data, data.clone(), kind, user_bits)),
                    children,
                ))
            }
            Node::NoDataDelta { name, .. } => {
                let lookup = base.lookup(key);
                assert!(
                    lookup.found,
                    "malformed tree: delta at {key} has no base node"
                );
                let children = self.compare_children_with_base(key, base, comparator);
                if children.is_empty() {
                    return None;
                }
                Some(Node::complete_named(
                    name.clone(),
                    Some(NodeComparison::new(
                        lookup.data.clone(),
                        lookup.data,
                        ChangeKind::Unchanged,
                        0,
                    )),
                    children,
                ))
            }
            Node::Deleted { .. } => match base.copy_complete_subtree(key) {
                Ok(old) => old.to_removed_comparison(comparator.compare(old.data(), None)),
                // Deleting something the base never had is not a change.
                Err(_) => None,
            },
        }
    }

    fn compare_children_with_base(
        &self,
        key: &TreePath,
        base: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
    ) -> Vec<NodeRef<NodeComparison<T>>> {
        self.children()
            .iter()
            .filter_map(|child| {
                child.compare_with_base(&key.append(child.name_str()), base, comparator)
            })
            .collect()
    }
}

fn added_subtree<T: Clone>(
    node: &NodeRef<T>,
    comparator: &dyn Comparator<T>,
) -> Option<NodeRef<NodeComparison<T>>> {
    node.to_added_comparison(comparator.compare(None, node.data()))
}

fn removed_subtree<T: Clone>(
    node: &NodeRef<T>,
    comparator: &dyn Comparator<T>,
) -> Option<NodeRef<NodeComparison<T>>> {
    node.to_removed_comparison(comparator.compare(node.data(), None))
}

impl<T: Clone> Node<NodeComparison<T>> {
    /// Reverse a comparison node in the sense of [`NodeComparison::reversed`],
    /// pruning subtrees that become meaningless in the flipped orientation.
    pub(crate) fn reverse_comparison(
        &self,
        comparator: &dyn Comparator<T>,
    ) -> Option<NodeRef<NodeComparison<T>>> {
        let children: Vec<_> = self
            .children()
            .iter()
            .filter_map(|child| child.reverse_comparison(comparator))
            .collect();
        let reversed = self.data().map(|c| c.reversed(comparator));
        let user_bits = reversed.as_ref().map_or(0, |c| c.user_bits);
        if user_bits == 0 && children.is_empty() {
            return None;
        }
        Some(Node::complete_named(
            self.name().cloned(),
            reversed,
            children,
        ))
    }
}
