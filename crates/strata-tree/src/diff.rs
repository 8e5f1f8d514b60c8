//! Node-level delta computation: structural diff of two complete subtrees,
//! inversion of a forward delta, and delta simplification.

use strata_path::TreePath;

use crate::compare::Comparator;
use crate::delta::DeltaTree;
use crate::node::{Node, NodeRef};

impl<T: Clone> Node<T> {
    /// Structural diff of two complete nodes: the returned delta, assembled
    /// onto `self`, reproduces `other`.
    ///
    /// Names only in `self` become deletion markers; names only in `other`
    /// pass through complete; names in both recurse, with no-op subtrees
    /// dropped so the delta stays minimal.
    pub fn forward_delta_with(
        &self,
        other: &Node<T>,
        comparator: &dyn Comparator<T>,
    ) -> NodeRef<T> {
        let old_children = self.children();
        let new_children = other.children();
        let mut children = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < old_children.len() && j < new_children.len() {
            let old_child = &old_children[i];
            let new_child = &new_children[j];
            match old_child.name_str().cmp(new_child.name_str()) {
                std::cmp::Ordering::Less => {
                    children.push(Node::deleted_named(old_child.name().cloned()));
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    children.push(new_child.clone());
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    let delta = old_child.forward_delta_with(new_child, comparator);
                    if !delta.is_empty_delta() {
                        children.push(delta);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        for old_child in &old_children[i..] {
            children.push(Node::deleted_named(old_child.name().cloned()));
        }
        children.extend(new_children[j..].iter().cloned());

        if comparator.compare(self.data(), other.data()) != 0 {
            Node::data_delta_named(other.name().cloned(), other.data().cloned(), children)
        } else {
            Node::no_data_delta_named(other.name().cloned(), children)
        }
    }

    /// Invert a forward delta: the returned node, assembled onto the tree
    /// that carries `self` as its delta, reproduces the parent tree's state
    /// at `key`.
    ///
    /// Returns `None` for vacuous entries (a deletion of something the
    /// parent chain never contained), which the caller simply omits.
    pub(crate) fn backward_delta(
        &self,
        parent_tree: &DeltaTree<T>,
        key: &TreePath,
    ) -> Option<NodeRef<T>> {
        match self {
            // A complete node replaced (or added) this subtree; going
            // backward restores the parent's version, or deletes the
            // addition when the parent chain has nothing here.
            Node::Complete { name, .. } => match parent_tree.copy_complete_subtree(key) {
                Ok(subtree) => Some(subtree),
                Err(_) => Some(Node::deleted_named(name.clone())),
            },
            Node::DataDelta { name, .. } => {
                let lookup = parent_tree.lookup(key);
                assert!(
                    lookup.found,
                    "malformed tree: data delta at {key} has no base node"
                );
                Some(Node::data_delta_named(
                    name.clone(),
                    lookup.data,
                    self.backward_children(parent_tree, key),
                ))
            }
            Node::NoDataDelta { name, .. } => Some(Node::no_data_delta_named(
                name.clone(),
                self.backward_children(parent_tree, key),
            )),
            Node::Deleted { .. } => match parent_tree.copy_complete_subtree(key) {
                Ok(subtree) => Some(subtree),
                Err(_) => None,
            },
        }
    }

    fn backward_children(&self, parent_tree: &DeltaTree<T>, key: &TreePath) -> Vec<NodeRef<T>> {
        self.children()
            .iter()
            .filter_map(|child| child.backward_delta(parent_tree, &key.append(child.name_str())))
            .collect()
    }

    /// Minimize a delta against the parent tree it overlays: demote
    /// `DataDelta` nodes whose data the comparator considers unchanged to
    /// `NoDataDelta`, and prune empty `NoDataDelta` leaves bottom-up.
    /// Complete nodes and deletion markers pass through untouched.
    pub(crate) fn simplify_with_parent(
        &self,
        key: &TreePath,
        parent_tree: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
    ) -> NodeRef<T> {
        match self {
            Node::Complete { .. } => self.with_children(self.children().to_vec()),
            Node::Deleted { name } => Node::deleted_named(name.clone()),
            Node::DataDelta { name, data, .. } => {
                let children = self.simplified_children(key, parent_tree, comparator);
                let lookup = parent_tree.lookup(key);
                if lookup.found && comparator.compare(lookup.data.as_ref(), data.as_ref()) == 0 {
                    Node::no_data_delta_named(name.clone(), children)
                } else {
                    Node::data_delta_named(name.clone(), data.clone(), children)
                }
            }
            Node::NoDataDelta { name, .. } => Node::no_data_delta_named(
                name.clone(),
                self.simplified_children(key, parent_tree, comparator),
            ),
        }
    }

    fn simplified_children(
        &self,
        key: &TreePath,
        parent_tree: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
    ) -> Vec<NodeRef<T>> {
        self.children()
            .iter()
            .map(|child| {
                child.simplify_with_parent(&key.append(child.name_str()), parent_tree, comparator)
            })
            .filter(|child| !child.is_empty_delta())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::EqualityComparator;

    fn leaf(name: &str, data: i32) -> NodeRef<i32> {
        Node::complete(Some(name), Some(data), vec![])
    }

    #[test]
    fn identical_nodes_produce_empty_delta() {
        let a = Node::complete(None, Some(1), vec![leaf("x", 2)]);
        let b = Node::complete(None, Some(1), vec![leaf("x", 2)]);
        let delta = a.forward_delta_with(&b, &EqualityComparator);
        assert!(delta.is_empty_delta());
    }

    #[test]
    fn removed_child_becomes_deletion_marker() {
        let a = Node::complete(None, None, vec![leaf("gone", 1), leaf("kept", 2)]);
        let b = Node::complete(None, None, vec![leaf("kept", 2)]);
        let delta = a.forward_delta_with(&b, &EqualityComparator);
        assert_eq!(delta.children().len(), 1);
        assert!(delta.children()[0].is_deleted());
        assert_eq!(delta.children()[0].name_str(), "gone");
    }

    #[test]
    fn added_child_passes_through_complete() {
        let a: NodeRef<i32> = Node::complete(None, None, vec![]);
        let b = Node::complete(None, None, vec![leaf("new", 9)]);
        let delta = a.forward_delta_with(&b, &EqualityComparator);
        assert_eq!(delta.children().len(), 1);
        assert!(matches!(&*delta.children()[0], Node::Complete { .. }));
    }

    #[test]
    fn changed_data_becomes_data_delta() {
        let a = Node::complete(None, None, vec![leaf("x", 1)]);
        let b = Node::complete(None, None, vec![leaf("x", 2)]);
        let delta = a.forward_delta_with(&b, &EqualityComparator);
        let x = &delta.children()[0];
        assert!(matches!(&**x, Node::DataDelta { .. }));
        assert_eq!(x.data(), Some(&2));
    }

    #[test]
    fn forward_delta_assembles_back() {
        let a = Node::complete(
            None,
            Some(0),
            vec![
                Node::complete(Some("dir"), None, vec![leaf("f1", 1), leaf("f2", 2)]),
                leaf("top", 3),
            ],
        );
        let b = Node::complete(
            None,
            Some(0),
            vec![
                Node::complete(Some("dir"), None, vec![leaf("f1", 10), leaf("f3", 30)]),
                leaf("other", 4),
            ],
        );
        let delta = a.forward_delta_with(&b, &EqualityComparator);
        let assembled = a.assemble_with(&delta);
        assert_eq!(&*assembled, &*b);
    }
}
