//! The four node variants that make up every tree.
//!
//! A tree is a graph of [`Node`]s shared through [`Arc`]: nodes are immutable
//! once built, and every mutation path-copies from the root down to the
//! change point, reusing untouched sibling subtrees by reference.
//!
//! # Invariants
//!
//! - A node's children are sorted strictly ascending by name, no duplicates.
//! - Only tree roots are unnamed; every child carries a name.
//! - A `Deleted` node has no data and no children.

use std::sync::Arc;

/// Shared handle to an immutable tree node.
pub type NodeRef<T> = Arc<Node<T>>;

/// A single node in a complete or delta tree.
///
/// `Complete` nodes are authoritative for their whole subtree. The two delta
/// variants describe differences against the corresponding node in a parent
/// tree: `DataDelta` changes the data (and lists only differing children),
/// `NoDataDelta` keeps the data (and lists only differing children).
/// `Deleted` records that a node present in the parent is absent here.
#[derive(Clone, Debug, PartialEq)]
pub enum Node<T> {
    /// Fully self-describing node; its children are themselves authoritative.
    Complete {
        name: Option<Arc<str>>,
        data: Option<T>,
        children: Vec<NodeRef<T>>,
    },
    /// Data differs from the parent tree at this path; children hold only
    /// the subtrees that differ.
    DataDelta {
        name: Option<Arc<str>>,
        data: Option<T>,
        children: Vec<NodeRef<T>>,
    },
    /// Data unchanged from the parent tree; children hold only the subtrees
    /// that differ.
    NoDataDelta {
        name: Option<Arc<str>>,
        children: Vec<NodeRef<T>>,
    },
    /// The node exists in the parent tree but not here.
    Deleted { name: Option<Arc<str>> },
}

impl<T: Clone> Node<T> {
    /// Build a complete node. Children are sorted by name.
    pub fn complete(name: Option<&str>, data: Option<T>, children: Vec<NodeRef<T>>) -> NodeRef<T> {
        Arc::new(Node::Complete {
            name: name.map(Arc::from),
            data,
            children: sorted(children),
        })
    }

    /// Build a data-delta node. Children are sorted by name.
    pub fn data_delta(
        name: Option<&str>,
        data: Option<T>,
        children: Vec<NodeRef<T>>,
    ) -> NodeRef<T> {
        Arc::new(Node::DataDelta {
            name: name.map(Arc::from),
            data,
            children: sorted(children),
        })
    }

    /// Build a no-data-delta node. Children are sorted by name.
    pub fn no_data_delta(name: Option<&str>, children: Vec<NodeRef<T>>) -> NodeRef<T> {
        Arc::new(Node::NoDataDelta {
            name: name.map(Arc::from),
            children: sorted(children),
        })
    }

    /// Build a deletion marker.
    pub fn deleted(name: Option<&str>) -> NodeRef<T> {
        Arc::new(Node::Deleted {
            name: name.map(Arc::from),
        })
    }

    pub(crate) fn complete_named(
        name: Option<Arc<str>>,
        data: Option<T>,
        children: Vec<NodeRef<T>>,
    ) -> NodeRef<T> {
        Arc::new(Node::Complete {
            name,
            data,
            children,
        })
    }

    pub(crate) fn data_delta_named(
        name: Option<Arc<str>>,
        data: Option<T>,
        children: Vec<NodeRef<T>>,
    ) -> NodeRef<T> {
        Arc::new(Node::DataDelta {
            name,
            data,
            children,
        })
    }

    pub(crate) fn no_data_delta_named(
        name: Option<Arc<str>>,
        children: Vec<NodeRef<T>>,
    ) -> NodeRef<T> {
        Arc::new(Node::NoDataDelta { name, children })
    }

    pub(crate) fn deleted_named(name: Option<Arc<str>>) -> NodeRef<T> {
        Arc::new(Node::Deleted { name })
    }

    /// Rebuild this node with the same kind, name and data but new children.
    ///
    /// Panics on a `Deleted` node: deletion markers never carry children,
    /// and reaching one here means the surrounding chain is malformed.
    pub(crate) fn with_children(&self, children: Vec<NodeRef<T>>) -> NodeRef<T> {
        match self {
            Node::Complete { name, data, .. } => Arc::new(Node::Complete {
                name: name.clone(),
                data: data.clone(),
                children,
            }),
            Node::DataDelta { name, data, .. } => Arc::new(Node::DataDelta {
                name: name.clone(),
                data: data.clone(),
                children,
            }),
            Node::NoDataDelta { name, .. } => Arc::new(Node::NoDataDelta {
                name: name.clone(),
                children,
            }),
            Node::Deleted { .. } => {
                panic!("malformed tree: cannot graft children onto a deleted node")
            }
        }
    }

    /// Recursively copy this node hierarchy into fresh handles, detaching it
    /// from any structure the caller may still hold.
    pub fn deep_copy(&self) -> NodeRef<T> {
        let children = self
            .children()
            .iter()
            .map(|child| child.deep_copy())
            .collect();
        match self {
            Node::Complete { name, data, .. } => Arc::new(Node::Complete {
                name: name.clone(),
                data: data.clone(),
                children,
            }),
            Node::DataDelta { name, data, .. } => Arc::new(Node::DataDelta {
                name: name.clone(),
                data: data.clone(),
                children,
            }),
            Node::NoDataDelta { name, .. } => Arc::new(Node::NoDataDelta {
                name: name.clone(),
                children,
            }),
            Node::Deleted { name } => Arc::new(Node::Deleted { name: name.clone() }),
        }
    }

    /// Like [`Node::deep_copy`], but the copy's root is renamed.
    pub(crate) fn deep_copy_named(&self, name: Option<Arc<str>>) -> NodeRef<T> {
        let copy = self.deep_copy();
        match &*copy {
            Node::Complete { data, children, .. } => Arc::new(Node::Complete {
                name,
                data: data.clone(),
                children: children.clone(),
            }),
            Node::DataDelta { data, children, .. } => Arc::new(Node::DataDelta {
                name,
                data: data.clone(),
                children: children.clone(),
            }),
            Node::NoDataDelta { children, .. } => Arc::new(Node::NoDataDelta {
                name,
                children: children.clone(),
            }),
            Node::Deleted { .. } => Arc::new(Node::Deleted { name }),
        }
    }
}

impl<T> Node<T> {
    /// The node's name; only tree roots are unnamed.
    pub fn name(&self) -> Option<&Arc<str>> {
        match self {
            Node::Complete { name, .. }
            | Node::DataDelta { name, .. }
            | Node::NoDataDelta { name, .. }
            | Node::Deleted { name } => name.as_ref(),
        }
    }

    /// The node's name as a plain string; the unnamed root reads as `""`.
    pub fn name_str(&self) -> &str {
        self.name().map(|n| n.as_ref()).unwrap_or("")
    }

    /// The node's data, when the variant carries any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Node::Complete { data, .. } | Node::DataDelta { data, .. } => data.as_ref(),
            Node::NoDataDelta { .. } | Node::Deleted { .. } => None,
        }
    }

    /// Whether this variant carries a data slot.
    ///
    /// True for `Complete` and `DataDelta` even when the slot is empty:
    /// during chain resolution such a node is authoritative for "this path
    /// has no data", while a `NoDataDelta` defers to its parent tree.
    pub fn has_data(&self) -> bool {
        matches!(self, Node::Complete { .. } | Node::DataDelta { .. })
    }

    /// Whether this is one of the two delta variants.
    pub fn is_delta(&self) -> bool {
        matches!(self, Node::DataDelta { .. } | Node::NoDataDelta { .. })
    }

    /// Whether this is a deletion marker.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Node::Deleted { .. })
    }

    /// Whether this node is an empty delta: a `NoDataDelta` describing no
    /// changes at all.
    pub fn is_empty_delta(&self) -> bool {
        matches!(self, Node::NoDataDelta { children, .. } if children.is_empty())
    }

    /// The node's children, sorted by name. Deletion markers have none.
    pub fn children(&self) -> &[NodeRef<T>] {
        match self {
            Node::Complete { children, .. }
            | Node::DataDelta { children, .. }
            | Node::NoDataDelta { children, .. } => children,
            Node::Deleted { .. } => &[],
        }
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Binary search for the child with the given name.
    pub fn child(&self, name: &str) -> Option<&NodeRef<T>> {
        let children = self.children();
        children
            .binary_search_by(|c| c.name_str().cmp(name))
            .ok()
            .map(|index| &children[index])
    }

    /// Binary search returning the child's index, or the insertion index
    /// where a child of that name would go.
    pub fn child_index(&self, name: &str) -> Result<usize, usize> {
        self.children().binary_search_by(|c| c.name_str().cmp(name))
    }

    /// Case-insensitive child lookup (ASCII case folding).
    ///
    /// Linear scan; a live (non-deleted) match is preferred, and a deleted
    /// match is only reported when no live match exists.
    pub fn child_ignore_case(&self, name: &str) -> Option<&NodeRef<T>> {
        let mut deleted_match = None;
        for child in self.children() {
            if child.name_str().eq_ignore_ascii_case(name) {
                if child.is_deleted() {
                    deleted_match.get_or_insert(child);
                } else {
                    return Some(child);
                }
            }
        }
        deleted_match
    }
}

fn sorted<T>(mut children: Vec<NodeRef<T>>) -> Vec<NodeRef<T>> {
    children.sort_by(|a, b| a.name_str().cmp(b.name_str()));
    children
}
