//! Complete trees: always fully materialized, no parent chain.
//!
//! A [`CompleteTree`] is the degenerate, self-sufficient form of a tree:
//! every node is authoritative and reads never consult anything beyond the
//! root node graph. Mutations reuse the same copy-on-write machinery as
//! delta trees; because the base is complete, every spliced delta
//! immediately reconciles back into complete nodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use strata_path::TreePath;

use crate::delta::DeltaTree;
use crate::error::{TreeError, TreeResult};
use crate::lookup::Lookup;
use crate::node::{Node, NodeRef};

/// A standalone tree with a single complete root node and no parent.
pub struct CompleteTree<T> {
    root: RwLock<NodeRef<T>>,
    immutable: AtomicBool,
}

impl<T: Clone> CompleteTree<T> {
    /// Create an empty, mutable tree.
    pub fn new() -> Self {
        Self::from_root(Node::complete(None, None, vec![]))
    }

    /// Create a tree around an existing complete node graph.
    pub fn from_root(root: NodeRef<T>) -> Self {
        Self {
            root: RwLock::new(root),
            immutable: AtomicBool::new(false),
        }
    }

    /// The tree's root node.
    pub fn root_node(&self) -> NodeRef<T> {
        self.root.read().expect("lock poisoned").clone()
    }

    /// Whether the tree has been sealed against further mutation.
    pub fn is_immutable(&self) -> bool {
        self.immutable.load(Ordering::Acquire)
    }

    /// Seal the tree; not reversible.
    pub fn seal(&self) {
        self.immutable.store(true, Ordering::Release);
    }

    fn require_mutable(&self) -> TreeResult<()> {
        if self.is_immutable() {
            return Err(TreeError::ImmutableTree);
        }
        Ok(())
    }

    /// Re-express this tree as a parentless delta-capable tree sharing the
    /// same node graph, ready to anchor a chain of overlays.
    pub fn to_delta(&self) -> DeltaTree<T> {
        DeltaTree::with_root(self.root_node())
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    fn node_at(&self, key: &TreePath) -> Option<NodeRef<T>> {
        let mut current = self.root_node();
        for segment in key.segments() {
            current = current.child(segment)?.clone();
        }
        Some(current)
    }

    /// The data at `key`; a node may exist with no data.
    pub fn get_data(&self, key: &TreePath) -> TreeResult<Option<T>> {
        let node = self
            .node_at(key)
            .ok_or_else(|| TreeError::NotFound(key.clone()))?;
        Ok(node.data().cloned())
    }

    /// Whether `key` is present.
    pub fn includes(&self, key: &TreePath) -> bool {
        self.node_at(key).is_some()
    }

    /// Resolve `key` without raising on absence. Matches in a complete
    /// tree are always from the (only) top layer.
    pub fn lookup(&self, key: &TreePath) -> Lookup<T> {
        match self.node_at(key) {
            Some(node) => Lookup::found(key.clone(), node.data().cloned(), true),
            None => Lookup::absent(key.clone()),
        }
    }

    /// The paths of `key`'s children.
    pub fn children_of(&self, key: &TreePath) -> TreeResult<Vec<TreePath>> {
        let node = self
            .node_at(key)
            .ok_or_else(|| TreeError::NotFound(key.clone()))?;
        Ok(node
            .children()
            .iter()
            .map(|child| key.append(child.name_str()))
            .collect())
    }

    /// The names of `key`'s children, sorted.
    pub fn child_names(&self, key: &TreePath) -> TreeResult<Vec<Arc<str>>> {
        let node = self
            .node_at(key)
            .ok_or_else(|| TreeError::NotFound(key.clone()))?;
        Ok(node
            .children()
            .iter()
            .map(|child| child.name().cloned().unwrap_or_else(|| Arc::from("")))
            .collect())
    }

    /// Number of children of `key`.
    pub fn child_count(&self, key: &TreePath) -> TreeResult<usize> {
        let node = self
            .node_at(key)
            .ok_or_else(|| TreeError::NotFound(key.clone()))?;
        Ok(node.child_count())
    }

    /// The complete subtree at `key`. Every node is already materialized,
    /// so this is a cheap shared handle.
    pub fn copy_complete_subtree(&self, key: &TreePath) -> TreeResult<NodeRef<T>> {
        self.node_at(key)
            .ok_or_else(|| TreeError::NotFound(key.clone()))
    }

    // -----------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------

    /// Create a child named `name` under `parent_key`.
    pub fn create_child(
        &self,
        parent_key: &TreePath,
        name: &str,
        data: Option<T>,
    ) -> TreeResult<()> {
        self.require_mutable()?;
        if !self.includes(parent_key) {
            return Err(TreeError::NotFound(parent_key.clone()));
        }
        self.add_child(parent_key, Node::complete(Some(name), data, vec![]));
        Ok(())
    }

    /// Delete the child named `name` under `parent_key`.
    pub fn delete_child(&self, parent_key: &TreePath, name: &str) -> TreeResult<()> {
        self.require_mutable()?;
        let child_key = parent_key.append(name);
        if !self.includes(&child_key) {
            return Err(TreeError::NotFound(child_key));
        }
        // Assembling a deletion into a complete base discards the marker,
        // leaving the child simply absent.
        self.add_child(parent_key, Node::deleted(Some(name)));
        Ok(())
    }

    /// Replace the data at `key`.
    pub fn set_data(&self, key: &TreePath, data: Option<T>) -> TreeResult<()> {
        self.require_mutable()?;
        if !self.includes(key) {
            return Err(TreeError::NotFound(key.clone()));
        }
        self.splice(key, &Node::data_delta(key.last_segment(), data, vec![]));
        Ok(())
    }

    /// Splice a complete node hierarchy in at `key`, replacing anything
    /// there. The input is deep-copied first. The update is a single,
    /// idempotent write.
    pub fn create_subtree(&self, key: &TreePath, node: &Node<T>) -> TreeResult<()> {
        self.require_mutable()?;
        if key.is_root() {
            let mut root = self.root.write().expect("lock poisoned");
            *root = node.deep_copy();
            return Ok(());
        }
        let parent_key = key.remove_last_segments(1);
        if !self.includes(&parent_key) {
            return Err(TreeError::NotFound(parent_key));
        }
        let renamed = node.deep_copy_named(key.last_segment().map(Arc::from));
        self.add_child(&parent_key, renamed);
        Ok(())
    }

    fn add_child(&self, parent_key: &TreePath, child: NodeRef<T>) {
        let wrapper = Node::no_data_delta(parent_key.last_segment(), vec![child]);
        self.splice(parent_key, &wrapper);
    }

    fn splice(&self, key: &TreePath, delta: &NodeRef<T>) {
        let mut root = self.root.write().expect("lock poisoned");
        *root = root.assemble_at(delta, key, 0);
    }
}

impl<T: Clone> Default for CompleteTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
