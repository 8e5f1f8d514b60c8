//! Delta-capable trees: overlays chained over a frozen base.
//!
//! A [`DeltaTree`] holds a root node and an optional parent tree. Reads walk
//! the chain from the newest layer down until a layer resolves the path
//! authoritatively; mutations copy-on-write only the spine from the root to
//! the change point. Chains may branch: once a tree is sealed it can serve
//! as the shared parent of any number of independently mutating overlays,
//! and mutating one overlay never affects its siblings or the parent.
//!
//! `DeltaTree` is a cheap shared handle (cloning shares the tree, it does
//! not copy contents). The representation behind it (root node + parent
//! link) sits behind a single `RwLock` so the representation-changing
//! operations ([`DeltaTree::reroot`], [`DeltaTree::collapse_to`],
//! [`DeltaTree::make_complete`]) can swap it atomically while readers work
//! on a snapshot.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use strata_path::TreePath;
use tracing::debug;

use crate::assemble::assemble_children;
use crate::compare::{Comparator, NodeComparison};
use crate::error::{TreeError, TreeResult};
use crate::lookup::Lookup;
use crate::node::{Node, NodeRef};

/// A tree expressed either completely or as a delta against a parent tree.
///
/// Cloning the handle shares the underlying tree.
pub struct DeltaTree<T> {
    inner: Arc<TreeInner<T>>,
}

struct TreeInner<T> {
    repr: RwLock<Repr<T>>,
    immutable: AtomicBool,
}

struct Repr<T> {
    root: NodeRef<T>,
    parent: Option<DeltaTree<T>>,
}

impl<T> Clone for DeltaTree<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for DeltaTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaTree")
            .field("immutable", &self.inner.immutable.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Result of walking one layer's node graph down a path.
struct LayerProbe<T> {
    /// The node reached, if the walk did not dead-end.
    node: Option<NodeRef<T>>,
    /// Whether any traversed node was authoritative (not a delta): if so,
    /// no older layer may be consulted for this path.
    complete: bool,
}

fn probe_layer<T>(root: &NodeRef<T>, key: &TreePath, ignore_case: bool) -> LayerProbe<T> {
    let mut complete = !root.is_delta();
    let mut current = Some(root.clone());
    for segment in key.segments() {
        let Some(node) = current else { break };
        let child = if ignore_case {
            node.child_ignore_case(segment)
        } else {
            node.child(segment)
        };
        match child {
            Some(found) => {
                if !found.is_delta() {
                    complete = true;
                }
                current = Some(found.clone());
            }
            None => {
                current = None;
                break;
            }
        }
    }
    LayerProbe {
        node: current,
        complete,
    }
}

impl<T: Clone> DeltaTree<T> {
    /// Create a complete, empty, mutable tree.
    pub fn new() -> Self {
        Self::with_root(Node::complete(None, None, vec![]))
    }

    /// Create a parentless tree around the given root node.
    pub fn with_root(root: NodeRef<T>) -> Self {
        Self::with_root_and_parent(root, None)
    }

    fn with_root_and_parent(root: NodeRef<T>, parent: Option<DeltaTree<T>>) -> Self {
        Self {
            inner: Arc::new(TreeInner {
                repr: RwLock::new(Repr { root, parent }),
                immutable: AtomicBool::new(false),
            }),
        }
    }

    // -----------------------------------------------------------------
    // Representation access
    // -----------------------------------------------------------------

    /// Whether two handles refer to the same tree.
    pub fn ptr_eq(&self, other: &DeltaTree<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The tree's own root node.
    pub fn root_node(&self) -> NodeRef<T> {
        self.inner.repr.read().expect("lock poisoned").root.clone()
    }

    /// The parent tree this one is a delta over, if any.
    pub fn parent(&self) -> Option<DeltaTree<T>> {
        self.inner
            .repr
            .read()
            .expect("lock poisoned")
            .parent
            .clone()
    }

    fn snapshot(&self) -> (NodeRef<T>, Option<DeltaTree<T>>) {
        let repr = self.inner.repr.read().expect("lock poisoned");
        (repr.root.clone(), repr.parent.clone())
    }

    fn publish(&self, root: NodeRef<T>, parent: Option<DeltaTree<T>>) {
        let mut repr = self.inner.repr.write().expect("lock poisoned");
        repr.root = root;
        repr.parent = parent;
    }

    pub(crate) fn publish_root(&self, root: NodeRef<T>) {
        self.inner.repr.write().expect("lock poisoned").root = root;
    }

    /// Whether this tree has been sealed against further mutation.
    pub fn is_immutable(&self) -> bool {
        self.inner.immutable.load(Ordering::Acquire)
    }

    /// Seal the tree. Required before it may parent a new delta; not
    /// reversible.
    pub fn seal(&self) {
        self.inner.immutable.store(true, Ordering::Release);
    }

    fn require_mutable(&self) -> TreeResult<()> {
        if self.is_immutable() {
            return Err(TreeError::ImmutableTree);
        }
        Ok(())
    }

    /// Whether this tree's own layer records no changes at all.
    pub fn is_empty_delta(&self) -> bool {
        self.root_node().child_count() == 0
    }

    /// Whether `ancestor` appears in this tree's parent chain.
    pub fn has_ancestor(&self, ancestor: &DeltaTree<T>) -> bool {
        let mut current = self.parent();
        while let Some(tree) = current {
            if tree.ptr_eq(ancestor) {
                return true;
            }
            current = tree.parent();
        }
        false
    }

    // -----------------------------------------------------------------
    // Chain-walk reads
    // -----------------------------------------------------------------

    /// The data at `key`, resolved through the chain.
    ///
    /// A node may exist with no data, so presence and data are reported
    /// separately: absence is `Err(NotFound)`, a present data-less node is
    /// `Ok(None)`.
    pub fn get_data(&self, key: &TreePath) -> TreeResult<Option<T>> {
        let mut layer = Some(self.snapshot());
        while let Some((root, parent)) = layer {
            let probe = probe_layer(&root, key, false);
            if let Some(node) = &probe.node {
                if node.has_data() {
                    return Ok(node.data().cloned());
                }
                // An explicit deletion is authoritative: stop entirely.
                if node.is_deleted() {
                    break;
                }
            }
            if probe.complete {
                break;
            }
            layer = parent.map(|p| p.snapshot());
        }
        Err(TreeError::NotFound(key.clone()))
    }

    /// Whether `key` resolves to a present node.
    pub fn includes(&self, key: &TreePath) -> bool {
        self.search_node(key).is_some()
    }

    /// Resolve `key` without raising on absence.
    pub fn lookup(&self, key: &TreePath) -> Lookup<T> {
        self.lookup_impl(key, false)
    }

    /// Case-insensitive variant of [`DeltaTree::lookup`] (ASCII folding).
    pub fn lookup_ignore_case(&self, key: &TreePath) -> Lookup<T> {
        self.lookup_impl(key, true)
    }

    fn lookup_impl(&self, key: &TreePath, ignore_case: bool) -> Lookup<T> {
        let mut in_top_layer = true;
        let mut layer = Some(self.snapshot());
        while let Some((root, parent)) = layer {
            let probe = probe_layer(&root, key, ignore_case);
            if let Some(node) = &probe.node {
                if node.has_data() {
                    return Lookup::found(key.clone(), node.data().cloned(), in_top_layer);
                }
                if node.is_deleted() {
                    break;
                }
            }
            if probe.complete {
                break;
            }
            in_top_layer = false;
            layer = parent.map(|p| p.snapshot());
        }
        Lookup::absent(key.clone())
    }

    /// The node at `key`, searching the chain; `None` when missing or
    /// explicitly deleted. The returned node may be any variant.
    pub fn search_node(&self, key: &TreePath) -> Option<NodeRef<T>> {
        let mut layer = Some(self.snapshot());
        while let Some((root, parent)) = layer {
            let probe = probe_layer(&root, key, false);
            if let Some(node) = probe.node {
                if node.is_deleted() {
                    break;
                }
                return Some(node);
            }
            if probe.complete {
                break;
            }
            layer = parent.map(|p| p.snapshot());
        }
        None
    }

    /// The node at `key` in this tree's own layer only, without consulting
    /// parents. Deletion markers are returned as-is.
    pub fn find_node(&self, key: &TreePath) -> Option<NodeRef<T>> {
        let mut current = self.root_node();
        for segment in key.segments() {
            current = current.child(segment)?.clone();
        }
        Some(current)
    }

    /// The merged child nodes of `key` across all layers of the chain.
    ///
    /// Panics if deltas describe children for a path that has no complete
    /// node anywhere in the chain; that is a malformed chain.
    pub fn child_nodes(&self, key: &TreePath) -> TreeResult<Vec<NodeRef<T>>> {
        let mut accumulated: Option<Vec<NodeRef<T>>> = None;
        let mut layer = Some(self.snapshot());
        while let Some((root, parent)) = layer {
            let probe = probe_layer(&root, key, false);
            if let Some(node) = &probe.node {
                // A removed node has no children.
                if node.is_deleted() {
                    break;
                }
                accumulated = Some(match accumulated {
                    None => node.children().to_vec(),
                    // Older layer below, newer accumulation on top; deletions
                    // must stay visible until a complete node anchors them.
                    Some(newer) => assemble_children(node.children(), &newer, !probe.complete),
                });
            }
            if probe.complete {
                if let Some(children) = accumulated {
                    return Ok(children);
                }
                break;
            }
            layer = parent.map(|p| p.snapshot());
        }
        if accumulated.is_some() {
            panic!("malformed tree: delta children at {key} with no complete ancestor");
        }
        Err(TreeError::NotFound(key.clone()))
    }

    /// The paths of `key`'s children.
    pub fn children_of(&self, key: &TreePath) -> TreeResult<Vec<TreePath>> {
        Ok(self
            .child_nodes(key)?
            .iter()
            .map(|child| key.append(child.name_str()))
            .collect())
    }

    /// The names of `key`'s children, sorted.
    pub fn child_names(&self, key: &TreePath) -> TreeResult<Vec<Arc<str>>> {
        Ok(self
            .child_nodes(key)?
            .iter()
            .map(|child| child.name().cloned().unwrap_or_else(|| Arc::from("")))
            .collect())
    }

    /// Number of children of `key`.
    pub fn child_count(&self, key: &TreePath) -> TreeResult<usize> {
        Ok(self.child_nodes(key)?.len())
    }

    // -----------------------------------------------------------------
    // Materialization
    // -----------------------------------------------------------------

    /// A complete node holding the fully resolved contents of the subtree
    /// at `key`.
    pub fn copy_complete_subtree(&self, key: &TreePath) -> TreeResult<NodeRef<T>> {
        let node = self
            .search_node(key)
            .ok_or_else(|| TreeError::NotFound(key.clone()))?;
        if node.is_delta() {
            self.naive_copy_complete_subtree(key)
        } else {
            Ok(node)
        }
    }

    fn naive_copy_complete_subtree(&self, key: &TreePath) -> TreeResult<NodeRef<T>> {
        let names = self.child_names(key)?;
        let mut children = Vec::with_capacity(names.len());
        for name in &names {
            children.push(self.copy_complete_subtree(&key.append(name))?);
        }
        Ok(Node::complete_named(
            key.last_segment().map(Arc::from),
            self.get_data(key)?,
            children,
        ))
    }

    /// Like [`DeltaTree::copy_complete_subtree`], but tolerant of concurrent
    /// deletions on a live mutable tree: a child that vanishes mid-walk is
    /// omitted instead of failing the whole read, and a vanished root yields
    /// `None`.
    pub fn safe_copy_complete_subtree(&self, key: &TreePath) -> Option<NodeRef<T>> {
        let node = self.search_node(key)?;
        if node.is_delta() {
            self.safe_naive_copy_complete_subtree(key)
        } else {
            Some(node)
        }
    }

    fn safe_naive_copy_complete_subtree(&self, key: &TreePath) -> Option<NodeRef<T>> {
        let names = self.child_names(key).ok()?;
        let mut children = Vec::with_capacity(names.len());
        for name in &names {
            if let Some(child) = self.safe_copy_complete_subtree(&key.append(name)) {
                children.push(child);
            }
        }
        let data = self.get_data(key).ok()?;
        Some(Node::complete_named(
            key.last_segment().map(Arc::from),
            data,
            children,
        ))
    }

    /// Flatten this tree and its whole chain into one standalone complete
    /// tree, discarding the parent links. The chain itself is unaffected.
    pub fn make_complete(&self) {
        let (mut assembled, mut parent) = self.snapshot();
        while let Some(tree) = parent {
            let (root, next) = tree.snapshot();
            assembled = root.assemble_with(&assembled);
            parent = next;
        }
        self.publish(assembled, None);
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
        self.add_child(parent_key, Node::deleted(Some(name)));
        Ok(())
    }

    /// Replace the data at `key`.
    pub fn set_data(&self, key: &TreePath, data: Option<T>) -> TreeResult<()> {
        self.require_mutable()?;
        if !self.includes(key) {
            return Err(TreeError::NotFound(key.clone()));
        }
        self.assemble_node(key, &Node::data_delta(key.last_segment(), data, vec![]));
        Ok(())
    }

    /// Splice a whole node hierarchy in at `key`, replacing anything there.
    ///
    /// The input is deep-copied first so structure the caller still holds
    /// never aliases into this tree. At the root this replaces the entire
    /// representation and the tree becomes parentless.
    pub fn create_subtree(&self, key: &TreePath, node: &Node<T>) -> TreeResult<()> {
        self.require_mutable()?;
        if key.is_root() {
            self.publish(node.deep_copy(), None);
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
        self.assemble_node(parent_key, &wrapper);
    }

    /// Replace the node at `key` with the result of assembling it with
    /// `delta`, copy-on-write along the spine.
    fn assemble_node(&self, key: &TreePath, delta: &NodeRef<T>) {
        let mut repr = self.inner.repr.write().expect("lock poisoned");
        repr.root = repr.root.assemble_at(delta, key, 0);
    }

    // -----------------------------------------------------------------
    // Delta algebra
    // -----------------------------------------------------------------

    /// A new mutable, empty overlay whose parent is this tree.
    ///
    /// The receiver must already be sealed: a delta over a still-mutable
    /// base would be invalidated by the base's next change.
    pub fn new_empty_delta(&self) -> TreeResult<DeltaTree<T>> {
        if !self.is_immutable() {
            return Err(TreeError::ImmutableRequired);
        }
        Ok(Self::with_root_and_parent(
            Node::no_data_delta(None, vec![]),
            Some(self.clone()),
        ))
    }

    /// The delta that, assembled onto this tree, yields `source`.
    ///
    /// The result is sealed and has this tree as its parent. Related trees
    /// reuse their chain structure (the common case of diffing a tree
    /// against a direct descendant is proportional to the delta, not the
    /// tree); unrelated trees fall back to a full structural diff keyed by
    /// node names.
    pub fn forward_delta_with(
        &self,
        source: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
    ) -> TreeResult<DeltaTree<T>> {
        let result = if self.ptr_eq(source) {
            self.new_empty_delta()?
        } else if source.has_ancestor(self) {
            let mut assembled = source.root_node();
            let mut tree = source.parent().expect("descendant chain reaches ancestor");
            while !tree.ptr_eq(self) {
                assembled = tree.root_node().assemble_with(&assembled);
                tree = tree.parent().expect("descendant chain reaches ancestor");
            }
            let delta = Self::with_root_and_parent(assembled, Some(self.clone()));
            delta.simplify(comparator);
            delta
        } else if self.has_ancestor(source) {
            // Compute the delta in the other direction, then invert it.
            let reversed = source.forward_delta_with(self, comparator)?;
            reversed.as_backward_delta()?
        } else {
            let this_root = self.copy_complete_subtree(&TreePath::root())?;
            let source_root = source.copy_complete_subtree(&TreePath::root())?;
            let delta_root = this_root.forward_delta_with(&source_root, comparator);
            Self::with_root_and_parent(delta_root, Some(self.clone()))
        };
        result.seal();
        Ok(result)
    }

    /// Collapse a delta one level: reconcile this tree's root with
    /// `delta`'s root, producing a tree with `delta`'s content whose parent
    /// is this tree's parent. The result is mutable.
    ///
    /// Law: `a.assemble_with_forward_delta(&a.forward_delta_with(&b)?)` has
    /// the same content as `b`.
    pub fn assemble_with_forward_delta(&self, delta: &DeltaTree<T>) -> DeltaTree<T> {
        let (root, parent) = self.snapshot();
        Self::with_root_and_parent(root.assemble_with(&delta.root_node()), parent)
    }

    /// Re-express this tree (a forward delta on its parent) as the delta
    /// that, applied to this tree, restores the parent. The result's parent
    /// is this tree. A parentless tree yields an empty delta.
    pub fn as_backward_delta(&self) -> TreeResult<DeltaTree<T>> {
        let (root, parent) = self.snapshot();
        let Some(parent) = parent else {
            return self.new_empty_delta();
        };
        let backward = root
            .backward_delta(&parent, &TreePath::root())
            .unwrap_or_else(|| Node::no_data_delta(None, vec![]));
        Ok(Self::with_root_and_parent(backward, Some(self.clone())))
    }

    /// Recompress this tree so `ancestor` becomes its direct parent,
    /// preserving content and discarding intermediate chain structure.
    pub fn collapse_to(
        &self,
        ancestor: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
    ) -> TreeResult<()> {
        if self.ptr_eq(ancestor) {
            return Ok(());
        }
        if let Some(parent) = self.parent() {
            if parent.ptr_eq(ancestor) {
                return Ok(());
            }
        }
        let collapsed = ancestor.forward_delta_with(self, comparator)?;
        debug!("collapsed delta chain to direct parent");
        self.publish(collapsed.root_node(), Some(ancestor.clone()));
        Ok(())
    }

    /// Restructure the whole chain so this tree becomes its complete
    /// anchor: every ancestor is re-expressed as a backward delta hanging
    /// off this tree, and this tree becomes parentless.
    ///
    /// Every tree in the chain keeps its observable content. The entire
    /// chain must be sealed.
    pub fn reroot(&self) -> TreeResult<()> {
        debug!("rerooting delta chain");
        self.reroot_tree()
    }

    fn reroot_tree(&self) -> TreeResult<()> {
        if !self.is_immutable() {
            return Err(TreeError::ImmutableRequired);
        }
        let Some(parent) = self.parent() else {
            return Ok(());
        };
        parent.reroot_tree()?;
        let backward = self.as_backward_delta()?;
        let complete = parent.assemble_with_forward_delta(self);
        self.publish(complete.root_node(), None);
        parent.publish(backward.root_node(), Some(self.clone()));
        Ok(())
    }

    /// Minimize this tree's delta representation against its parent:
    /// data deltas the comparator finds redundant demote to no-data deltas,
    /// and empty leaves are pruned. A parentless tree is left unchanged.
    pub fn simplify(&self, comparator: &dyn Comparator<T>) {
        let (root, parent) = self.snapshot();
        let Some(parent) = parent else { return };
        self.publish_root(root.simplify_with_parent(&TreePath::root(), &parent, comparator));
    }

    // -----------------------------------------------------------------
    // Comparison
    // -----------------------------------------------------------------

    /// Diff this tree (old side) against `other` (new side), producing a
    /// sealed comparison tree. Subtrees with no meaningful change are
    /// omitted.
    pub fn compare_with(
        &self,
        other: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
    ) -> TreeResult<DeltaTree<NodeComparison<T>>> {
        let result = if self.ptr_eq(other) {
            Self::empty_comparison_tree()
        } else if other.has_ancestor(self) {
            let mut assembled = other.root_node();
            let mut tree = other.parent().expect("descendant chain reaches ancestor");
            while !tree.ptr_eq(self) {
                assembled = tree.root_node().assemble_with(&assembled);
                tree = tree.parent().expect("descendant chain reaches ancestor");
            }
            Self::comparison_tree(assembled.compare_with_base(&TreePath::root(), self, comparator))
        } else if self.has_ancestor(other) {
            let mut assembled = self.as_backward_delta()?.root_node();
            let mut tree = self.clone();
            loop {
                let parent = tree.parent().expect("descendant chain reaches ancestor");
                if parent.ptr_eq(other) {
                    break;
                }
                assembled = assembled.assemble_with(&parent.as_backward_delta()?.root_node());
                tree = parent;
            }
            Self::comparison_tree(assembled.compare_with_base(&TreePath::root(), self, comparator))
        } else {
            let this_root = self.copy_complete_subtree(&TreePath::root())?;
            let other_root = other.copy_complete_subtree(&TreePath::root())?;
            DeltaTree::with_root(this_root.compare_with(&other_root, comparator))
        };
        result.seal();
        Ok(result)
    }

    /// Path-scoped comparison: diff the subtrees at `path`, handling the
    /// cases where the path exists in only one tree (all-added/all-removed)
    /// or in neither (empty result).
    pub fn compare_with_at(
        &self,
        other: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
        path: &TreePath,
    ) -> TreeResult<DeltaTree<NodeComparison<T>>> {
        let result = if self.includes(path) {
            if other.includes(path) {
                return self.basic_compare(other, comparator, path);
            }
            let subtree = self.copy_complete_subtree(path)?;
            let user_bits = comparator.compare(self.get_data(path)?.as_ref(), None);
            Self::comparison_tree(subtree.to_removed_comparison(user_bits))
        } else if other.includes(path) {
            let subtree = other.copy_complete_subtree(path)?;
            let user_bits = comparator.compare(None, other.get_data(path)?.as_ref());
            Self::comparison_tree(subtree.to_added_comparison(user_bits))
        } else {
            Self::empty_comparison_tree()
        };
        result.seal();
        Ok(result)
    }

    /// Compare two trees that both contain `path`, rooting the result at
    /// the node addressed by `path`.
    fn basic_compare(
        &self,
        other: &DeltaTree<T>,
        comparator: &dyn Comparator<T>,
        path: &TreePath,
    ) -> TreeResult<DeltaTree<NodeComparison<T>>> {
        let result = if self.ptr_eq(other) {
            Self::empty_comparison_tree()
        } else if other.has_ancestor(self) {
            let mut assembled = other.find_node(path);
            let mut tree = other.parent().expect("descendant chain reaches ancestor");
            while !tree.ptr_eq(self) {
                // A layer may say nothing about this path.
                if let Some(node) = tree.find_node(path) {
                    assembled = Some(match assembled {
                        Some(overlay) => node.assemble_with(&overlay),
                        None => node,
                    });
                }
                tree = tree.parent().expect("descendant chain reaches ancestor");
            }
            match assembled {
                Some(node) => {
                    Self::comparison_tree(node.compare_with_base(path, self, comparator))
                }
                None => Self::empty_comparison_tree(),
            }
        } else if self.has_ancestor(other) {
            let mut assembled = self.as_backward_delta()?.find_node(path);
            let mut tree = self.clone();
            loop {
                let parent = tree.parent().expect("descendant chain reaches ancestor");
                if parent.ptr_eq(other) {
                    break;
                }
                if let Some(node) = parent.as_backward_delta()?.find_node(path) {
                    assembled = Some(match assembled {
                        Some(base) => base.assemble_with(&node),
                        None => node,
                    });
                }
                tree = parent;
            }
            match assembled {
                Some(node) => {
                    Self::comparison_tree(node.compare_with_base(path, self, comparator))
                }
                None => Self::empty_comparison_tree(),
            }
        } else {
            let this_root = self.copy_complete_subtree(path)?;
            let other_root = other.copy_complete_subtree(path)?;
            DeltaTree::with_root(this_root.compare_with(&other_root, comparator))
        };
        result.seal();
        Ok(result)
    }

    fn comparison_tree(
        root: Option<NodeRef<NodeComparison<T>>>,
    ) -> DeltaTree<NodeComparison<T>> {
        match root {
            Some(node) => DeltaTree::with_root(node),
            None => Self::empty_comparison_tree(),
        }
    }

    fn empty_comparison_tree() -> DeltaTree<NodeComparison<T>> {
        DeltaTree::with_root(Node::complete_named(
            None,
            Some(NodeComparison::unchanged()),
            vec![],
        ))
    }
}

impl<T: Clone> Default for DeltaTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DeltaTree<NodeComparison<T>> {
    /// Flip the orientation of a comparison tree produced by
    /// [`DeltaTree::compare_with`]: additions become removals and
    /// vice-versa, old and new data swap at every node. Only valid on
    /// comparison trees; the new representation is published in place.
    pub fn as_reverse_comparison_tree(&self, comparator: &dyn Comparator<T>) {
        let root = self.root_node();
        let reversed = if root.name().is_none() {
            // The unnamed absolute root keeps its own payload; only the
            // children flip.
            let children = root
                .children()
                .iter()
                .filter_map(|child| child.reverse_comparison(comparator))
                .collect();
            root.with_children(children)
        } else {
            root.reverse_comparison(comparator).unwrap_or_else(|| {
                Node::complete_named(
                    root.name().cloned(),
                    Some(NodeComparison::unchanged()),
                    vec![],
                )
            })
        };
        self.publish_root(reversed);
    }
}
