//! String pooling: an optional memory-compaction hook.
//!
//! Long-lived chains accumulate many copies of the same node names (and, for
//! string-bearing payloads, payload strings). [`StringPool`] canonicalizes
//! them so equal strings share one allocation. Interning never mutates
//! shared nodes: each layer's graph is rebuilt with pooled strings and
//! published as that layer's new root. Purely an optimization; correctness
//! never depends on it.

use std::collections::HashSet;
use std::sync::Arc;

use crate::delta::DeltaTree;
use crate::node::{Node, NodeRef};

/// A deduplicating set of shared strings.
#[derive(Debug, Default)]
pub struct StringPool {
    strings: HashSet<Arc<str>>,
}

impl StringPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical shared handle for `text`.
    pub fn intern(&mut self, text: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(text) {
            return existing.clone();
        }
        let shared: Arc<str> = Arc::from(text);
        self.strings.insert(shared.clone());
        shared
    }

    /// Number of distinct strings pooled.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns `true` if nothing has been pooled yet.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Capability for payloads that hold strings worth pooling.
pub trait InternStrings {
    /// Replace the payload's strings with pooled handles.
    fn intern_strings(&mut self, pool: &mut StringPool);
}

impl<T: Clone + InternStrings> DeltaTree<T> {
    /// Pool every node name (and payload string) across this tree and its
    /// whole parent chain, publishing each layer's rebuilt graph.
    pub fn store_strings(&self, pool: &mut StringPool) {
        self.publish_root(intern_node(&self.root_node(), pool));
        let mut current = self.parent();
        while let Some(tree) = current {
            tree.publish_root(intern_node(&tree.root_node(), pool));
            current = tree.parent();
        }
    }
}

fn intern_node<T: Clone + InternStrings>(node: &NodeRef<T>, pool: &mut StringPool) -> NodeRef<T> {
    let name = node.name().map(|n| pool.intern(n));
    let children: Vec<NodeRef<T>> = node
        .children()
        .iter()
        .map(|child| intern_node(child, pool))
        .collect();
    let data = node.data().cloned().map(|mut value| {
        value.intern_strings(pool);
        value
    });
    match &**node {
        Node::Complete { .. } => Node::complete_named(name, data, children),
        Node::DataDelta { .. } => Node::data_delta_named(name, data, children),
        Node::NoDataDelta { .. } => Node::no_data_delta_named(name, children),
        Node::Deleted { .. } => Node::deleted_named(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_path::TreePath;

    #[derive(Clone, Debug, PartialEq)]
    struct Label(Arc<str>);

    impl InternStrings for Label {
        fn intern_strings(&mut self, pool: &mut StringPool) {
            self.0 = pool.intern(&self.0);
        }
    }

    #[test]
    fn intern_returns_shared_handles() {
        let mut pool = StringPool::new();
        let a = pool.intern("name");
        let b = pool.intern("name");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn store_strings_pools_names_across_layers() {
        let root = TreePath::root();
        let base: DeltaTree<Label> = DeltaTree::new();
        base.create_child(&root, "shared", Some(Label(Arc::from("payload"))))
            .unwrap();
        base.seal();
        let overlay = base.new_empty_delta().unwrap();
        overlay
            .set_data(&"/shared".parse().unwrap(), Some(Label(Arc::from("payload"))))
            .unwrap();

        let mut pool = StringPool::new();
        overlay.store_strings(&mut pool);

        let base_name = base.root_node().children()[0].name().cloned().unwrap();
        let overlay_name = overlay.root_node().children()[0].name().cloned().unwrap();
        assert!(Arc::ptr_eq(&base_name, &overlay_name));

        let base_payload = base.get_data(&"/shared".parse().unwrap()).unwrap().unwrap();
        let overlay_payload = overlay
            .get_data(&"/shared".parse().unwrap())
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&base_payload.0, &overlay_payload.0));

        // content is untouched
        assert_eq!(overlay_payload, Label(Arc::from("payload")));
    }
}
