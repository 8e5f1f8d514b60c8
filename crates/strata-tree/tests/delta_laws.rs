//! Property tests for the delta algebra laws over randomized trees.

use std::collections::BTreeMap;

use proptest::prelude::*;
use strata_path::TreePath;
use strata_tree::{Comparator, DeltaTree, EqualityComparator, Node, NodeRef};

/// Shape of a randomly generated complete tree.
#[derive(Clone, Debug)]
struct Shape {
    data: Option<u32>,
    children: BTreeMap<String, Shape>,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop::option::of(any::<u32>()).prop_map(|data| Shape {
        data,
        children: BTreeMap::new(),
    });
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::option::of(any::<u32>()),
            prop::collection::btree_map("[a-e]", inner, 0..4),
        )
            .prop_map(|(data, children)| Shape { data, children })
    })
}

fn build_node(name: Option<&str>, shape: &Shape) -> NodeRef<u32> {
    let children = shape
        .children
        .iter()
        .map(|(child_name, child_shape)| build_node(Some(child_name), child_shape))
        .collect();
    Node::complete(name, shape.data, children)
}

fn build_tree(shape: &Shape) -> DeltaTree<u32> {
    let tree = DeltaTree::with_root(build_node(None, shape));
    tree.seal();
    tree
}

fn content(tree: &DeltaTree<u32>) -> NodeRef<u32> {
    tree.copy_complete_subtree(&TreePath::root()).unwrap()
}

fn assert_sorted(node: &NodeRef<u32>) {
    for pair in node.children().windows(2) {
        assert!(
            pair[0].name_str() < pair[1].name_str(),
            "children out of order: {:?} >= {:?}",
            pair[0].name_str(),
            pair[1].name_str()
        );
    }
    for child in node.children() {
        assert_sorted(child);
    }
}

/// A comparator that never sees a difference.
struct Indifferent;

impl Comparator<u32> for Indifferent {
    fn compare(&self, _: Option<&u32>, _: Option<&u32>) -> i32 {
        0
    }
}

proptest! {
    /// a.assemble_with_forward_delta(a.forward_delta_with(b)) == b, for
    /// unrelated trees.
    #[test]
    fn delta_identity_unrelated(a in shape_strategy(), b in shape_strategy()) {
        let ta = build_tree(&a);
        let tb = build_tree(&b);
        let delta = ta.forward_delta_with(&tb, &EqualityComparator).unwrap();
        let reassembled = ta.assemble_with_forward_delta(&delta);
        prop_assert_eq!(&*content(&reassembled), &*content(&tb));
        assert_sorted(&delta.root_node());
        assert_sorted(&content(&reassembled));
    }

    /// The same law when b is an overlay chained on a.
    #[test]
    fn delta_identity_related(a in shape_strategy(), b in shape_strategy()) {
        let ta = build_tree(&a);
        let overlay = ta.new_empty_delta().unwrap();
        // Derive the overlay from `b`: replace/add b's top-level subtrees,
        // and drop any of a's top-level children not mentioned in b.
        for (name, child_shape) in &b.children {
            let key = TreePath::root().append(name);
            overlay
                .create_subtree(&key, &build_node(Some(name), child_shape))
                .unwrap();
        }
        for name in a.children.keys() {
            if !b.children.contains_key(name) {
                overlay.delete_child(&TreePath::root(), name).unwrap();
            }
        }
        overlay.seal();

        let delta = ta.forward_delta_with(&overlay, &EqualityComparator).unwrap();
        let reassembled = ta.assemble_with_forward_delta(&delta);
        prop_assert_eq!(&*content(&reassembled), &*content(&overlay));
        assert_sorted(&delta.root_node());
    }

    /// An explicitly deleted top-level child is absent no matter what any
    /// ancestor layer holds beneath it.
    #[test]
    fn deletion_shadows_ancestors(a in shape_strategy()) {
        let ta = build_tree(&a);
        let overlay = ta.new_empty_delta().unwrap();
        for name in a.children.keys() {
            overlay.delete_child(&TreePath::root(), name).unwrap();
        }
        for name in a.children.keys() {
            let key = TreePath::root().append(name);
            prop_assert!(!overlay.includes(&key));
            prop_assert!(!overlay.lookup(&key).found);
            prop_assert!(ta.includes(&key));
        }
        prop_assert_eq!(overlay.child_count(&TreePath::root()).unwrap(), 0);
    }

    /// With a comparator that reports no change for every payload, any two
    /// trees compare empty.
    #[test]
    fn indifferent_comparator_compares_empty(a in shape_strategy(), b in shape_strategy()) {
        let ta = build_tree(&a);
        let tb = build_tree(&b);
        let comparison = ta.compare_with(&tb, &Indifferent).unwrap();
        prop_assert!(comparison.is_empty_delta());
    }

    /// Rerooting a two-layer chain preserves every layer's content.
    #[test]
    fn reroot_preserves_content(a in shape_strategy(), b in shape_strategy()) {
        let ta = build_tree(&a);
        let overlay = ta.new_empty_delta().unwrap();
        for (name, child_shape) in &b.children {
            let key = TreePath::root().append(name);
            overlay
                .create_subtree(&key, &build_node(Some(name), child_shape))
                .unwrap();
        }
        overlay.seal();

        let base_content = content(&ta);
        let overlay_content = content(&overlay);
        overlay.reroot().unwrap();

        prop_assert!(overlay.parent().is_none());
        prop_assert_eq!(&*content(&ta), &*base_content);
        prop_assert_eq!(&*content(&overlay), &*overlay_content);
    }
}
