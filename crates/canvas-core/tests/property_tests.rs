//! # Property-Based Tests
//!
//! Invariants of the tree engine over generated canvases: cloning, path
//! addressing, ancestry, conversion, builder sharing and reference
//! resolution.

use canvas_core::{
    CanvasNode, CanvasNodeBuilder, CanvasPath, CanvasType, CustomNode, NativeType, NodeRef,
    ReferenceNode, Value, ValueNode, breadth_first, get_full_name, get_height, get_node, get_path,
    is_compatible, is_structurally_equal, is_value_equal, resolve_references,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::Index;
use std::sync::Arc;

// =============================================================================
// GENERATORS
// =============================================================================

/// Slot name stems, including characters that need escaping in paths.
const STEMS: [&str; 5] = ["a", "b.c", "<d", "e\\f", "slot"];

fn leaf() -> impl Strategy<Value = CanvasNode> {
    prop_oneof![
        any::<i64>().prop_map(|v| ValueNode::new(Value::Integer(v))),
        any::<bool>().prop_map(|v| ValueNode::new(Value::Boolean(v))),
        "[a-z]{0,8}".prop_map(|v| ValueNode::new(Value::Text(v))),
    ]
}

fn tree() -> impl Strategy<Value = CanvasNode> {
    leaf().prop_recursive(4, 48, 4, |inner| {
        vec(inner, 1..4).prop_map(|children| {
            let slots = children
                .into_iter()
                .enumerate()
                .map(|(i, child)| (format!("{}{}", STEMS[i % STEMS.len()], i), child))
                .collect();
            CustomNode::new("Group", slots).expect("custom")
        })
    })
}

fn positions(root: &CanvasNode) -> Vec<Vec<usize>> {
    breadth_first(&NodeRef::root(root))
        .map(|node| node.position().to_vec())
        .collect()
}

fn pick<'a>(root: &'a CanvasNode, index: &Index) -> NodeRef<'a> {
    let all = positions(root);
    NodeRef::locate(root, index.get(all.as_slice()).as_slice()).expect("generated position")
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// A clone has the same structure as its original.
    #[test]
    fn clone_is_structurally_equal(root in tree()) {
        let copy = root.clone();
        prop_assert!(is_structurally_equal(&root, &copy));
        prop_assert!(is_value_equal(&root, &copy));
    }

    /// Every node is found again from the root by its full name.
    #[test]
    fn full_name_round_trips(root in tree()) {
        let top = NodeRef::root(&root);
        for node in breadth_first(&top) {
            let path = CanvasPath::parse(&get_full_name(&node)).expect("parse");
            let found = get_node(&path, &top).expect("resolve");
            prop_assert!(is_value_equal(&found, &node));
            prop_assert_eq!(found, node);
        }
    }

    /// A relative path from `a` leads to exactly `b`.
    #[test]
    fn get_path_inverts_get_node(root in tree(), a in any::<Index>(), b in any::<Index>()) {
        let a = pick(&root, &a);
        let b = pick(&root, &b);
        let path = get_path(&a, &b).expect("same tree");
        let text = path.to_string();
        let reparsed = CanvasPath::parse(&text).expect("parse");
        prop_assert_eq!(get_node(&reparsed, &a).expect("resolve"), b);
    }

    /// Heights are antisymmetric.
    #[test]
    fn height_is_antisymmetric(root in tree(), a in any::<Index>(), b in any::<Index>()) {
        let a = pick(&root, &a);
        let b = pick(&root, &b);
        prop_assert_eq!(get_height(&a, &b), get_height(&b, &a).map(|height| -height));
    }

    /// Converting to a type the node already satisfies changes nothing.
    #[test]
    fn conversion_to_own_type_is_identity(root in tree(), index in any::<Index>()) {
        let node = pick(&root, &index);
        let own = Arc::clone(node.ty());
        let converted = node.convert(&own).expect("convert");
        prop_assert!(is_value_equal(&converted, &node));
        let any = CanvasType::any();
        if is_compatible(&any, node.ty()) {
            let widened = node.convert(&any).expect("convert");
            prop_assert!(is_value_equal(&widened, &node));
        }
    }

    /// A builder edit shares every sibling subtree off the edit path.
    #[test]
    fn builder_shares_untouched_subtrees(
        root in tree(),
        index in any::<Index>(),
        value in any::<i64>()
    ) {
        let target = pick(&root, &index);
        let position = target.position().to_vec();
        let path = CanvasPath::from_node(&target);
        let mut builder = CanvasNodeBuilder::new(&root);
        builder.replace(&path, ValueNode::new(Value::Integer(value))).expect("replace");
        let result = builder.make();

        let mut before = &root;
        let mut after = &result;
        for &step in &position {
            prop_assert_eq!(before.child_count(), after.child_count());
            for sibling in (0..before.child_count()).filter(|&i| i != step) {
                prop_assert!(Arc::ptr_eq(
                    before.child_slot(sibling).expect("sibling"),
                    after.child_slot(sibling).expect("sibling")
                ));
            }
            before = before.child(step).expect("step");
            after = after.child(step).expect("step");
        }
        prop_assert_eq!(after.value(), Some(&Value::Integer(value)));
    }

    /// Resolution terminates and leaves no stale reference to a literal.
    #[test]
    fn resolution_settles(
        values in vec(any::<i64>(), 1..5),
        links in vec((any::<Index>(), 0usize..3), 1..6)
    ) {
        let declared = [NativeType::Boolean, NativeType::Text, NativeType::Integer];
        let mut slots: Vec<(String, CanvasNode)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("v{}", i), ValueNode::new(Value::Integer(*v))))
            .collect();
        for (i, (target, kind)) in links.iter().enumerate() {
            let referent = format!("<v{}", target.index(values.len()));
            let path = CanvasPath::parse(&referent).expect("path");
            let reference = ReferenceNode::with_type(&path, CanvasType::native(declared[*kind]));
            slots.push((format!("r{}", i), reference));
        }
        let root = CustomNode::new("Root", slots).expect("root");

        let resolved = resolve_references(&root);
        prop_assert_eq!(resolved.child_count(), root.child_count());
        for reference in resolved.children().skip(values.len()) {
            prop_assert_eq!(reference.ty().as_native(), Some(NativeType::Integer));
        }
    }
}
