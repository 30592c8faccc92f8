//! # Engine Tier Tests (T0-T4)
//!
//! Behavioural scenarios, from the type system up to reference
//! resolution and the clipboard format.
//!
//! ## Tiers
//! - T0: Type System
//! - T1: Node Library
//! - T2: Paths and Navigation
//! - T3: Builder and Conversion
//! - T4: Resolution and Clipboard

use canvas_core::{
    CanvasError, CanvasNode, CanvasNodeBuilder, CanvasPath, CanvasType, Compatibility,
    CustomNode, Field, NativeType, NodeKind, NodeRef, Value, ValueNode,
};
use std::sync::Arc;

fn native(kind: NativeType) -> Arc<CanvasType> {
    CanvasType::native(kind)
}

fn path(text: &str) -> CanvasPath {
    CanvasPath::parse(text).expect("path")
}

fn pair_type() -> Arc<CanvasType> {
    CanvasType::record(
        "Pair",
        vec![
            Field::new("a", native(NativeType::Integer)),
            Field::new("b", native(NativeType::Integer)),
        ],
    )
}

// =============================================================================
// TIER T0: TYPE SYSTEM
// =============================================================================

mod t0_type_system {
    use super::*;
    use canvas_core::{intersection, is_compatible};

    /// T0.1: Native singletons are shared.
    #[test]
    fn native_types_are_singletons() {
        assert!(Arc::ptr_eq(
            &native(NativeType::Money),
            &native(NativeType::Money)
        ));
        assert!(Arc::ptr_eq(&CanvasType::any(), &CanvasType::any()));
    }

    /// T0.2: `Any` accepts every native type but not records.
    #[test]
    fn any_accepts_natives() {
        for kind in NativeType::ALL {
            assert!(is_compatible(&CanvasType::any(), &native(kind)));
        }
        assert!(!is_compatible(&CanvasType::any(), &pair_type()));
    }

    /// T0.3: Compatibility is directional.
    #[test]
    fn compatibility_is_directional() {
        let numeric = CanvasType::numeric();
        let integer = native(NativeType::Integer);
        assert_eq!(numeric.compatibility(&integer), Compatibility::Compatible);
        assert_eq!(integer.compatibility(&numeric), Compatibility::Incompatible);
        assert_eq!(numeric.compatibility(&numeric), Compatibility::Equal);
    }

    /// T0.4: Intersections narrow unions to their common members.
    #[test]
    fn intersection_of_unions() {
        let common = intersection(&CanvasType::numeric(), &CanvasType::comparable())
            .expect("common members");
        assert!(is_compatible(&CanvasType::numeric(), &common));
        assert!(is_compatible(&CanvasType::comparable(), &common));
        assert!(intersection(&native(NativeType::Side), &CanvasType::numeric()).is_none());
    }
}

// =============================================================================
// TIER T1: NODE LIBRARY
// =============================================================================

mod t1_node_library {
    use super::*;
    use canvas_core::{
        FunctionNode, ORDER_TASK_TEMPLATES, QueryNode, RecordNode, SingleOrderTaskNode,
        StandardNodes, make_default_canvas_node, order_task_template,
    };

    /// T1.1: Every native type has a default node of that type.
    #[test]
    fn default_nodes_match_their_type() {
        for kind in NativeType::ALL {
            let node = make_default_canvas_node(&native(kind));
            assert_eq!(node.ty().as_native(), Some(kind));
        }
    }

    /// T1.2: Operators narrow as their arguments are filled in.
    #[test]
    fn operator_narrows_with_arguments() {
        let addition = StandardNodes::addition().expect("addition");
        assert!(FunctionNode::signatures(&addition).len() > 1);
        let narrowed = addition
            .replace("left", ValueNode::new(Value::Duration(1000)))
            .expect("left");
        assert_eq!(narrowed.ty().name(), "Duration");
    }

    /// T1.3: An argument no signature accepts is rejected.
    #[test]
    fn operator_rejects_impossible_argument() {
        let result = StandardNodes::not()
            .expect("not")
            .replace("operand", ValueNode::new(Value::Integer(1)));
        assert!(result.is_err_and(|error| error.is_type_incompatible()));
    }

    /// T1.4: Queries follow the projected field's type.
    #[test]
    fn query_follows_field() {
        let record = RecordNode::new(&pair_type()).expect("record");
        let query = QueryNode::new(record, "b").expect("query");
        assert_eq!(query.ty().as_native(), Some(NativeType::Integer));
        let widened = query
            .replace(
                "record",
                RecordNode::new(&pair_type())
                    .expect("record")
                    .replace("b", ValueNode::new(Value::Decimal(0.5)))
                    .expect("b"),
            )
            .expect("record");
        assert_eq!(widened.ty().as_native(), Some(NativeType::Decimal));
    }

    /// T1.5: Templates fix and hide their defining fields.
    #[test]
    fn templates_fix_fields() {
        for name in ORDER_TASK_TEMPLATES {
            let node = order_task_template(name).expect(name);
            assert_eq!(node.kind(), &NodeKind::SingleOrderTask);
            let hidden = node.children().filter(|child| !child.is_visible()).count();
            assert!(hidden >= 1, "{} hides nothing", name);
        }
        let plain = SingleOrderTaskNode::new("Order").expect("order");
        assert!(plain.children().all(CanvasNode::is_visible));
    }
}

// =============================================================================
// TIER T2: PATHS AND NAVIGATION
// =============================================================================

mod t2_paths_navigation {
    use super::*;
    use canvas_core::{
        find_node, get_common_ancestor, get_full_name, get_node, get_path, is_parent,
    };

    fn tree() -> CanvasNode {
        let order = CustomNode::new(
            "Order",
            vec![
                ("price".to_string(), ValueNode::new(Value::Integer(10))),
                ("qty".to_string(), ValueNode::new(Value::Integer(100))),
            ],
        )
        .expect("order");
        CustomNode::new(
            "Strategy",
            vec![
                ("order".to_string(), order),
                ("limit.max".to_string(), ValueNode::new(Value::Integer(5))),
            ],
        )
        .expect("strategy")
    }

    /// T2.1: Names are escaped in full names and resolve back.
    #[test]
    fn dotted_names_escape() {
        let root = tree();
        let node = NodeRef::locate(&root, &[1]).expect("limit.max");
        let name = get_full_name(&node);
        assert_eq!(name, "limit\\.max");
        let found = get_node(&path(&name), &NodeRef::root(&root)).expect("resolve");
        assert_eq!(found, node);
    }

    /// T2.2: Relative paths climb to the common ancestor.
    #[test]
    fn relative_path_between_cousins() {
        let root = tree();
        let qty = NodeRef::locate(&root, &[0, 1]).expect("qty");
        let limit = NodeRef::locate(&root, &[1]).expect("limit");
        assert_eq!(
            get_common_ancestor(&qty, &limit),
            Some(NodeRef::root(&root))
        );
        let relative = get_path(&qty, &limit).expect("path");
        assert_eq!(relative.to_string(), "<<limit\\.max");
        assert_eq!(find_node(&relative, &qty), Some(limit));
    }

    /// T2.3: Missing paths are errors for get, absent for find.
    #[test]
    fn missing_paths() {
        let root = tree();
        let top = NodeRef::root(&root);
        assert!(find_node(&path("order.volume"), &top).is_none());
        assert!(matches!(
            get_node(&path("order.volume"), &top),
            Err(CanvasError::PathNotFound(_))
        ));
    }

    /// T2.4: Strict ancestry.
    #[test]
    fn ancestry() {
        let root = tree();
        let order = NodeRef::locate(&root, &[0]).expect("order");
        let price = NodeRef::locate(&root, &[0, 0]).expect("price");
        assert!(is_parent(&order, &price));
        assert!(!is_parent(&price, &order));
        assert!(!is_parent(&order, &order));
    }
}

// =============================================================================
// TIER T3: BUILDER AND CONVERSION
// =============================================================================

mod t3_builder_conversion {
    use super::*;
    use canvas_core::{RecordNode, is_value_equal};

    /// T3.1: Converting one record field rebuilds only that field's path.
    #[test]
    fn record_field_conversion() {
        let record = RecordNode::new(&pair_type()).expect("record");
        let mut builder = CanvasNodeBuilder::new(&record);
        builder
            .convert(&path("a"), &native(NativeType::Decimal))
            .expect("convert");
        let result = builder.make();

        assert_eq!(result.kind(), &NodeKind::Record);
        let a = result.find_child("a").expect("a");
        assert_eq!(a.ty().as_native(), Some(NativeType::Decimal));
        let b_before = record.find_child("b").expect("b");
        let b_after = result.find_child("b").expect("b");
        assert!(is_value_equal(b_before, b_after));
        assert_eq!(b_after.value(), Some(&Value::Integer(0)));

        let fields = result.ty().as_record().expect("record type");
        assert_eq!(fields.name(), "Pair");
        assert_eq!(
            fields.field("a").and_then(|field| field.ty.as_native()),
            Some(NativeType::Decimal)
        );
    }

    /// T3.2: Failed conversions leave the working tree untouched.
    #[test]
    fn failed_conversion_keeps_tree() {
        let record = RecordNode::new(&pair_type()).expect("record");
        let mut builder = CanvasNodeBuilder::new(&record);
        let result = builder.convert(&path("a"), &native(NativeType::Side));
        assert!(matches!(result, Err(CanvasError::TypeIncompatible { .. })));
        assert!(is_value_equal(builder.node(), &record));
    }

    /// T3.3: A record converts to a query on its matching field.
    #[test]
    fn record_wraps_into_query() {
        let holder = CustomNode::new(
            "Holder",
            vec![(
                "pair".to_string(),
                RecordNode::new(&pair_type()).expect("record"),
            )],
        )
        .expect("holder");
        let mut builder = CanvasNodeBuilder::new(&holder);
        builder
            .convert(&path("pair"), &native(NativeType::Integer))
            .expect("convert");
        let result = builder.make();
        let query = result.find_child("pair").expect("pair");
        assert!(matches!(query.kind(), NodeKind::Query { field } if field == "a"));
        assert_eq!(result.ty().as_native(), Some(NativeType::Integer));
    }

    /// T3.4: The builder's result is independent of later edits.
    #[test]
    fn made_trees_are_snapshots() {
        let record = RecordNode::new(&pair_type()).expect("record");
        let mut builder = CanvasNodeBuilder::new(&record);
        builder
            .replace(&path("a"), ValueNode::new(Value::Integer(1)))
            .expect("first");
        let first = builder.make();
        builder
            .replace(&path("a"), ValueNode::new(Value::Integer(2)))
            .expect("second");
        assert_eq!(
            first.find_child("a").and_then(CanvasNode::value),
            Some(&Value::Integer(1))
        );
        assert_eq!(
            builder.node().find_child("a").and_then(CanvasNode::value),
            Some(&Value::Integer(2))
        );
    }
}

// =============================================================================
// TIER T4: RESOLUTION AND CLIPBOARD
// =============================================================================

mod t4_resolution_clipboard {
    use super::*;
    use canvas_core::{
        MimeData, ReferenceNode, decode_from_mime_data, encode_as_mime_data,
        is_structurally_equal, resolve_references,
    };

    fn referencing_tree() -> CanvasNode {
        CustomNode::new(
            "Root",
            vec![
                (
                    "mirror".to_string(),
                    ReferenceNode::with_type(&path("<source"), native(NativeType::Boolean)),
                ),
                ("source".to_string(), ValueNode::new(Value::Integer(1))),
            ],
        )
        .expect("root")
    }

    /// T4.1: Editing a referent retypes its references on resolution.
    #[test]
    fn edit_then_resolve() {
        let mut builder = CanvasNodeBuilder::new(&referencing_tree());
        builder
            .replace(&path("source"), ValueNode::new(Value::Text("abc".into())))
            .expect("replace");
        let resolved = resolve_references(&builder.make());
        assert_eq!(
            resolved.find_child("mirror").map(|mirror| mirror.ty().name()),
            Some("Text".to_string())
        );
    }

    /// T4.2: Resolution is idempotent.
    #[test]
    fn resolution_is_idempotent() {
        let once = resolve_references(&referencing_tree());
        let twice = resolve_references(&once);
        assert!(is_structurally_equal(&once, &twice));
    }

    /// T4.3: Clipboard round trip keeps references and flags.
    #[test]
    fn clipboard_round_trip() {
        let tree = referencing_tree().set_read_only(true);
        let mime = encode_as_mime_data(std::slice::from_ref(&tree)).expect("encode");
        let decoded = decode_from_mime_data(&mime);
        assert_eq!(decoded.len(), 1);
        let restored = decoded.first().expect("node");
        assert!(is_structurally_equal(&tree, restored));
        assert!(restored.is_read_only());
        assert_eq!(
            restored.find_child("mirror").and_then(CanvasNode::referent),
            Some("<source")
        );
    }

    /// T4.4: Garbage decodes to nothing.
    #[test]
    fn garbage_decodes_to_empty() {
        let mime = MimeData {
            format: canvas_core::primitives::MIME_TYPE.to_string(),
            data: b"CNVS\x02\xff\xff\xff".to_vec(),
        };
        assert!(decode_from_mime_data(&mime).is_empty());
    }
}
