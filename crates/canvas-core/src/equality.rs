//! # Node Equality
//!
//! Shape comparisons between trees, independent of node identity.

use crate::node::{CanvasNode, NodeKind};
use crate::types::Compatibility;
use std::mem;

/// Same node kinds, equal types and equal child counts, recursively.
#[must_use]
pub fn is_structurally_equal(a: &CanvasNode, b: &CanvasNode) -> bool {
    same_shape(a, b)
        && a.children()
            .zip(b.children())
            .all(|(left, right)| is_structurally_equal(left, right))
}

/// Structural equality that also requires queries to project the same
/// field.
#[must_use]
pub fn is_value_equal(a: &CanvasNode, b: &CanvasNode) -> bool {
    if let (NodeKind::Query { field: left }, NodeKind::Query { field: right }) = (a.kind(), b.kind())
    {
        if left != right {
            return false;
        }
    }
    same_shape(a, b)
        && a.children()
            .zip(b.children())
            .all(|(left, right)| is_value_equal(left, right))
}

fn same_shape(a: &CanvasNode, b: &CanvasNode) -> bool {
    mem::discriminant(a.kind()) == mem::discriminant(b.kind())
        && a.ty().compatibility(b.ty()) == Compatibility::Equal
        && a.child_count() == b.child_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{QueryNode, RecordNode, ReferenceNode, ValueNode};
    use crate::path::CanvasPath;
    use crate::types::{CanvasType, Field, NativeType, Value};

    fn quote() -> CanvasNode {
        RecordNode::new(&CanvasType::record(
            "Quote",
            vec![
                Field::new("bid", CanvasType::native(NativeType::Money)),
                Field::new("ask", CanvasType::native(NativeType::Money)),
            ],
        ))
        .expect("record")
    }

    #[test]
    fn clone_is_structurally_equal() {
        let node = quote();
        assert!(is_structurally_equal(&node, &node.clone()));
    }

    #[test]
    fn literal_values_do_not_matter() {
        let a = ValueNode::new(Value::Integer(1));
        let b = ValueNode::new(Value::Integer(2));
        assert!(is_structurally_equal(&a, &b));
        assert!(is_value_equal(&a, &b));
    }

    #[test]
    fn kind_and_type_must_match() {
        let value = ValueNode::new(Value::Integer(1));
        let decimal = ValueNode::new(Value::Decimal(1.0));
        let reference = ReferenceNode::with_type(
            &CanvasPath::parse("<x").expect("path"),
            CanvasType::native(NativeType::Integer),
        );
        assert!(!is_structurally_equal(&value, &decimal));
        assert!(!is_structurally_equal(&value, &reference));
    }

    #[test]
    fn queries_compare_projected_field() {
        let bid = QueryNode::new(quote(), "bid").expect("bid");
        let ask = QueryNode::new(quote(), "ask").expect("ask");
        assert!(is_structurally_equal(&bid, &ask));
        assert!(!is_value_equal(&bid, &ask));
        assert!(is_value_equal(&bid, &bid.clone()));
    }
}
