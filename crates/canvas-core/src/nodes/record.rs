//! Record construction and field projection.

use super::make_default_canvas_node;
use crate::node::{CanvasNode, NodeKind};
use crate::types::{CanvasError, CanvasType, Field, RecordType};
use std::sync::Arc;

/// Name of a query node's input slot.
pub const QUERY_INPUT: &str = "record";

/// A node with one child per field of a record type.
pub struct RecordNode;

impl RecordNode {
    /// Build a record node whose fields hold their types' default nodes.
    pub fn new(ty: &Arc<CanvasType>) -> Result<CanvasNode, CanvasError> {
        let record = ty
            .as_record()
            .ok_or_else(|| CanvasError::InvalidType(ty.name()))?;
        Ok(build_record(ty, record))
    }
}

pub(crate) fn build_record(ty: &Arc<CanvasType>, record: &RecordType) -> CanvasNode {
    let mut node = CanvasNode::new(NodeKind::Record, Arc::clone(ty), record.name());
    for field in record.fields() {
        let mut child = make_default_canvas_node(&field.ty);
        child.name = field.name.clone();
        node.children.push(Arc::new(child));
    }
    node
}

/// Re-derive a record's type from its fields' current types.
///
/// The record keeps its name; the field list tracks the children. The
/// shared type instance is kept when nothing changed.
pub(crate) fn derive_record_type(node: &mut CanvasNode) {
    let name = node
        .ty
        .as_record()
        .map_or_else(|| node.text.clone(), |record| record.name().to_string());
    let fields = node
        .children
        .iter()
        .map(|child| Field::new(child.name.clone(), Arc::clone(&child.ty)))
        .collect();
    let derived = CanvasType::record(name, fields);
    if derived != node.ty {
        node.ty = derived;
    }
}

/// Projects a named field out of a record-typed input.
pub struct QueryNode;

impl QueryNode {
    pub fn new(record: CanvasNode, field: &str) -> Result<CanvasNode, CanvasError> {
        let ty = field_type(&record, field)?;
        let mut node = CanvasNode::new(
            NodeKind::Query {
                field: field.to_string(),
            },
            ty,
            field,
        );
        node.add_child(QUERY_INPUT, record)?;
        Ok(node)
    }

    /// The projected field of a query node.
    #[must_use]
    pub fn field(node: &CanvasNode) -> Option<&str> {
        match node.kind() {
            NodeKind::Query { field } => Some(field),
            _ => None,
        }
    }
}

fn field_type(record: &CanvasNode, field: &str) -> Result<Arc<CanvasType>, CanvasError> {
    let record_type = record.ty().as_record().ok_or_else(|| CanvasError::TypeIncompatible {
        from: record.ty().name(),
        to: "Record".to_string(),
    })?;
    record_type
        .field(field)
        .map(|field| Arc::clone(&field.ty))
        .ok_or_else(|| CanvasError::FieldNotFound(field.to_string()))
}

pub(crate) fn derive_query_type(node: &mut CanvasNode) -> Result<(), CanvasError> {
    let NodeKind::Query { field } = &node.kind else {
        return Ok(());
    };
    let input = node
        .children
        .first()
        .ok_or_else(|| CanvasError::ChildNotFound(QUERY_INPUT.to_string()))?;
    node.ty = field_type(input, field)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::ValueNode;
    use crate::types::{NativeType, Value};

    fn quote_type() -> Arc<CanvasType> {
        CanvasType::record(
            "Quote",
            vec![
                Field::new("price", CanvasType::native(NativeType::Money)),
                Field::new("size", CanvasType::native(NativeType::Integer)),
            ],
        )
    }

    #[test]
    fn record_node_rejects_non_record_type() {
        let result = RecordNode::new(&CanvasType::native(NativeType::Integer));
        assert!(matches!(result, Err(CanvasError::InvalidType(_))));
    }

    #[test]
    fn record_type_rederived_after_field_replacement() {
        let node = RecordNode::new(&quote_type()).expect("record");
        let replaced = node
            .replace("size", ValueNode::new(Value::Decimal(1.5)))
            .expect("replace");
        let record = replaced.ty().as_record().expect("record type");
        assert_eq!(record.name(), "Quote");
        assert_eq!(
            record.field("size").and_then(|f| f.ty.as_native()),
            Some(NativeType::Decimal)
        );
    }

    #[test]
    fn unchanged_record_keeps_shared_type() {
        let ty = quote_type();
        let node = RecordNode::new(&ty).expect("record");
        let replaced = node
            .replace("size", ValueNode::new(Value::Integer(7)))
            .expect("replace");
        assert!(Arc::ptr_eq(replaced.ty(), &ty));
    }

    #[test]
    fn query_projects_field_type() {
        let record = RecordNode::new(&quote_type()).expect("record");
        let query = QueryNode::new(record, "price").expect("query");
        assert_eq!(query.ty().as_native(), Some(NativeType::Money));
        assert_eq!(QueryNode::field(&query), Some("price"));
        assert_eq!(query.child(0).map(CanvasNode::name), Some(QUERY_INPUT));
    }

    #[test]
    fn query_on_missing_field_fails() {
        let record = RecordNode::new(&quote_type()).expect("record");
        assert!(matches!(
            QueryNode::new(record, "volume"),
            Err(CanvasError::FieldNotFound(_))
        ));
    }
}
