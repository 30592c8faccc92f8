use crate::node::{CanvasNode, NodeKind};
use crate::types::{CanvasType, Value, is_compatible};
use std::sync::Arc;

/// Literal value nodes.
pub struct ValueNode;

impl ValueNode {
    #[must_use]
    pub fn new(value: Value) -> CanvasNode {
        let ty = CanvasType::native(value.native_type());
        let text = value.to_string();
        CanvasNode::new(NodeKind::Value(value), ty, text)
    }
}

/// The absent-value placeholder.
pub struct NoneNode;

impl NoneNode {
    #[must_use]
    pub fn new(ty: Arc<CanvasType>) -> CanvasNode {
        CanvasNode::new(NodeKind::None, ty, "None")
    }
}

/// Widen a value node's literal into `target`, keeping its flags and
/// meta-data.
pub(crate) fn widen(node: &CanvasNode, target: &CanvasType) -> Option<CanvasNode> {
    let value = node.value()?;
    let widened = value
        .widenings()
        .into_iter()
        .find(|candidate| is_compatible(target, &CanvasType::native(candidate.native_type())))?;
    let mut result = node.clone();
    result.ty = CanvasType::native(widened.native_type());
    result.text = widened.to_string();
    result.kind = NodeKind::Value(widened);
    Some(result)
}

/// Retype a placeholder or reference, keeping everything else.
pub(crate) fn retype(node: &CanvasNode, target: &Arc<CanvasType>) -> CanvasNode {
    let mut result = node.clone();
    result.ty = Arc::clone(target);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NativeType;

    #[test]
    fn value_node_text_is_literal() {
        let node = ValueNode::new(Value::Integer(42));
        assert_eq!(node.text(), "42");
        assert_eq!(node.ty().as_native(), Some(NativeType::Integer));
    }

    #[test]
    fn widen_integer_keeps_flags() {
        let node = ValueNode::new(Value::Integer(2)).set_read_only(true);
        let widened =
            widen(&node, &CanvasType::native(NativeType::Decimal)).expect("widen to decimal");
        assert_eq!(widened.value(), Some(&Value::Decimal(2.0)));
        assert!(widened.is_read_only());
        assert!(widen(&node, &CanvasType::native(NativeType::Text)).is_none());
    }
}
