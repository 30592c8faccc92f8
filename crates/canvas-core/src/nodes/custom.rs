use crate::node::{CanvasNode, NodeKind};
use crate::types::{CanvasError, CanvasType};
use std::sync::Arc;

/// User-defined composites.
///
/// The first slot is the result and gives the node its type. Slot names
/// may contain dots; a dotted name that matches no slot resolves as an
/// alias into the nested descendant it spells out.
pub struct CustomNode;

impl CustomNode {
    pub fn new(
        text: impl Into<String>,
        slots: Vec<(String, CanvasNode)>,
    ) -> Result<CanvasNode, CanvasError> {
        let ty = slots
            .first()
            .map_or_else(CanvasType::any, |(_, node)| Arc::clone(node.ty()));
        let mut node = CanvasNode::new(NodeKind::Custom, ty, text);
        for (name, child) in slots {
            node.add_child(name, child)?;
        }
        Ok(node)
    }

    pub fn add_slot(
        node: &CanvasNode,
        name: &str,
        child: CanvasNode,
    ) -> Result<CanvasNode, CanvasError> {
        let mut result = editable(node)?;
        result.add_child(name, child)?;
        result.derive_type()?;
        Ok(result)
    }

    pub fn rename_slot(
        node: &CanvasNode,
        name: &str,
        new_name: &str,
    ) -> Result<CanvasNode, CanvasError> {
        let mut result = editable(node)?;
        result.rename_child(name, new_name)?;
        Ok(result)
    }

    pub fn remove_slot(node: &CanvasNode, name: &str) -> Result<CanvasNode, CanvasError> {
        let mut result = editable(node)?;
        result.remove_child(name)?;
        result.derive_type()?;
        Ok(result)
    }
}

fn editable(node: &CanvasNode) -> Result<CanvasNode, CanvasError> {
    match node.kind() {
        NodeKind::Custom => Ok(node.clone()),
        other => Err(CanvasError::InvalidOperation(format!(
            "{} has no editable slots",
            other.name()
        ))),
    }
}
