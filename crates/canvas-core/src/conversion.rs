//! # Node Conversion
//!
//! Coercing a node so that it evaluates to a requested type.
//!
//! Conversion is tried in order:
//!
//! 1. A node whose type is already compatible is returned unchanged.
//! 2. The node's own coercion (literal widening, retyping references and
//!    placeholders, narrowing function signatures, converting a custom
//!    node's result slot).
//! 3. Conversion to the intersection of both types, when the target
//!    accepts it.
//! 4. For record-typed nodes, a query projecting the first field whose
//!    type the target accepts.
//!
//! Anything else is a `TypeIncompatible` error.

use crate::node::{CanvasNode, NodeKind};
use crate::nodes::function::narrow;
use crate::nodes::record::QUERY_INPUT;
use crate::nodes::reference::relink;
use crate::nodes::value::{retype, widen};
use crate::nodes::{QueryNode, make_default_canvas_node};
use crate::types::{CanvasError, CanvasType, intersection, is_compatible};
use std::sync::Arc;

impl CanvasNode {
    /// A node equivalent to this one that evaluates to `target`.
    pub fn convert(&self, target: &Arc<CanvasType>) -> Result<CanvasNode, CanvasError> {
        if is_compatible(target, &self.ty) {
            return Ok(self.clone());
        }
        if let Some(coerced) = self.coerce(target)? {
            tracing::trace!(kind = self.kind.name(), to = %target, "coerced");
            return Ok(coerced);
        }
        if let Some(common) = intersection(&self.ty, target) {
            if common != *target && is_compatible(target, &common) {
                match self.convert(&common) {
                    Ok(converted) => return Ok(converted),
                    Err(error) if error.is_type_incompatible() => {}
                    Err(error) => return Err(error),
                }
            }
        }
        if let Some(record) = self.ty.as_record() {
            if let Some(field) = record
                .fields()
                .iter()
                .find(|field| is_compatible(target, &field.ty))
            {
                tracing::trace!(field = %field.name, to = %target, "projecting record field");
                let mut query = QueryNode::new(relink(self, QUERY_INPUT), &field.name)?;
                query.name.clone_from(&self.name);
                return Ok(query);
            }
        }
        Err(CanvasError::incompatible(&self.ty, target))
    }

    fn coerce(&self, target: &Arc<CanvasType>) -> Result<Option<CanvasNode>, CanvasError> {
        match &self.kind {
            NodeKind::Value(_) => Ok(widen(self, target)),
            NodeKind::Reference { .. } | NodeKind::None => Ok(Some(retype(self, target))),
            NodeKind::Function { .. } => narrow(self, target),
            NodeKind::Custom => {
                let Some(result) = self.child(0) else {
                    return Ok(None);
                };
                match result.convert(target) {
                    Ok(converted) => self.replace_child(0, converted).map(Some),
                    Err(error) if error.is_type_incompatible() => Ok(None),
                    Err(error) => Err(error),
                }
            }
            NodeKind::Record
            | NodeKind::Query { .. }
            | NodeKind::Proxy { .. }
            | NodeKind::SingleOrderTask => Ok(None),
        }
    }
}

/// Convert `node` to `ty`; a `NoneNode` always becomes the type's default
/// node.
pub fn convert(node: &CanvasNode, ty: &Arc<CanvasType>) -> Result<CanvasNode, CanvasError> {
    if matches!(node.kind(), NodeKind::None) {
        let mut default = make_default_canvas_node(ty);
        default.name.clone_from(&node.name);
        return Ok(default);
    }
    node.convert(ty)
}

/// Convert `node` to `ty`, falling back to the type's default node when no
/// conversion exists.
pub fn force_conversion(node: &CanvasNode, ty: &Arc<CanvasType>) -> Result<CanvasNode, CanvasError> {
    match convert(node, ty) {
        Err(error) if error.is_type_incompatible() => {
            let mut default = make_default_canvas_node(ty);
            default.name.clone_from(&node.name);
            Ok(default)
        }
        result => result,
    }
}

// =============================================================================
// TESTS
// =============================================================================
