//! # Function Nodes
//!
//! Operators and function calls described by a list of signatures.
//!
//! The declared signatures are kept on the node. The node's type is the
//! union of the return types of every signature its current arguments can
//! still satisfy, so it narrows as arguments are replaced and widens back
//! when they are reset.

use super::make_default_canvas_node;
use crate::node::{CanvasNode, NodeKind, Signature};
use crate::types::{CanvasError, CanvasType, is_compatible};
use std::sync::Arc;

pub struct FunctionNode;

impl FunctionNode {
    /// Define a function node from its parameter names and signatures.
    ///
    /// Each parameter child is the default node of the union of that
    /// parameter's types across all signatures.
    pub fn define(
        text: impl Into<String>,
        parameters: &[&str],
        signatures: Vec<Signature>,
    ) -> Result<CanvasNode, CanvasError> {
        let text = text.into();
        if signatures.is_empty() {
            return Err(CanvasError::InvalidOperation(format!(
                "{} declares no signatures",
                text
            )));
        }
        if let Some(signature) = signatures
            .iter()
            .find(|signature| signature.parameters.len() != parameters.len())
        {
            return Err(CanvasError::InvalidOperation(format!(
                "{} expects {} parameters, signature has {}",
                text,
                parameters.len(),
                signature.parameters.len()
            )));
        }
        let return_type = CanvasType::union(
            None,
            signatures
                .iter()
                .map(|signature| Arc::clone(&signature.return_type)),
        );
        let parameter_types: Vec<Arc<CanvasType>> = (0..parameters.len())
            .map(|index| parameter_type(signatures.iter(), index))
            .collect();
        let mut node = CanvasNode::new(NodeKind::Function { signatures }, return_type, text);
        for (name, ty) in parameters.iter().zip(&parameter_types) {
            node.add_child(*name, make_default_canvas_node(ty))?;
        }
        derive_type(&mut node)?;
        Ok(node)
    }

    /// The declared signatures of a function node.
    #[must_use]
    pub fn signatures(node: &CanvasNode) -> &[Signature] {
        match node.kind() {
            NodeKind::Function { signatures } => signatures,
            _ => &[],
        }
    }
}

fn parameter_type<'a>(
    signatures: impl Iterator<Item = &'a Signature>,
    index: usize,
) -> Arc<CanvasType> {
    CanvasType::union(
        None,
        signatures.filter_map(|signature| signature.parameters.get(index).cloned()),
    )
}

/// Recompute the return type from the signatures the arguments satisfy.
pub(crate) fn derive_type(node: &mut CanvasNode) -> Result<(), CanvasError> {
    let NodeKind::Function { signatures } = &node.kind else {
        return Ok(());
    };
    let returns: Vec<Arc<CanvasType>> = signatures
        .iter()
        .filter(|signature| signature.matches(node.children()))
        .map(|signature| Arc::clone(&signature.return_type))
        .collect();
    if returns.is_empty() {
        let arguments: Vec<String> = node.children().map(|child| child.ty().name()).collect();
        return Err(CanvasError::TypeIncompatible {
            from: format!("({})", arguments.join(", ")),
            to: node.text.clone(),
        });
    }
    node.ty = CanvasType::union(None, returns);
    Ok(())
}

/// Narrow a function so that it evaluates to `target`, converting its
/// arguments to the parameter types of the remaining signatures.
///
/// Returns `None` when no signature can produce `target`.
pub(crate) fn narrow(
    node: &CanvasNode,
    target: &Arc<CanvasType>,
) -> Result<Option<CanvasNode>, CanvasError> {
    let selected: Vec<&Signature> = FunctionNode::signatures(node)
        .iter()
        .filter(|signature| {
            is_compatible(target, &signature.return_type) && signature.matches(node.children())
        })
        .collect();
    if selected.is_empty() {
        return Ok(None);
    }
    let mut result = node.clone();
    for (index, argument) in node.children().enumerate() {
        let parameter = parameter_type(selected.iter().copied(), index);
        if is_compatible(&parameter, argument.ty()) {
            continue;
        }
        match argument.convert(&parameter) {
            Ok(converted) => result.set_child(index, converted)?,
            Err(error) if error.is_type_incompatible() => return Ok(None),
            Err(error) => return Err(error),
        }
    }
    result.derive_type()?;
    if is_compatible(target, result.ty()) {
        Ok(Some(result))
    } else {
        Ok(None)
    }
}
