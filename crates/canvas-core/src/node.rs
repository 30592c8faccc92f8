//! # Canvas Nodes
//!
//! The immutable expression-tree node.
//!
//! A `CanvasNode` owns its children through `Arc` slots. Nodes are never
//! edited once attached: every setter below returns a new node, and the
//! parent's slot is swapped by the builder. Sibling subtrees stay shared
//! between the old and the new tree.
//!
//! Parents are not stored in the node. A node's position inside a tree is
//! carried by a `NodeRef` (see `navigation`).

use crate::types::{CanvasError, CanvasType, Value, intersection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Meta-data values reuse the literal value type.
pub type MetaData = Value;

// =============================================================================
// NODE KINDS
// =============================================================================

/// One call signature of a function node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub parameters: Vec<Arc<CanvasType>>,
    pub return_type: Arc<CanvasType>,
}

impl Signature {
    #[must_use]
    pub fn new(parameters: Vec<Arc<CanvasType>>, return_type: Arc<CanvasType>) -> Self {
        Self {
            parameters,
            return_type,
        }
    }

    /// A signature matches when every argument could still take a type the
    /// corresponding parameter admits.
    pub(crate) fn matches<'a>(&self, arguments: impl Iterator<Item = &'a CanvasNode>) -> bool {
        self.parameters
            .iter()
            .zip(arguments)
            .all(|(parameter, argument)| intersection(parameter, argument.ty()).is_some())
    }
}

/// The closed set of node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A literal value.
    Value(Value),
    /// An operator or function call built from a list of signatures.
    Function { signatures: Vec<Signature> },
    /// One child per field of a record type.
    Record,
    /// Projects one field out of its record-typed input.
    Query { field: String },
    /// A user-defined composite; its first slot is the result.
    Custom,
    /// A symbolic pointer to another node of the same tree.
    Reference { referent: String },
    /// A frozen pointer whose type never follows its referent.
    Proxy { referent: String },
    /// A single order submission.
    SingleOrderTask,
    /// The absent-value placeholder.
    None,
}

impl NodeKind {
    /// Registry key of this kind, used by the clipboard format.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Value(_) => "ValueNode",
            Self::Function { .. } => "FunctionNode",
            Self::Record => "RecordNode",
            Self::Query { .. } => "QueryNode",
            Self::Custom => "CustomNode",
            Self::Reference { .. } => "ReferenceNode",
            Self::Proxy { .. } => "ProxyNode",
            Self::SingleOrderTask => "SingleOrderTaskNode",
            Self::None => "NoneNode",
        }
    }
}

// =============================================================================
// CANVAS NODE
// =============================================================================

/// One node of an expression tree.
#[derive(Debug, Clone)]
pub struct CanvasNode {
    pub(crate) kind: NodeKind,
    pub(crate) ty: Arc<CanvasType>,
    pub(crate) text: String,
    pub(crate) name: String,
    pub(crate) children: Vec<Arc<CanvasNode>>,
    pub(crate) visible: bool,
    pub(crate) read_only: bool,
    pub(crate) meta_data: BTreeMap<String, MetaData>,
}

impl CanvasNode {
    /// Create a detached node with no children.
    pub(crate) fn new(kind: NodeKind, ty: Arc<CanvasType>, text: impl Into<String>) -> Self {
        Self {
            kind,
            ty,
            text: text.into(),
            name: String::new(),
            children: Vec::new(),
            visible: true,
            read_only: false,
            meta_data: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The type this node evaluates to.
    #[must_use]
    pub fn ty(&self) -> &Arc<CanvasType> {
        &self.ty
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The name this node was given by its parent.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = &CanvasNode> + DoubleEndedIterator {
        self.children.iter().map(Arc::as_ref)
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<&CanvasNode> {
        self.children.get(index).map(Arc::as_ref)
    }

    /// The shared slot holding a child, for identity checks.
    #[must_use]
    pub fn child_slot(&self, index: usize) -> Option<&Arc<CanvasNode>> {
        self.children.get(index)
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|child| child.name == name)
    }

    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&CanvasNode> {
        self.child_index(name).and_then(|index| self.child(index))
    }

    /// This node's own visibility flag (see `NodeRef::is_visible` for the
    /// inherited value).
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// This node's own read-only flag (see `NodeRef::is_read_only` for the
    /// inherited value).
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn find_meta_data(&self, name: &str) -> Option<&MetaData> {
        self.meta_data.get(name)
    }

    #[must_use]
    pub fn meta_data(&self) -> &BTreeMap<String, MetaData> {
        &self.meta_data
    }

    /// The literal held by a value node.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            NodeKind::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The path held by a reference or proxy node.
    #[must_use]
    pub fn referent(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Reference { referent } | NodeKind::Proxy { referent } => Some(referent),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Functional setters
    // -------------------------------------------------------------------------

    /// A copy of this node with the given visibility.
    #[must_use]
    pub fn set_visible(&self, visible: bool) -> CanvasNode {
        let mut node = self.clone();
        node.visible = visible;
        node
    }

    /// A copy of this node with the given read-only flag.
    #[must_use]
    pub fn set_read_only(&self, read_only: bool) -> CanvasNode {
        let mut node = self.clone();
        node.read_only = read_only;
        node
    }

    #[must_use]
    pub fn set_meta_data(&self, name: impl Into<String>, value: MetaData) -> CanvasNode {
        let mut node = self.clone();
        node.meta_data.insert(name.into(), value);
        node
    }

    #[must_use]
    pub fn delete_meta_data(&self, name: &str) -> CanvasNode {
        let mut node = self.clone();
        node.meta_data.remove(name);
        node
    }

    /// A copy of this node with a new display text.
    #[must_use]
    pub fn rename(&self, text: impl Into<String>) -> CanvasNode {
        let mut node = self.clone();
        node.text = text.into();
        node
    }

    /// A copy of this node whose named child has been replaced.
    pub fn replace(&self, child: &str, replacement: CanvasNode) -> Result<CanvasNode, CanvasError> {
        let index = self
            .child_index(child)
            .ok_or_else(|| CanvasError::ChildNotFound(child.to_string()))?;
        self.replace_child(index, replacement)
    }

    /// A copy of this node whose child at `index` has been replaced.
    ///
    /// The replacement takes over the slot's name and the node re-derives
    /// its type from the new children.
    pub fn replace_child(
        &self,
        index: usize,
        replacement: CanvasNode,
    ) -> Result<CanvasNode, CanvasError> {
        let mut node = self.clone();
        node.set_child(index, replacement)?;
        node.derive_type()?;
        Ok(node)
    }

    // -------------------------------------------------------------------------
    // Construction primitives
    // -------------------------------------------------------------------------

    /// Append a child under a name unique among its siblings.
    pub(crate) fn add_child(
        &mut self,
        name: impl Into<String>,
        mut child: CanvasNode,
    ) -> Result<(), CanvasError> {
        let name = name.into();
        if self.child_index(&name).is_some() {
            return Err(CanvasError::DuplicateChild(name));
        }
        child.name = name;
        self.children.push(Arc::new(child));
        Ok(())
    }

    /// Overwrite the slot at `index`, keeping the slot's name.
    pub(crate) fn set_child(
        &mut self,
        index: usize,
        mut child: CanvasNode,
    ) -> Result<(), CanvasError> {
        let slot = self
            .children
            .get_mut(index)
            .ok_or_else(|| CanvasError::ChildNotFound(index.to_string()))?;
        child.name = slot.name.clone();
        *slot = Arc::new(child);
        Ok(())
    }

    pub(crate) fn rename_child(&mut self, name: &str, new_name: &str) -> Result<(), CanvasError> {
        let index = self
            .child_index(name)
            .ok_or_else(|| CanvasError::ChildNotFound(name.to_string()))?;
        if name != new_name && self.child_index(new_name).is_some() {
            return Err(CanvasError::DuplicateChild(new_name.to_string()));
        }
        if let Some(slot) = self.children.get_mut(index) {
            Arc::make_mut(slot).name = new_name.to_string();
        }
        Ok(())
    }

    pub(crate) fn remove_child(&mut self, name: &str) -> Result<(), CanvasError> {
        let index = self
            .child_index(name)
            .ok_or_else(|| CanvasError::ChildNotFound(name.to_string()))?;
        self.children.remove(index);
        Ok(())
    }

    /// Recompute this node's type from its children.
    pub(crate) fn derive_type(&mut self) -> Result<(), CanvasError> {
        match &self.kind {
            NodeKind::Function { .. } => crate::nodes::function::derive_type(self),
            NodeKind::Record => {
                crate::nodes::record::derive_record_type(self);
                Ok(())
            }
            NodeKind::Query { .. } => crate::nodes::record::derive_query_type(self),
            NodeKind::Custom => {
                if let Some(result) = self.children.first() {
                    self.ty = Arc::clone(&result.ty);
                }
                Ok(())
            }
            NodeKind::Value(_)
            | NodeKind::Reference { .. }
            | NodeKind::Proxy { .. }
            | NodeKind::SingleOrderTask
            | NodeKind::None => Ok(()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{CustomNode, ValueNode};
    use crate::types::NativeType;

    fn pair() -> CanvasNode {
        CustomNode::new(
            "Pair",
            vec![
                ("left".to_string(), ValueNode::new(Value::Integer(1))),
                ("right".to_string(), ValueNode::new(Value::Integer(2))),
            ],
        )
        .expect("custom node")
    }

    #[test]
    fn setters_return_new_nodes() {
        let node = ValueNode::new(Value::Integer(3));
        let hidden = node.set_visible(false);
        assert!(node.is_visible());
        assert!(!hidden.is_visible());

        let locked = node.set_read_only(true);
        assert!(locked.is_read_only());
        assert!(!node.is_read_only());

        let tagged = node.set_meta_data("uuid", Value::Text("abc".into()));
        assert_eq!(
            tagged.find_meta_data("uuid"),
            Some(&Value::Text("abc".into()))
        );
        assert!(node.find_meta_data("uuid").is_none());
        assert!(tagged.delete_meta_data("uuid").meta_data().is_empty());
    }

    #[test]
    fn replace_keeps_slot_name_and_shares_siblings() {
        let node = pair();
        let replaced = node
            .replace("left", ValueNode::new(Value::Integer(10)))
            .expect("replace");

        assert_eq!(replaced.child(0).map(CanvasNode::name), Some("left"));
        assert_eq!(
            replaced.child(0).and_then(CanvasNode::value),
            Some(&Value::Integer(10))
        );
        let before = node.child_slot(1).expect("right");
        let after = replaced.child_slot(1).expect("right");
        assert!(Arc::ptr_eq(before, after));
    }

    #[test]
    fn replace_missing_child_fails() {
        let result = pair().replace("middle", ValueNode::new(Value::Integer(0)));
        assert!(matches!(result, Err(CanvasError::ChildNotFound(_))));
    }

    #[test]
    fn duplicate_child_rejected() {
        let mut node = pair();
        let result = node.add_child("left", ValueNode::new(Value::Boolean(true)));
        assert!(matches!(result, Err(CanvasError::DuplicateChild(_))));
    }

    #[test]
    fn custom_type_follows_first_slot() {
        let node = pair()
            .replace("left", ValueNode::new(Value::Text("x".into())))
            .expect("replace");
        assert_eq!(node.ty().as_native(), Some(NativeType::Text));
    }

    #[test]
    fn kind_names_are_registry_keys() {
        assert_eq!(pair().kind().name(), "CustomNode");
        assert_eq!(ValueNode::new(Value::Integer(0)).kind().name(), "ValueNode");
    }
}
