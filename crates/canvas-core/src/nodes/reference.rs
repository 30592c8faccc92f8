//! # Reference and Proxy Nodes
//!
//! Nodes that point at another node of the same tree by relative path.
//! A reference carries a declared type that reference resolution keeps in
//! line with its referent; a proxy's type is frozen when it is created.

use crate::navigation::NodeRef;
use crate::node::{CanvasNode, NodeKind};
use crate::path::{CanvasPath, find_node};
use crate::types::CanvasType;
use std::sync::Arc;

pub struct ReferenceNode;

impl ReferenceNode {
    /// A reference of type `Any`.
    #[must_use]
    pub fn new(referent: &CanvasPath) -> CanvasNode {
        Self::with_type(referent, CanvasType::any())
    }

    #[must_use]
    pub fn with_type(referent: &CanvasPath, ty: Arc<CanvasType>) -> CanvasNode {
        let path = referent.to_string();
        CanvasNode::new(
            NodeKind::Reference {
                referent: path.clone(),
            },
            ty,
            path,
        )
    }

    /// The node a located reference or proxy points at, if its path still
    /// resolves.
    #[must_use]
    pub fn find_referent<'a>(reference: &NodeRef<'a>) -> Option<NodeRef<'a>> {
        let path = CanvasPath::parse(reference.referent()?).ok()?;
        find_node(&path, reference)
    }
}

pub struct ProxyNode;

impl ProxyNode {
    #[must_use]
    pub fn new(referent: &CanvasPath, ty: Arc<CanvasType>) -> CanvasNode {
        let path = referent.to_string();
        CanvasNode::new(
            NodeKind::Proxy {
                referent: path.clone(),
            },
            ty,
            path,
        )
    }

    /// Turn a located reference into a proxy typed after its current
    /// referent. Returns `None` for non-references and dangling paths.
    #[must_use]
    pub fn freeze(reference: &NodeRef<'_>) -> Option<CanvasNode> {
        let NodeKind::Reference { referent } = reference.kind() else {
            return None;
        };
        let target = ReferenceNode::find_referent(reference)?;
        let mut proxy = reference.node().clone();
        proxy.kind = NodeKind::Proxy {
            referent: referent.clone(),
        };
        proxy.ty = Arc::clone(target.ty());
        Some(proxy)
    }
}

/// Rewrite the references inside `node` so they still resolve once `node`
/// is moved one level down, into the slot `slot` of a new parent that
/// takes over its old name.
///
/// Only paths escaping `node` change. Subtrees without such paths stay
/// shared.
pub(crate) fn relink(node: &CanvasNode, slot: &str) -> CanvasNode {
    relink_at(node, node.name(), slot, 0).unwrap_or_else(|| node.clone())
}

fn relink_at(node: &CanvasNode, wrapped: &str, slot: &str, depth: usize) -> Option<CanvasNode> {
    let mut changed = None;
    if let Some(path) = node
        .referent()
        .and_then(|referent| CanvasPath::parse(referent).ok())
        .filter(|path| path.ups() > depth)
    {
        let mut segments = path.segments().to_vec();
        if path.ups() == depth + 1 && segments.first().is_some_and(|first| first == wrapped) {
            segments.insert(1, slot.to_string());
        }
        let mut relinked = node.clone();
        set_referent(
            &mut relinked,
            CanvasPath::new(path.ups() + 1, segments).to_string(),
        );
        changed = Some(relinked);
    }
    for (index, child) in node.children().enumerate() {
        if let Some(relinked) = relink_at(child, wrapped, slot, depth + 1) {
            let parent = changed.get_or_insert_with(|| node.clone());
            if let Some(entry) = parent.children.get_mut(index) {
                *entry = Arc::new(relinked);
            }
        }
    }
    changed
}

fn set_referent(node: &mut CanvasNode, path: String) {
    if let NodeKind::Reference { referent } | NodeKind::Proxy { referent } = &mut node.kind {
        referent.clone_from(&path);
    }
    node.text = path;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{CustomNode, ValueNode};
    use crate::types::{NativeType, Value};

    fn path(text: &str) -> CanvasPath {
        CanvasPath::parse(text).expect("path")
    }

    fn tree() -> CanvasNode {
        CustomNode::new(
            "Root",
            vec![
                ("price".to_string(), ValueNode::new(Value::Integer(5))),
                ("copy".to_string(), ReferenceNode::new(&path("<price"))),
            ],
        )
        .expect("root")
    }

    #[test]
    fn reference_text_is_its_path() {
        let node = ReferenceNode::new(&path("<<a.b"));
        assert_eq!(node.text(), "<<a.b");
        assert_eq!(node.referent(), Some("<<a.b"));
        assert_eq!(node.ty().name(), "Any");
    }

    #[test]
    fn finds_sibling_referent() {
        let root = tree();
        let reference = NodeRef::locate(&root, &[1]).expect("reference");
        let referent = ReferenceNode::find_referent(&reference).expect("referent");
        assert_eq!(referent.position(), [0]);
    }

    #[test]
    fn dangling_reference_has_no_referent() {
        let root = CustomNode::new(
            "Root",
            vec![("r".to_string(), ReferenceNode::new(&path("<missing")))],
        )
        .expect("root");
        let reference = NodeRef::locate(&root, &[0]).expect("reference");
        assert!(ReferenceNode::find_referent(&reference).is_none());
    }

    #[test]
    fn freeze_takes_referent_type() {
        let root = tree();
        let reference = NodeRef::locate(&root, &[1]).expect("reference");
        let proxy = ProxyNode::freeze(&reference).expect("proxy");
        assert!(matches!(proxy.kind(), NodeKind::Proxy { .. }));
        assert_eq!(proxy.ty().as_native(), Some(NativeType::Integer));
        assert_eq!(proxy.name(), "copy");
        assert!(ProxyNode::freeze(&NodeRef::locate(&root, &[0]).expect("value")).is_none());
    }

    #[test]
    fn relink_raises_escaping_paths_only() {
        let mut inner = CustomNode::new(
            "Inner",
            vec![
                ("x".to_string(), ValueNode::new(Value::Integer(1))),
                ("local".to_string(), ReferenceNode::new(&path("<x"))),
                ("outer".to_string(), ReferenceNode::new(&path("<<price"))),
                ("self".to_string(), ReferenceNode::new(&path("<<inner.x"))),
            ],
        )
        .expect("inner");
        inner.name = "inner".to_string();
        let relinked = relink(&inner, "record");
        let referents: Vec<_> = relinked
            .children()
            .filter_map(CanvasNode::referent)
            .collect();
        assert_eq!(referents, vec!["<x", "<<<price", "<<<inner.record.x"]);
        assert!(Arc::ptr_eq(
            relinked.child_slot(0).expect("x"),
            inner.child_slot(0).expect("x")
        ));
    }
}
