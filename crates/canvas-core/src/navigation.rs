//! # Tree Navigation
//!
//! Located nodes and the ancestry queries built on them.
//!
//! Nodes do not know their parent. A `NodeRef` pairs a node with the tree
//! it was reached from and the child indices leading to it, so the parent
//! chain is recovered by walking the position back toward the root. Two
//! `NodeRef`s are the same node when they share the tree instance and the
//! position.

use crate::node::CanvasNode;
use crate::path::CanvasPath;
use std::collections::VecDeque;
use std::ops::Deref;
use std::ptr;

// =============================================================================
// NODE REF
// =============================================================================

/// A node located inside a tree.
#[derive(Debug, Clone)]
pub struct NodeRef<'a> {
    tree: &'a CanvasNode,
    node: &'a CanvasNode,
    position: Vec<usize>,
}

impl<'a> NodeRef<'a> {
    /// The root of `tree`.
    #[must_use]
    pub fn root(tree: &'a CanvasNode) -> Self {
        Self {
            tree,
            node: tree,
            position: Vec::new(),
        }
    }

    /// The node reached from `tree` by following child indices.
    #[must_use]
    pub fn locate(tree: &'a CanvasNode, position: &[usize]) -> Option<Self> {
        let mut node = tree;
        for &index in position {
            node = node.child(index)?;
        }
        Some(Self {
            tree,
            node,
            position: position.to_vec(),
        })
    }

    #[must_use]
    pub fn node(&self) -> &'a CanvasNode {
        self.node
    }

    /// The root this node was located from.
    #[must_use]
    pub fn tree(&self) -> &'a CanvasNode {
        self.tree
    }

    /// Child indices from the root down to this node.
    #[must_use]
    pub fn position(&self) -> &[usize] {
        &self.position
    }

    /// Number of edges between the root and this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.position.len()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let (_, up) = self.position.split_last()?;
        Self::locate(self.tree, up)
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        let node = self.node.child(index)?;
        let mut position = self.position.clone();
        position.push(index);
        Some(Self {
            tree: self.tree,
            node,
            position,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        (0..self.node.child_count()).filter_map(|index| self.child(index))
    }

    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<NodeRef<'a>> {
        self.node
            .child_index(name)
            .and_then(|index| self.child(index))
    }

    /// Walks from this node up to the root, this node first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a CanvasNode> + '_ {
        let tree = self.tree;
        (0..=self.position.len())
            .rev()
            .filter_map(move |depth| Self::locate(tree, &self.position[..depth]))
            .map(|located| located.node)
    }

    /// Visible only when this node and every ancestor are visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.ancestors().all(CanvasNode::is_visible)
    }

    /// Read-only when this node or any ancestor is read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.ancestors().any(CanvasNode::is_read_only)
    }

    fn same_tree(&self, other: &NodeRef<'_>) -> bool {
        ptr::eq(self.tree, other.tree)
    }
}

impl Deref for NodeRef<'_> {
    type Target = CanvasNode;

    fn deref(&self) -> &CanvasNode {
        self.node
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.same_tree(other) && self.position == other.position
    }
}

impl Eq for NodeRef<'_> {}

// =============================================================================
// ANCESTRY QUERIES
// =============================================================================

#[must_use]
pub fn is_root(node: &NodeRef<'_>) -> bool {
    node.position.is_empty()
}

#[must_use]
pub fn get_root<'a>(node: &NodeRef<'a>) -> NodeRef<'a> {
    NodeRef::root(node.tree)
}

/// The dotted name of `node` below its root; empty for the root.
#[must_use]
pub fn get_full_name(node: &NodeRef<'_>) -> String {
    CanvasPath::from_node(node).to_string()
}

/// True iff `ancestor` is a strict ancestor of `node`.
#[must_use]
pub fn is_parent(ancestor: &NodeRef<'_>, node: &NodeRef<'_>) -> bool {
    ancestor.same_tree(node)
        && ancestor.depth() < node.depth()
        && node.position.starts_with(&ancestor.position)
}

/// Signed edge count from `from` down to `to`.
///
/// Positive when `from` is an ancestor of `to`, negative in the reverse
/// case, zero for the same node, `None` when neither contains the other.
#[must_use]
pub fn get_height(from: &NodeRef<'_>, to: &NodeRef<'_>) -> Option<isize> {
    if from == to {
        Some(0)
    } else if is_parent(from, to) {
        Some((to.depth() - from.depth()) as isize)
    } else if is_parent(to, from) {
        get_height(to, from).map(|height| -height)
    } else {
        None
    }
}

/// The deepest node containing both `a` and `b`.
///
/// The deeper node is walked up until both sit at the same depth, then
/// both are walked up in lockstep until they meet. `None` when the nodes
/// belong to different trees.
#[must_use]
pub fn get_common_ancestor<'a>(a: &NodeRef<'a>, b: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !a.same_tree(b) {
        return None;
    }
    let mut left = a.clone();
    let mut right = b.clone();
    while left.depth() > right.depth() {
        left = left.parent()?;
    }
    while right.depth() > left.depth() {
        right = right.parent()?;
    }
    while left != right {
        left = left.parent()?;
        right = right.parent()?;
    }
    Some(left)
}

/// A relative path that leads from `source` to `destination`.
///
/// One `<` per level from `source` up to the common ancestor, then the
/// child names from there down to `destination`.
#[must_use]
pub fn get_path(source: &NodeRef<'_>, destination: &NodeRef<'_>) -> Option<CanvasPath> {
    let common = get_common_ancestor(source, destination)?;
    let ups = source.depth() - common.depth();
    let absolute = CanvasPath::from_node(destination);
    let segments = absolute
        .segments()
        .get(common.depth()..)
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    Some(CanvasPath::new(ups, segments))
}

// =============================================================================
// TRAVERSAL
// =============================================================================

/// Level-order iterator over a subtree.
pub struct BreadthFirst<'a> {
    queue: VecDeque<NodeRef<'a>>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children());
        Some(node)
    }
}

/// Visit `start` and its descendants level by level.
#[must_use]
pub fn breadth_first<'a>(start: &NodeRef<'a>) -> BreadthFirst<'a> {
    BreadthFirst {
        queue: VecDeque::from([start.clone()]),
    }
}

// =============================================================================
// TESTS
// =============================================================================
