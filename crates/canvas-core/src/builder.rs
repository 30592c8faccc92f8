//! # Canvas Node Builder
//!
//! Copy-on-write edit session over an immutable tree.
//!
//! Every operation resolves its path against the builder's current working
//! tree, computes a replacement for the addressed node and commits it. A
//! commit clones each ancestor of the edited node exactly once, from the
//! root down, and swaps the one child slot on the edit path; every other
//! subtree is shared with the previous tree.

use crate::navigation::NodeRef;
use crate::node::{CanvasNode, MetaData};
use crate::nodes::make_default_canvas_node;
use crate::path::{CanvasPath, get_node};
use crate::types::{CanvasError, CanvasType, is_compatible};
use std::sync::Arc;

/// An edit session producing new trees from an initial one.
#[derive(Debug, Clone)]
pub struct CanvasNodeBuilder {
    root: CanvasNode,
}

impl CanvasNodeBuilder {
    /// Start a session on a copy of `node`.
    #[must_use]
    pub fn new(node: &CanvasNode) -> Self {
        Self { root: node.clone() }
    }

    /// A copy of the current working tree.
    #[must_use]
    pub fn make(&self) -> CanvasNode {
        self.root.clone()
    }

    /// The current working tree.
    #[must_use]
    pub fn node(&self) -> &CanvasNode {
        &self.root
    }

    /// Finish the session, returning the working tree.
    #[must_use]
    pub fn into_node(self) -> CanvasNode {
        self.root
    }

    /// Convert the node at `path` to `ty`; no-op when it is already
    /// compatible.
    pub fn convert(&mut self, path: &CanvasPath, ty: &Arc<CanvasType>) -> Result<(), CanvasError> {
        let (position, node) = self.locate(path)?;
        if is_compatible(ty, node.ty()) {
            return Ok(());
        }
        let converted = node.convert(ty)?;
        self.commit(&position, converted)
    }

    /// Convert the node at `path` to `ty`, substituting the type's default
    /// node when no conversion exists.
    pub fn force_convert(
        &mut self,
        path: &CanvasPath,
        ty: &Arc<CanvasType>,
    ) -> Result<(), CanvasError> {
        match self.convert(path, ty) {
            Err(error) if error.is_type_incompatible() => {
                tracing::debug!(%path, to = %ty, "conversion failed, substituting default");
                let (position, _) = self.locate(path)?;
                self.commit(&position, make_default_canvas_node(ty))
            }
            result => result,
        }
    }

    /// Swap the subtree at `path` for `replacement`.
    pub fn replace(&mut self, path: &CanvasPath, replacement: CanvasNode) -> Result<(), CanvasError> {
        let (position, _) = self.locate(path)?;
        self.commit(&position, replacement)
    }

    pub fn set_visible(&mut self, path: &CanvasPath, visible: bool) -> Result<(), CanvasError> {
        self.update(path, |node| node.set_visible(visible))
    }

    pub fn set_read_only(&mut self, path: &CanvasPath, read_only: bool) -> Result<(), CanvasError> {
        self.update(path, |node| node.set_read_only(read_only))
    }

    pub fn set_meta_data(
        &mut self,
        path: &CanvasPath,
        name: &str,
        value: MetaData,
    ) -> Result<(), CanvasError> {
        self.update(path, |node| node.set_meta_data(name, value))
    }

    pub fn delete_meta_data(&mut self, path: &CanvasPath, name: &str) -> Result<(), CanvasError> {
        self.update(path, |node| node.delete_meta_data(name))
    }

    /// Replace the node at `path` with the default node of its type.
    pub fn reset(&mut self, path: &CanvasPath) -> Result<(), CanvasError> {
        self.update(path, |node| make_default_canvas_node(node.ty()))
    }

    /// Install `replacement` at `position` (child indices from the root)
    /// and rebuild the ancestors above it.
    pub fn commit(&mut self, position: &[usize], replacement: CanvasNode) -> Result<(), CanvasError> {
        tracing::debug!(?position, kind = replacement.kind().name(), "commit");
        self.root = rebuild(&self.root, position, replacement)?;
        Ok(())
    }

    fn update(
        &mut self,
        path: &CanvasPath,
        edit: impl FnOnce(&CanvasNode) -> CanvasNode,
    ) -> Result<(), CanvasError> {
        let (position, node) = self.locate(path)?;
        self.commit(&position, edit(&node))
    }

    fn locate(&self, path: &CanvasPath) -> Result<(Vec<usize>, CanvasNode), CanvasError> {
        let located = get_node(path, &NodeRef::root(&self.root))?;
        Ok((located.position().to_vec(), located.node().clone()))
    }
}

fn rebuild(
    node: &CanvasNode,
    position: &[usize],
    replacement: CanvasNode,
) -> Result<CanvasNode, CanvasError> {
    let Some((&index, rest)) = position.split_first() else {
        return Ok(replacement);
    };
    let child = node
        .child(index)
        .ok_or_else(|| CanvasError::ChildNotFound(index.to_string()))?;
    let rebuilt = rebuild(child, rest, replacement)?;
    node.replace_child(index, rebuilt)
}

// =============================================================================
// TESTS
// =============================================================================
