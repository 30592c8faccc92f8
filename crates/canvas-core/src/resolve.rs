//! # Reference Resolution
//!
//! Brings every reference's declared type back in line with its referent
//! after an edit elsewhere in the tree.
//!
//! The tree is walked breadth first. The first reference whose referent
//! no longer fits its declared type is converted to the referent's type,
//! and the walk restarts on the rewritten tree. Every adopted tree is kept
//! as a revision; a rewrite that reproduces the shape of an earlier
//! revision is skipped, which is what bounds the iteration.

use crate::builder::CanvasNodeBuilder;
use crate::equality::is_structurally_equal;
use crate::navigation::{NodeRef, breadth_first};
use crate::node::{CanvasNode, NodeKind};
use crate::nodes::ReferenceNode;
use crate::types::is_compatible;

/// Resolve every reference of `root` whose type no longer matches its
/// referent. References whose conversion fails are left as they are.
#[must_use]
pub fn resolve_references(root: &CanvasNode) -> CanvasNode {
    let mut current = root.clone();
    let mut revisions = vec![current.clone()];
    while let Some(revision) = next_revision(&current, &revisions) {
        revisions.push(revision.clone());
        current = revision;
    }
    tracing::debug!(revisions = revisions.len(), "references resolved");
    current
}

fn next_revision(tree: &CanvasNode, revisions: &[CanvasNode]) -> Option<CanvasNode> {
    for reference in breadth_first(&NodeRef::root(tree)) {
        if !matches!(reference.kind(), NodeKind::Reference { .. }) {
            continue;
        }
        let Some(referent) = ReferenceNode::find_referent(&reference) else {
            continue;
        };
        if is_compatible(reference.ty(), referent.ty()) {
            continue;
        }
        let candidate = reference
            .convert(referent.ty())
            .and_then(|converted| {
                let mut builder = CanvasNodeBuilder::new(tree);
                builder.commit(reference.position(), converted)?;
                Ok(builder.into_node())
            });
        let candidate = match candidate {
            Ok(candidate) => candidate,
            Err(error) => {
                tracing::debug!(
                    referent = reference.text(),
                    %error,
                    "leaving reference unresolved"
                );
                continue;
            }
        };
        if revisions
            .iter()
            .any(|revision| is_structurally_equal(revision, &candidate))
        {
            continue;
        }
        tracing::trace!(
            position = ?reference.position(),
            to = %referent.ty(),
            "reference retyped"
        );
        return Some(candidate);
    }
    None
}
