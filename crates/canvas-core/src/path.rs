//! # Canvas Paths
//!
//! Textual addresses into a canvas tree.
//!
//! A path is a run of `<` (one per level walked up) followed by child
//! segments separated by `.`. Inside a segment, `\.`, `\\` and `\<` stand
//! for the literal characters. A segment selects the child of that name,
//! or failing that the child at that zero-based index. The empty path
//! addresses the node it is resolved from.

use crate::navigation::NodeRef;
use crate::node::NodeKind;
use crate::primitives::{PATH_ESCAPE, PATH_PARENT, PATH_SEPARATOR};
use crate::types::CanvasError;
use std::fmt;
use std::str::FromStr;

/// A parsed path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CanvasPath {
    ups: usize,
    segments: Vec<String>,
}

impl CanvasPath {
    #[must_use]
    pub fn new(ups: usize, segments: Vec<String>) -> Self {
        Self { ups, segments }
    }

    /// The empty path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path from its textual form.
    pub fn parse(text: &str) -> Result<Self, CanvasError> {
        let mut chars = text.chars().peekable();
        let mut ups = 0;
        while chars.next_if_eq(&PATH_PARENT).is_some() {
            ups += 1;
        }
        let mut segments = Vec::new();
        if chars.peek().is_none() {
            return Ok(Self { ups, segments });
        }
        let mut current = String::new();
        while let Some(c) = chars.next() {
            match c {
                PATH_ESCAPE => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => {
                        return Err(CanvasError::InvalidPath(format!(
                            "{}: dangling escape",
                            text
                        )));
                    }
                },
                PATH_SEPARATOR => segments.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        segments.push(current);
        if segments.iter().any(String::is_empty) {
            return Err(CanvasError::InvalidPath(format!("{}: empty segment", text)));
        }
        Ok(Self { ups, segments })
    }

    /// The absolute path of a located node, from its tree's root.
    #[must_use]
    pub fn from_node(node: &NodeRef<'_>) -> Self {
        let mut segments = Vec::with_capacity(node.depth());
        let mut current = node.tree();
        for &index in node.position() {
            let Some(child) = current.child(index) else {
                break;
            };
            segments.push(segment_for(child.name(), index));
            current = child;
        }
        Self { ups: 0, segments }
    }

    /// Number of levels walked up before descending.
    #[must_use]
    pub fn ups(&self) -> usize {
        self.ups
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ups == 0 && self.segments.is_empty()
    }

    /// This path extended by one child segment.
    #[must_use]
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.segments.push(segment.into());
        path
    }

    /// This path resolved `levels` further up.
    #[must_use]
    pub fn raised(&self, levels: usize) -> Self {
        Self {
            ups: self.ups + levels,
            segments: self.segments.clone(),
        }
    }
}

/// A child's path segment: its name, or its index when it has none.
fn segment_for(name: &str, index: usize) -> String {
    if name.is_empty() {
        index.to_string()
    } else {
        name.to_string()
    }
}

/// Escape a child name for use as a path segment.
#[must_use]
pub fn escape_segment(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for (index, c) in name.chars().enumerate() {
        if c == PATH_SEPARATOR || c == PATH_ESCAPE || (index == 0 && c == PATH_PARENT) {
            escaped.push(PATH_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

impl fmt::Display for CanvasPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.ups {
            write!(f, "{}", PATH_PARENT)?;
        }
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            f.write_str(&escape_segment(segment))?;
        }
        Ok(())
    }
}

impl FromStr for CanvasPath {
    type Err = CanvasError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve `path` starting from `start`, returning `None` when any step
/// leaves the tree.
#[must_use]
pub fn find_node<'a>(path: &CanvasPath, start: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    let mut current = start.clone();
    for _ in 0..path.ups {
        current = current.parent()?;
    }
    for segment in &path.segments {
        current = resolve_segment(&current, segment)?;
    }
    Some(current)
}

/// Resolve `path` starting from `start`.
pub fn get_node<'a>(path: &CanvasPath, start: &NodeRef<'a>) -> Result<NodeRef<'a>, CanvasError> {
    find_node(path, start).ok_or_else(|| CanvasError::PathNotFound(path.to_string()))
}

fn resolve_segment<'a>(node: &NodeRef<'a>, segment: &str) -> Option<NodeRef<'a>> {
    if let Some(child) = node.find_child(segment) {
        return Some(child);
    }
    if let Some(child) = segment
        .parse::<usize>()
        .ok()
        .and_then(|index| node.child(index))
    {
        return Some(child);
    }
    // Custom nodes alias dotted slot names to the descendant they spell.
    if matches!(node.kind(), NodeKind::Custom) && segment.contains(PATH_SEPARATOR) {
        let mut current = node.clone();
        for part in segment.split(PATH_SEPARATOR) {
            current = resolve_segment(&current, part)?;
        }
        return Some(current);
    }
    None
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::CanvasNode;
    use crate::nodes::{CustomNode, ValueNode};
    use crate::types::Value;

    fn tree() -> CanvasNode {
        let inner = CustomNode::new(
            "Inner",
            vec![
                ("x".to_string(), ValueNode::new(Value::Integer(1))),
                ("a.b".to_string(), ValueNode::new(Value::Integer(2))),
            ],
        )
        .expect("inner");
        CustomNode::new(
            "Outer",
            vec![
                ("inner".to_string(), inner),
                ("y".to_string(), ValueNode::new(Value::Boolean(true))),
            ],
        )
        .expect("outer")
    }

    #[test]
    fn parse_and_display() {
        let path = CanvasPath::parse("<<a.b\\.c").expect("parse");
        assert_eq!(path.ups(), 2);
        assert_eq!(path.segments(), ["a".to_string(), "b.c".to_string()]);
        assert_eq!(path.to_string(), "<<a.b\\.c");
    }

    #[test]
    fn empty_and_parent_only_paths() {
        assert!(CanvasPath::parse("").expect("parse").is_empty());
        let up = CanvasPath::parse("<").expect("parse");
        assert_eq!(up.ups(), 1);
        assert!(up.segments().is_empty());
    }

    #[test]
    fn malformed_paths_rejected() {
        assert!(matches!(
            CanvasPath::parse("a..b"),
            Err(CanvasError::InvalidPath(_))
        ));
        assert!(matches!(
            CanvasPath::parse("a\\"),
            Err(CanvasError::InvalidPath(_))
        ));
    }

    #[test]
    fn leading_parent_in_name_is_escaped() {
        let path = CanvasPath::new(1, vec!["<odd".to_string()]);
        let text = path.to_string();
        assert_eq!(text, "<\\<odd");
        assert_eq!(CanvasPath::parse(&text).expect("parse"), path);
    }

    #[test]
    fn resolves_names_then_indices() {
        let root = tree();
        let start = NodeRef::root(&root);
        let by_name = find_node(&"inner.x".parse().expect("parse"), &start).expect("x");
        let by_index = find_node(&"0.0".parse().expect("parse"), &start).expect("0.0");
        assert_eq!(by_name, by_index);
        assert!(find_node(&"inner.z".parse().expect("parse"), &start).is_none());
        assert!(matches!(
            get_node(&"<".parse().expect("parse"), &start),
            Err(CanvasError::PathNotFound(_))
        ));
    }

    #[test]
    fn escaped_dot_matches_dotted_name() {
        let root = tree();
        let start = NodeRef::root(&root);
        let node = find_node(&"inner.a\\.b".parse().expect("parse"), &start).expect("a.b");
        assert_eq!(node.value(), Some(&Value::Integer(2)));
    }

    #[test]
    fn custom_alias_resolves_descendant() {
        let root = tree();
        let start = NodeRef::root(&root);
        let alias = CanvasPath::new(0, vec!["inner.x".to_string()]);
        let node = find_node(&alias, &start).expect("alias");
        assert_eq!(node.position(), [0, 0]);
    }

    #[test]
    fn from_node_round_trips() {
        let root = tree();
        let start = NodeRef::root(&root);
        let node = NodeRef::locate(&root, &[0, 1]).expect("a.b");
        let path = CanvasPath::from_node(&node);
        assert_eq!(path.to_string(), "inner.a\\.b");
        assert_eq!(find_node(&path, &start), Some(node));
    }
}
