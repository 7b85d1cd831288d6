//! Path addressing for expression trees.
//!
//! A path is a sequence of segments, each selecting either a positional child
//! or a named child. The textual form starts with `root` and appends
//! `.children.<index>` or `.namedChildren.<key>` per segment:
//!
//! ```text
//! root.children.0.namedChildren.filters.children.2
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::AstError;
use crate::node::AstNode;

const ROOT_MARKER: &str = "root";
const CHILDREN_MARKER: &str = "children";
const NAMED_CHILDREN_MARKER: &str = "namedChildren";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Child(usize),
    NamedChild(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Child(index) => write!(f, "{CHILDREN_MARKER}.{index}"),
            PathSegment::NamedChild(key) => write!(f, "{NAMED_CHILDREN_MARKER}.{key}"),
        }
    }
}

/// Location of a node relative to a root. Empty means the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub fn child(&self, index: usize) -> Path {
        let mut out = self.clone();
        out.0.push(PathSegment::Child(index));
        out
    }

    pub fn named_child(&self, key: impl Into<String>) -> Path {
        let mut out = self.clone();
        out.0.push(PathSegment::NamedChild(key.into()));
        out
    }

    /// Append all segments of `other` to a copy of this path.
    pub fn join(&self, other: &Path) -> Path {
        let mut out = self.clone();
        out.0.extend(other.0.iter().cloned());
        out
    }

    /// Check if this path is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_MARKER)?;
        for segment in &self.0 {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

impl TryFrom<String> for Path {
    type Error = AstError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_path(&value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"))
}

/// Check if a string is a canonical non-negative integer (no sign, no leading zero).
fn is_valid_index(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'))
}

/// Parse the dotted textual form of a path.
///
/// # Errors
///
/// Returns [`AstError::MalformedPath`] if the text does not start with `root`,
/// uses an unknown marker, leaves a marker without its operand, or has an
/// index that is not a non-negative integer or a key that is not an
/// identifier.
///
/// # Example
///
/// ```
/// use scenario_ast::{parse_path, PathSegment};
///
/// let path = parse_path("root.children.1.namedChildren.value").unwrap();
/// assert_eq!(
///     path.segments(),
///     &[PathSegment::Child(1), PathSegment::NamedChild("value".into())]
/// );
/// assert!(parse_path("root").unwrap().is_root());
/// assert!(parse_path("root.children.-1").is_err());
/// ```
pub fn parse_path(text: &str) -> Result<Path, AstError> {
    let mut tokens = text.split('.');
    match tokens.next() {
        Some(ROOT_MARKER) => {}
        _ => return Err(AstError::malformed(text, "path must start with `root`")),
    }

    let mut segments = Vec::new();
    while let Some(marker) = tokens.next() {
        let operand = tokens
            .next()
            .ok_or_else(|| AstError::malformed(text, format!("`{marker}` has no operand")))?;
        match marker {
            CHILDREN_MARKER => {
                if !is_valid_index(operand) {
                    return Err(AstError::malformed(
                        text,
                        format!("`{operand}` is not a child index"),
                    ));
                }
                let index = operand
                    .parse::<usize>()
                    .map_err(|_| AstError::malformed(text, format!("index `{operand}` overflows")))?;
                segments.push(PathSegment::Child(index));
            }
            NAMED_CHILDREN_MARKER => {
                if !identifier_re().is_match(operand) {
                    return Err(AstError::malformed(
                        text,
                        format!("`{operand}` is not an identifier"),
                    ));
                }
                segments.push(PathSegment::NamedChild(operand.to_string()));
            }
            other => {
                return Err(AstError::malformed(
                    text,
                    format!("unknown segment marker `{other}`"),
                ));
            }
        }
    }
    Ok(Path(segments))
}

fn step<'a>(node: &'a AstNode, segment: &PathSegment) -> Option<&'a AstNode> {
    match segment {
        PathSegment::Child(index) => node.children.get(*index),
        PathSegment::NamedChild(key) => node.named_children.get(key),
    }
}

/// Resolve `path` against `root`. Returns `None` if any link is missing.
pub fn get_at_path<'a>(root: &'a AstNode, path: &Path) -> Option<&'a AstNode> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| step(node, segment))
}

/// Mutable counterpart of [`get_at_path`].
pub fn get_at_path_mut<'a>(root: &'a mut AstNode, path: &Path) -> Option<&'a mut AstNode> {
    let mut current = root;
    for segment in path.segments() {
        current = match segment {
            PathSegment::Child(index) => current.children.get_mut(*index)?,
            PathSegment::NamedChild(key) => current.named_children.get_mut(key)?,
        };
    }
    Some(current)
}

/// Split a path into its parent path and last segment. `None` at the root.
pub fn get_parent_path(path: &Path) -> Option<(Path, PathSegment)> {
    let (last, parent) = path.segments().split_last()?;
    Some((Path(parent.to_vec()), last.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rejects_bad_prefix_and_markers() {
        assert!(parse_path("").is_err());
        assert!(parse_path("tree.children.0").is_err());
        assert!(parse_path("root.children").is_err());
        assert!(parse_path("root.kids.0").is_err());
        assert!(parse_path("root.children.01").is_err());
        assert!(parse_path("root.namedChildren.1abc").is_err());
        assert!(parse_path("root.namedChildren.").is_err());
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(get_parent_path(&Path::root()), None);
        let path = Path::root().child(0).named_child("value");
        let (parent, last) = get_parent_path(&path).unwrap();
        assert_eq!(parent, Path::root().child(0));
        assert_eq!(last, PathSegment::NamedChild("value".into()));
    }

    #[test]
    fn test_get_at_path_missing_link_is_none() {
        let root = AstNode::operator("And").with_child(AstNode::literal(json!(1)));
        assert!(get_at_path(&root, &Path::root().child(0)).is_some());
        assert!(get_at_path(&root, &Path::root().child(1)).is_none());
        assert!(get_at_path(&root, &Path::root().child(0).child(0)).is_none());
        assert!(get_at_path(&root, &Path::root().named_child("x")).is_none());
    }

    #[test]
    fn test_ancestor_relation() {
        let a = Path::root().child(0);
        let b = a.named_child("filters").child(2);
        assert!(a.is_ancestor_of(&b));
        assert!(Path::root().is_ancestor_of(&a));
        assert!(!b.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&a));
    }

    #[test]
    fn test_serde_uses_string_form() {
        let path = Path::root().child(3).named_child("timestampField");
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, json!("root.children.3.namedChildren.timestampField"));
        let back: Path = serde_json::from_value(json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_value::<Path>(json!("root.oops")).is_err());
    }
}
