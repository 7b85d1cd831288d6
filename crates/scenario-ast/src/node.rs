//! Expression tree node.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AstError;
use crate::path::{Path, PathSegment};

/// Identifier of a node. Stable across edits and copies; regenerated on paste.
pub type NodeId = String;

/// Generate a fresh node identifier.
pub fn new_node_id() -> NodeId {
    uuid::Uuid::new_v4().to_string()
}

/// One node of the expression tree.
///
/// A node is either a literal (`constant` set, no `name`, no children) or an
/// operator application (`name` set, no `constant`). The serialized form uses
/// the camelCase layout `{ id, name, constant, children, namedChildren }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    #[serde(default = "new_node_id")]
    pub id: NodeId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Literal payload. A present JSON `null` is a literal, not an absence.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_constant"
    )]
    pub constant: Option<Value>,

    #[serde(default)]
    pub children: Vec<AstNode>,

    #[serde(default)]
    pub named_children: IndexMap<String, AstNode>,
}

fn deserialize_constant<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Borrowed view of what a node is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    Literal(&'a Value),
    Operator(&'a str),
}

impl AstNode {
    /// A literal node holding `value`.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self {
            id: new_node_id(),
            name: None,
            constant: Some(value.into()),
            children: Vec::new(),
            named_children: IndexMap::new(),
        }
    }

    /// An operator application with no arguments yet.
    pub fn operator(name: impl Into<String>) -> Self {
        Self {
            id: new_node_id(),
            name: Some(name.into()),
            constant: None,
            children: Vec::new(),
            named_children: IndexMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_named_child(mut self, key: impl Into<String>, child: AstNode) -> Self {
        self.named_children.insert(key.into(), child);
        self
    }

    pub fn kind(&self) -> Option<NodeKind<'_>> {
        match (&self.name, &self.constant) {
            (Some(name), None) => Some(NodeKind::Operator(name)),
            (None, Some(value)) => Some(NodeKind::Literal(value)),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind(), Some(NodeKind::Literal(_)))
    }

    pub fn is_operator(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    pub fn named(&self, key: &str) -> Option<&AstNode> {
        self.named_children.get(key)
    }

    pub fn constant_str(&self) -> Option<&str> {
        self.constant.as_ref().and_then(Value::as_str)
    }

    pub fn constant_f64(&self) -> Option<f64> {
        self.constant.as_ref().and_then(Value::as_f64)
    }

    /// Check the literal/operator invariant on this node and all descendants.
    pub fn check_shape(&self) -> Result<(), AstError> {
        let reason = match (&self.name, &self.constant) {
            (Some(_), Some(_)) => Some("node has both a name and a constant"),
            (None, None) => Some("node has neither a name nor a constant"),
            (None, Some(_)) if !self.children.is_empty() || !self.named_children.is_empty() => {
                Some("literal node has children")
            }
            _ => None,
        };
        if let Some(reason) = reason {
            return Err(AstError::InvalidShape {
                id: self.id.clone(),
                reason,
            });
        }
        for child in self.children.iter().chain(self.named_children.values()) {
            child.check_shape()?;
        }
        Ok(())
    }

    /// Equality ignoring node ids.
    pub fn structurally_eq(&self, other: &AstNode) -> bool {
        self.name == other.name
            && self.constant == other.constant
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.structurally_eq(b))
            && self.named_children.len() == other.named_children.len()
            && self.named_children.iter().all(|(key, a)| {
                other
                    .named_children
                    .get(key)
                    .is_some_and(|b| a.structurally_eq(b))
            })
    }

    /// Deep copy of this node with every id regenerated.
    pub fn with_fresh_ids(&self) -> AstNode {
        AstNode {
            id: new_node_id(),
            name: self.name.clone(),
            constant: self.constant.clone(),
            children: self.children.iter().map(AstNode::with_fresh_ids).collect(),
            named_children: self
                .named_children
                .iter()
                .map(|(key, child)| (key.clone(), child.with_fresh_ids()))
                .collect(),
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&AstNode> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter()
            .chain(self.named_children.values())
            .find_map(|child| child.find_by_id(id))
    }

    /// Path from this node to the descendant with `id`.
    pub fn path_to(&self, id: &str) -> Option<Path> {
        let mut segments = Vec::new();
        if self.collect_path(id, &mut segments) {
            Some(Path::from_segments(segments))
        } else {
            None
        }
    }

    fn collect_path(&self, id: &str, segments: &mut Vec<PathSegment>) -> bool {
        if self.id == id {
            return true;
        }
        for (index, child) in self.children.iter().enumerate() {
            segments.push(PathSegment::Child(index));
            if child.collect_path(id, segments) {
                return true;
            }
            segments.pop();
        }
        for (key, child) in &self.named_children {
            segments.push(PathSegment::NamedChild(key.clone()));
            if child.collect_path(id, segments) {
                return true;
            }
            segments.pop();
        }
        false
    }

    /// All ids in this subtree, depth-first, node before children.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.push_ids(&mut out);
        out
    }

    fn push_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.id);
        for child in self.children.iter().chain(self.named_children.values()) {
            child.push_ids(out);
        }
    }
}
