//! Validation feedback as returned by the external validator.

use scenario_ast::NodeId;
use serde::{Deserialize, Serialize};

/// One semantic error reported for a node.
///
/// `argument_name` / `argument_index` narrow the error to one argument of the
/// node (a named child or a positional child) when the validator knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationError {
    pub error: String,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_index: Option<usize>,
}

impl EvaluationError {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            argument_name: None,
            argument_index: None,
        }
    }

    pub fn on_argument_name(mut self, name: impl Into<String>) -> Self {
        self.argument_name = Some(name.into());
        self
    }

    pub fn on_argument_index(mut self, index: usize) -> Self {
        self.argument_index = Some(index);
        self
    }

    pub fn is_attributed(&self) -> bool {
        self.argument_name.is_some() || self.argument_index.is_some()
    }

    pub fn concerns(&self, argument: &Argument<'_>) -> bool {
        match argument {
            Argument::Name(name) => self.argument_name.as_deref() == Some(*name),
            Argument::Index(index) => self.argument_index == Some(*index),
        }
    }
}

/// Argument of a node an error may be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument<'a> {
    Name(&'a str),
    Index(usize),
}

/// Validation feedback for one node.
///
/// `related_ids` is the id chain from the node itself up to the root; it is
/// what lets an ancestor show the errors of its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub node_id: NodeId,

    #[serde(default)]
    pub related_ids: Vec<NodeId>,

    #[serde(default)]
    pub errors: Vec<EvaluationError>,
}

impl EvaluationRecord {
    pub fn new(node_id: impl Into<NodeId>, related_ids: Vec<NodeId>) -> Self {
        Self {
            node_id: node_id.into(),
            related_ids,
            errors: Vec::new(),
        }
    }

    pub fn with_error(mut self, error: EvaluationError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
