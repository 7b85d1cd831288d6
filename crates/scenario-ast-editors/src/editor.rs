//! Shape detection and dispatch over the sub-editors.

use std::fmt;
use std::sync::Arc;

use scenario_ast::builders::names::{
    AGGREGATOR, FUZZY_MATCH, FUZZY_MATCH_ANY_OF, GREATER, IS_MULTIPLE_OF, STRING_TEMPLATE,
    TIMESTAMP_EXTRACT, TIME_ADD,
};
use scenario_ast::{AstNode, NodeId};
use scenario_ast_store::EvaluationRecord;

use crate::aggregation::AggregationEditor;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::field_errors::FieldErrors;
use crate::fuzzy_match::FuzzyMatchEditor;
use crate::is_multiple_of::IsMultipleOfEditor;
use crate::string_template::StringTemplateEditor;
use crate::time_add::TimeAddEditor;
use crate::timestamp_extract::TimestampExtractEditor;
use crate::types::{LiteralTypes, TypeResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorKind {
    Aggregation,
    TimeAdd,
    FuzzyMatch,
    TimestampExtract,
    IsMultipleOf,
    StringTemplate,
}

impl EditorKind {
    /// Which sub-editor handles `node`, if any.
    pub fn detect(node: &AstNode) -> Option<EditorKind> {
        match node.name.as_deref()? {
            AGGREGATOR => Some(EditorKind::Aggregation),
            TIME_ADD => Some(EditorKind::TimeAdd),
            TIMESTAMP_EXTRACT => Some(EditorKind::TimestampExtract),
            IS_MULTIPLE_OF => Some(EditorKind::IsMultipleOf),
            STRING_TEMPLATE => Some(EditorKind::StringTemplate),
            GREATER => {
                let inner = node.children.first()?;
                if inner.is_operator(FUZZY_MATCH) || inner.is_operator(FUZZY_MATCH_ANY_OF) {
                    Some(EditorKind::FuzzyMatch)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// What sub-editors need besides the node: settings and operand typing.
#[derive(Clone)]
pub struct EditorContext {
    pub config: EditorConfig,
    pub types: Arc<dyn TypeResolver>,
}

impl EditorContext {
    pub fn new(config: EditorConfig, types: Arc<dyn TypeResolver>) -> Self {
        Self { config, types }
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Arc::new(LiteralTypes))
    }
}

impl fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A view model projecting one node shape to editable fields.
///
/// `unadapt(adapt(n))` is structurally equal to `n` for any `n` produced by
/// `unadapt`. Field setters clear the errors of the field they touch; errors
/// come back with the next validation.
pub trait SubEditor: Sized {
    const KIND: EditorKind;

    fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        ctx: &EditorContext,
    ) -> Result<Self, EditorError>;

    fn unadapt(&self) -> AstNode;

    /// Id of the edited node, kept across the round trip.
    fn node_id(&self) -> &NodeId;

    /// Errors on the node itself that no field claims.
    fn node_errors(&self) -> &FieldErrors;

    fn has_errors(&self) -> bool;
}

/// Any sub-editor, selected by [`EditorKind::detect`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEditor {
    Aggregation(AggregationEditor),
    TimeAdd(TimeAddEditor),
    FuzzyMatch(FuzzyMatchEditor),
    TimestampExtract(TimestampExtractEditor),
    IsMultipleOf(IsMultipleOfEditor),
    StringTemplate(StringTemplateEditor),
}

macro_rules! dispatch {
    ($editor:expr, $inner:ident => $body:expr) => {
        match $editor {
            NodeEditor::Aggregation($inner) => $body,
            NodeEditor::TimeAdd($inner) => $body,
            NodeEditor::FuzzyMatch($inner) => $body,
            NodeEditor::TimestampExtract($inner) => $body,
            NodeEditor::IsMultipleOf($inner) => $body,
            NodeEditor::StringTemplate($inner) => $body,
        }
    };
}

impl NodeEditor {
    pub fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        ctx: &EditorContext,
    ) -> Result<Self, EditorError> {
        let kind = EditorKind::detect(node).ok_or_else(|| EditorError::UnsupportedShape {
            id: node.id.clone(),
        })?;
        Ok(match kind {
            EditorKind::Aggregation => {
                NodeEditor::Aggregation(AggregationEditor::adapt(node, evaluation, ctx)?)
            }
            EditorKind::TimeAdd => NodeEditor::TimeAdd(TimeAddEditor::adapt(node, evaluation, ctx)?),
            EditorKind::FuzzyMatch => {
                NodeEditor::FuzzyMatch(FuzzyMatchEditor::adapt(node, evaluation, ctx)?)
            }
            EditorKind::TimestampExtract => {
                NodeEditor::TimestampExtract(TimestampExtractEditor::adapt(node, evaluation, ctx)?)
            }
            EditorKind::IsMultipleOf => {
                NodeEditor::IsMultipleOf(IsMultipleOfEditor::adapt(node, evaluation, ctx)?)
            }
            EditorKind::StringTemplate => {
                NodeEditor::StringTemplate(StringTemplateEditor::adapt(node, evaluation, ctx)?)
            }
        })
    }

    pub fn kind(&self) -> EditorKind {
        match self {
            NodeEditor::Aggregation(_) => AggregationEditor::KIND,
            NodeEditor::TimeAdd(_) => TimeAddEditor::KIND,
            NodeEditor::FuzzyMatch(_) => FuzzyMatchEditor::KIND,
            NodeEditor::TimestampExtract(_) => TimestampExtractEditor::KIND,
            NodeEditor::IsMultipleOf(_) => IsMultipleOfEditor::KIND,
            NodeEditor::StringTemplate(_) => StringTemplateEditor::KIND,
        }
    }

    pub fn unadapt(&self) -> AstNode {
        dispatch!(self, editor => editor.unadapt())
    }

    pub fn node_id(&self) -> &NodeId {
        dispatch!(self, editor => editor.node_id())
    }

    pub fn node_errors(&self) -> &FieldErrors {
        dispatch!(self, editor => editor.node_errors())
    }

    pub fn has_errors(&self) -> bool {
        dispatch!(self, editor => editor.has_errors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_ast::builders;

    #[test]
    fn test_detect() {
        let cases = [
            (builders::aggregator("SUM", "t", "f", "l"), Some(EditorKind::Aggregation)),
            (builders::time_add(builders::undefined(), "+", "PT0S"), Some(EditorKind::TimeAdd)),
            (
                builders::fuzzy_match_comparator(
                    builders::undefined(),
                    builders::undefined(),
                    "ratio",
                    70.into(),
                    true,
                ),
                Some(EditorKind::FuzzyMatch),
            ),
            (
                builders::timestamp_extract(builders::undefined(), "hour"),
                Some(EditorKind::TimestampExtract),
            ),
            (
                builders::is_multiple_of(builders::undefined(), 2.into()),
                Some(EditorKind::IsMultipleOf),
            ),
            (builders::string_template("", []), Some(EditorKind::StringTemplate)),
            (
                AstNode::operator(">")
                    .with_child(builders::constant(1))
                    .with_child(builders::constant(2)),
                None,
            ),
            (builders::constant(1), None),
        ];
        for (node, expected) in cases {
            assert_eq!(EditorKind::detect(&node), expected, "{node:?}");
        }
    }

    #[test]
    fn test_unsupported_shape() {
        let node = builders::payload("x").with_id("p");
        let err = NodeEditor::adapt(&node, &[], &EditorContext::default()).unwrap_err();
        assert!(matches!(err, EditorError::UnsupportedShape { id } if id == "p"));
    }
}
