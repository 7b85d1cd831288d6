use scenario_ast::builders::names::{DIVIDER, IS_MULTIPLE_OF, VALUE};
use scenario_ast::{builders, AstNode, NodeId};
use scenario_ast_store::EvaluationRecord;
use serde_json::{Number, Value};

use crate::editor::{EditorContext, EditorKind, SubEditor};
use crate::error::EditorError;
use crate::field_errors::{named_errors, node_errors, FieldErrors};
use crate::util::{expect_operator, operand};

#[derive(Debug, Clone, PartialEq)]
pub struct IsMultipleOfEditor {
    node_id: NodeId,
    pub value: AstNode,
    pub divider: Number,
    pub errors: FieldErrors,
    pub value_errors: FieldErrors,
    pub divider_errors: FieldErrors,
}

impl IsMultipleOfEditor {
    pub fn set_value(&mut self, node: AstNode) {
        self.value = node;
        self.value_errors.clear();
    }

    pub fn set_divider(&mut self, divider: impl Into<Number>) {
        self.divider = divider.into();
        self.divider_errors.clear();
    }
}

impl SubEditor for IsMultipleOfEditor {
    const KIND: EditorKind = EditorKind::IsMultipleOf;

    fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        _ctx: &EditorContext,
    ) -> Result<Self, EditorError> {
        expect_operator(node, &[IS_MULTIPLE_OF])?;
        let divider = match node.named(DIVIDER).map(|arg| &arg.constant) {
            None => return Err(EditorError::missing(&node.id, DIVIDER)),
            Some(Some(Value::Number(n))) => n.clone(),
            Some(_) => return Err(EditorError::invalid(&node.id, DIVIDER)),
        };
        Ok(Self {
            node_id: node.id.clone(),
            value: operand(node, VALUE),
            divider,
            errors: node_errors(evaluation, node),
            value_errors: named_errors(evaluation, node, VALUE),
            divider_errors: named_errors(evaluation, node, DIVIDER),
        })
    }

    fn unadapt(&self) -> AstNode {
        builders::is_multiple_of(self.value.clone(), Value::Number(self.divider.clone()))
            .with_id(self.node_id.clone())
    }

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn node_errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn has_errors(&self) -> bool {
        !(self.errors.is_empty() && self.value_errors.is_empty() && self.divider_errors.is_empty())
    }
}
