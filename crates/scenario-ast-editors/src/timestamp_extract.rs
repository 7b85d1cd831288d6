use scenario_ast::builders::names::{PART, TIMESTAMP, TIMESTAMP_EXTRACT};
use scenario_ast::{builders, AstNode, NodeId};
use scenario_ast_store::EvaluationRecord;

use crate::editor::{EditorContext, EditorKind, SubEditor};
use crate::error::EditorError;
use crate::field_errors::{named_errors, node_errors, FieldErrors};
use crate::util::{expect_operator, operand, required_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampPart {
    Year,
    Month,
    DayOfMonth,
    DayOfWeek,
    Hour,
}

impl TimestampPart {
    pub const ALL: [TimestampPart; 5] = [
        TimestampPart::Year,
        TimestampPart::Month,
        TimestampPart::DayOfMonth,
        TimestampPart::DayOfWeek,
        TimestampPart::Hour,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimestampPart::Year => "year",
            TimestampPart::Month => "month",
            TimestampPart::DayOfMonth => "day_of_month",
            TimestampPart::DayOfWeek => "day_of_week",
            TimestampPart::Hour => "hour",
        }
    }

    pub fn parse(text: &str) -> Option<TimestampPart> {
        Self::ALL.into_iter().find(|part| part.as_str() == text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimestampExtractEditor {
    node_id: NodeId,
    pub timestamp: AstNode,
    pub part: TimestampPart,
    pub errors: FieldErrors,
    pub timestamp_errors: FieldErrors,
    pub part_errors: FieldErrors,
}

impl TimestampExtractEditor {
    pub fn set_timestamp(&mut self, node: AstNode) {
        self.timestamp = node;
        self.timestamp_errors.clear();
    }

    pub fn set_part(&mut self, part: TimestampPart) {
        self.part = part;
        self.part_errors.clear();
    }
}

impl SubEditor for TimestampExtractEditor {
    const KIND: EditorKind = EditorKind::TimestampExtract;

    fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        _ctx: &EditorContext,
    ) -> Result<Self, EditorError> {
        expect_operator(node, &[TIMESTAMP_EXTRACT])?;
        let part = required_str(node, PART)?;
        Ok(Self {
            node_id: node.id.clone(),
            timestamp: operand(node, TIMESTAMP),
            part: TimestampPart::parse(&part).ok_or_else(|| EditorError::invalid(&node.id, PART))?,
            errors: node_errors(evaluation, node),
            timestamp_errors: named_errors(evaluation, node, TIMESTAMP),
            part_errors: named_errors(evaluation, node, PART),
        })
    }

    fn unadapt(&self) -> AstNode {
        builders::timestamp_extract(self.timestamp.clone(), self.part.as_str())
            .with_id(self.node_id.clone())
    }

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn node_errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn has_errors(&self) -> bool {
        !(self.errors.is_empty() && self.timestamp_errors.is_empty() && self.part_errors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        for part in TimestampPart::ALL {
            assert_eq!(TimestampPart::parse(part.as_str()), Some(part));
        }
        assert_eq!(TimestampPart::parse("minute"), None);
    }

    #[test]
    fn test_missing_part() {
        let node = AstNode::operator(TIMESTAMP_EXTRACT);
        assert!(matches!(
            TimestampExtractEditor::adapt(&node, &[], &EditorContext::default()),
            Err(EditorError::MissingArgument { argument, .. }) if argument == PART
        ));
    }
}
