use scenario_ast::builders::names::{DURATION, SIGN, TIMESTAMP_FIELD, TIME_ADD};
use scenario_ast::{builders, AstNode, NodeId};
use scenario_ast_store::EvaluationRecord;

use crate::duration::{Duration, DurationUnit};
use crate::editor::{EditorContext, EditorKind, SubEditor};
use crate::error::EditorError;
use crate::field_errors::{named_errors, node_errors, FieldErrors};
use crate::util::{expect_operator, operand, optional_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    pub fn as_str(self) -> &'static str {
        match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        }
    }

    pub fn parse(text: &str) -> Option<Sign> {
        match text {
            "+" => Some(Sign::Plus),
            "-" => Some(Sign::Minus),
            _ => None,
        }
    }
}

/// `TimeAdd(timestampField, sign, duration)` edited as operand, sign and an
/// (amount, unit) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAddEditor {
    node_id: NodeId,
    timestamp_field: AstNode,
    sign: Sign,
    duration: Duration,
    encoded: String,
    pub errors: FieldErrors,
    pub timestamp_field_errors: FieldErrors,
    pub sign_errors: FieldErrors,
    pub duration_errors: FieldErrors,
}

impl TimeAddEditor {
    pub fn timestamp_field(&self) -> &AstNode {
        &self.timestamp_field
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The ISO-8601 literal written back on save.
    pub fn duration_literal(&self) -> &str {
        &self.encoded
    }

    pub fn set_timestamp_field(&mut self, node: AstNode) {
        self.timestamp_field = node;
        self.timestamp_field_errors.clear();
    }

    pub fn set_sign(&mut self, sign: Sign) {
        self.sign = sign;
        self.sign_errors.clear();
    }

    pub fn set_amount(&mut self, amount: u64) -> Result<(), EditorError> {
        self.set_duration(Duration::new(amount, self.duration.unit))
    }

    pub fn set_unit(&mut self, unit: DurationUnit) -> Result<(), EditorError> {
        self.set_duration(Duration::new(self.duration.amount, unit))
    }

    /// Rejects durations whose seconds overflow, leaving the editor unchanged.
    pub fn set_duration(&mut self, duration: Duration) -> Result<(), EditorError> {
        if duration.total_seconds().is_none() {
            return Err(EditorError::DurationOutOfRange {
                amount: duration.amount,
                unit: duration.unit,
            });
        }
        self.duration = duration;
        self.encoded = duration.to_iso();
        self.duration_errors.clear();
        Ok(())
    }
}

impl SubEditor for TimeAddEditor {
    const KIND: EditorKind = EditorKind::TimeAdd;

    fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        _ctx: &EditorContext,
    ) -> Result<Self, EditorError> {
        expect_operator(node, &[TIME_ADD])?;
        let sign = match optional_str(node, SIGN)? {
            None => Sign::default(),
            Some(text) => Sign::parse(&text).ok_or_else(|| EditorError::invalid(&node.id, SIGN))?,
        };
        let duration = match optional_str(node, DURATION)? {
            None => Duration::default(),
            Some(text) => Duration::parse_iso(&text)?,
        };
        Ok(Self {
            node_id: node.id.clone(),
            timestamp_field: operand(node, TIMESTAMP_FIELD),
            sign,
            duration,
            encoded: duration.to_iso(),
            errors: node_errors(evaluation, node),
            timestamp_field_errors: named_errors(evaluation, node, TIMESTAMP_FIELD),
            sign_errors: named_errors(evaluation, node, SIGN),
            duration_errors: named_errors(evaluation, node, DURATION),
        })
    }

    fn unadapt(&self) -> AstNode {
        builders::time_add(self.timestamp_field.clone(), self.sign.as_str(), &self.encoded)
            .with_id(self.node_id.clone())
    }

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn node_errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn has_errors(&self) -> bool {
        !(self.errors.is_empty()
            && self.timestamp_field_errors.is_empty()
            && self.sign_errors.is_empty()
            && self.duration_errors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_ast_store::EvaluationError;
    use serde_json::json;

    #[test]
    fn test_absent_duration_is_zero_seconds() {
        let node = AstNode::operator(TIME_ADD)
            .with_named_child(TIMESTAMP_FIELD, builders::payload("created_at"));
        let editor = TimeAddEditor::adapt(&node, &[], &EditorContext::default()).unwrap();
        assert_eq!(editor.duration(), Duration::default());
        assert_eq!(editor.sign(), Sign::Plus);
        let out = editor.unadapt();
        assert_eq!(out.named(DURATION).unwrap().constant, Some(json!("PT0S")));
        assert_eq!(out.named(SIGN).unwrap().constant, Some(json!("+")));
    }

    #[test]
    fn test_each_change_reencodes() {
        let node = builders::time_add(builders::payload("created_at"), "-", "PT2H").with_id("ta");
        let evaluation = vec![EvaluationRecord::new("ta", vec!["ta".into()])
            .with_error(EvaluationError::new("TOO_LONG", "").on_argument_name(DURATION))];
        let mut editor = TimeAddEditor::adapt(&node, &evaluation, &EditorContext::default()).unwrap();
        assert_eq!(editor.duration(), Duration::new(2, DurationUnit::Hours));
        assert_eq!(editor.duration_errors.len(), 1);

        editor.set_unit(DurationUnit::Days).unwrap();
        assert_eq!(editor.duration_literal(), "P2D");
        assert!(editor.duration_errors.is_empty());
        editor.set_amount(36).unwrap();
        assert_eq!(editor.duration_literal(), "P36D");
        assert!(!editor.has_errors());

        let out = editor.unadapt();
        assert_eq!(out.id, "ta");
        assert_eq!(out.named(DURATION).unwrap().constant, Some(json!("P36D")));
    }

    #[test]
    fn test_overflowing_amounts_rejected() {
        let ctx = EditorContext::default();
        let node = builders::time_add(builders::payload("created_at"), "+", "PT30M");
        let mut editor = TimeAddEditor::adapt(&node, &[], &ctx).unwrap();

        assert!(matches!(
            editor.set_duration(Duration::new(u64::MAX, DurationUnit::Days)),
            Err(EditorError::DurationOutOfRange { .. })
        ));
        assert_eq!(editor.duration_literal(), "PT30M");

        editor.set_amount(u64::MAX).unwrap_err();
        editor.set_unit(DurationUnit::Seconds).unwrap();
        editor.set_amount(u64::MAX).unwrap();
        editor.set_unit(DurationUnit::Minutes).unwrap_err();
        assert_eq!(editor.duration(), Duration::new(u64::MAX, DurationUnit::Seconds));

        let longest = Duration::max_amount(DurationUnit::Days);
        editor.set_duration(Duration::new(longest, DurationUnit::Days)).unwrap();
        let reopened = TimeAddEditor::adapt(&editor.unadapt(), &[], &ctx).unwrap();
        assert_eq!(reopened.duration(), Duration::new(longest, DurationUnit::Days));
    }

    #[test]
    fn test_invalid_constants() {
        let ctx = EditorContext::default();
        let bad_sign = builders::time_add(builders::undefined(), "*", "PT1S");
        assert!(matches!(
            TimeAddEditor::adapt(&bad_sign, &[], &ctx),
            Err(EditorError::InvalidConstant { .. })
        ));
        let bad_duration = builders::time_add(builders::undefined(), "+", "1 hour");
        assert!(matches!(
            TimeAddEditor::adapt(&bad_duration, &[], &ctx),
            Err(EditorError::InvalidDuration(_))
        ));
    }
}
