//! Slicing an evaluation list into per-field error lists.
//!
//! A field of a view model maps to one argument of the edited node. Its
//! errors are the ones the validator attributed to that argument on the
//! edited node, followed by everything reported inside the argument's own
//! subtree.

use scenario_ast::AstNode;
use scenario_ast_store::{
    get_argument_errors, get_errors_for_node, get_unattributed_errors, Argument, EvaluationError,
    EvaluationRecord,
};

pub type FieldErrors = Vec<EvaluationError>;

pub fn argument_errors(
    evaluation: &[EvaluationRecord],
    parent_id: &str,
    argument: Argument<'_>,
    child: Option<&AstNode>,
) -> FieldErrors {
    let mut out: FieldErrors = get_argument_errors(evaluation, parent_id, argument)
        .into_iter()
        .cloned()
        .collect();
    if let Some(child) = child {
        out.extend(
            get_errors_for_node(evaluation, &[child.id.as_str()], false)
                .into_iter()
                .cloned(),
        );
    }
    out
}

/// Errors of a named argument, looking the child up on `parent`.
pub fn named_errors(evaluation: &[EvaluationRecord], parent: &AstNode, key: &str) -> FieldErrors {
    argument_errors(evaluation, &parent.id, Argument::Name(key), parent.named(key))
}

/// Errors of a positional argument, looking the child up on `parent`.
pub fn indexed_errors(
    evaluation: &[EvaluationRecord],
    parent: &AstNode,
    index: usize,
) -> FieldErrors {
    argument_errors(
        evaluation,
        &parent.id,
        Argument::Index(index),
        parent.children.get(index),
    )
}

/// Errors reported on `node` itself that no field claims.
pub fn node_errors(evaluation: &[EvaluationRecord], node: &AstNode) -> FieldErrors {
    get_unattributed_errors(evaluation, &node.id)
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_ast::builders;

    #[test]
    fn test_parent_tag_then_subtree() {
        let value = builders::payload("amount").with_id("value");
        let node = builders::is_multiple_of(value, 3.into()).with_id("mul");
        let evaluation = vec![
            EvaluationRecord::new("mul", vec!["mul".into()])
                .with_error(EvaluationError::new("WRONG_TYPE", "").on_argument_name("value"))
                .with_error(EvaluationError::new("GLOBAL", "")),
            EvaluationRecord::new("value", vec!["value".into(), "mul".into()])
                .with_error(EvaluationError::new("UNKNOWN_FIELD", "")),
        ];

        let codes: Vec<String> = named_errors(&evaluation, &node, "value")
            .into_iter()
            .map(|e| e.error)
            .collect();
        assert_eq!(codes, ["WRONG_TYPE", "UNKNOWN_FIELD"]);
        assert!(named_errors(&evaluation, &node, "divider").is_empty());
        assert_eq!(node_errors(&evaluation, &node)[0].error, "GLOBAL");
    }
}
