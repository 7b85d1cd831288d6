//! Correlate a flat evaluation list with nodes of the tree.
//!
//! Two query modes exist. `direct` returns only errors reported on the given
//! nodes themselves. Non-direct queries bubble: an error is returned for every
//! node on its record's `related_ids` chain, so a collapsed compound node can
//! show the errors of everything beneath it.
//!
//! Ids that no longer exist in the tree simply never match.

use crate::evaluation::{Argument, EvaluationError, EvaluationRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Valid,
    Error,
}

fn record_matches(record: &EvaluationRecord, ids: &[&str], direct: bool) -> bool {
    if direct {
        ids.contains(&record.node_id.as_str())
    } else {
        record
            .related_ids
            .iter()
            .any(|related| ids.contains(&related.as_str()))
    }
}

/// Errors attributed to `ids`, flattened in record order, not deduplicated.
pub fn get_errors_for_node<'a>(
    evaluation: &'a [EvaluationRecord],
    ids: &[&str],
    direct: bool,
) -> Vec<&'a EvaluationError> {
    evaluation
        .iter()
        .filter(|record| record_matches(record, ids, direct))
        .flat_map(|record| record.errors.iter())
        .collect()
}

pub fn get_validation_status(
    evaluation: &[EvaluationRecord],
    ids: &[&str],
    direct: bool,
) -> ValidationStatus {
    let has_error = evaluation
        .iter()
        .any(|record| !record.errors.is_empty() && record_matches(record, ids, direct));
    if has_error {
        ValidationStatus::Error
    } else {
        ValidationStatus::Valid
    }
}

/// Errors the validator reported on `node_id` itself and attributed to one
/// of its arguments.
pub fn get_argument_errors<'a>(
    evaluation: &'a [EvaluationRecord],
    node_id: &str,
    argument: Argument<'_>,
) -> Vec<&'a EvaluationError> {
    get_errors_for_node(evaluation, &[node_id], true)
        .into_iter()
        .filter(|error| error.concerns(&argument))
        .collect()
}

/// Errors reported on `node_id` itself that name no argument.
pub fn get_unattributed_errors<'a>(
    evaluation: &'a [EvaluationRecord],
    node_id: &str,
) -> Vec<&'a EvaluationError> {
    get_errors_for_node(evaluation, &[node_id], true)
        .into_iter()
        .filter(|error| !error.is_attributed())
        .collect()
}
