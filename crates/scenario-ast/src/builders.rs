//! Constructors for the node shapes the rule builder works with.

use serde_json::Value;

use crate::node::AstNode;

/// Operator and argument names shared by builders and editors.
pub mod names {
    pub const UNDEFINED: &str = "Undefined";
    pub const PAYLOAD: &str = "Payload";
    pub const DATABASE_ACCESS: &str = "DatabaseAccess";
    pub const LIST: &str = "List";
    pub const AGGREGATOR: &str = "Aggregator";
    pub const FILTER: &str = "Filter";
    pub const FUZZY_MATCH_OPTIONS: &str = "FuzzyMatchOptions";
    pub const FUZZY_MATCH: &str = "FuzzyMatch";
    pub const FUZZY_MATCH_ANY_OF: &str = "FuzzyMatchAnyOf";
    pub const GREATER: &str = ">";
    pub const TIME_ADD: &str = "TimeAdd";
    pub const TIMESTAMP_EXTRACT: &str = "TimestampExtract";
    pub const IS_MULTIPLE_OF: &str = "IsMultipleOf";
    pub const STRING_TEMPLATE: &str = "StringTemplate";

    pub const TABLE_NAME: &str = "tableName";
    pub const FIELD_NAME: &str = "fieldName";
    pub const PATH: &str = "path";
    pub const AGGREGATOR_FN: &str = "aggregator";
    pub const LABEL: &str = "label";
    pub const FILTERS: &str = "filters";
    pub const OPERATOR: &str = "operator";
    pub const VALUE: &str = "value";
    pub const THRESHOLD: &str = "threshold";
    pub const ALGORITHM: &str = "algorithm";
    pub const TIMESTAMP_FIELD: &str = "timestampField";
    pub const SIGN: &str = "sign";
    pub const DURATION: &str = "duration";
    pub const TIMESTAMP: &str = "timestamp";
    pub const PART: &str = "part";
    pub const DIVIDER: &str = "divider";
}

use names::*;

/// Placeholder for an argument the user has not filled in yet.
pub fn undefined() -> AstNode {
    AstNode::operator(UNDEFINED)
}

pub fn is_undefined(node: &AstNode) -> bool {
    node.is_operator(UNDEFINED)
}

pub fn constant(value: impl Into<Value>) -> AstNode {
    AstNode::literal(value)
}

pub fn payload(field_name: &str) -> AstNode {
    AstNode::operator(PAYLOAD).with_child(constant(field_name))
}

pub fn database_access(table_name: &str, field_name: &str, path: &[&str]) -> AstNode {
    AstNode::operator(DATABASE_ACCESS)
        .with_named_child(TABLE_NAME, constant(table_name))
        .with_named_child(FIELD_NAME, constant(field_name))
        .with_named_child(PATH, constant(Value::from(path.to_vec())))
}

pub fn list(items: impl IntoIterator<Item = AstNode>) -> AstNode {
    AstNode::operator(LIST).with_children(items)
}

/// Aggregation over a table field, with an empty filter list.
pub fn aggregator(function: &str, table_name: &str, field_name: &str, label: &str) -> AstNode {
    AstNode::operator(AGGREGATOR)
        .with_named_child(AGGREGATOR_FN, constant(function))
        .with_named_child(TABLE_NAME, constant(table_name))
        .with_named_child(FIELD_NAME, constant(field_name))
        .with_named_child(LABEL, constant(label))
        .with_named_child(FILTERS, list([]))
}

/// Aggregation filter. `value` is omitted for unary operators.
pub fn filter(table_name: &str, field_name: &str, operator: &str, value: Option<AstNode>) -> AstNode {
    let node = AstNode::operator(FILTER)
        .with_named_child(TABLE_NAME, constant(table_name))
        .with_named_child(FIELD_NAME, constant(field_name))
        .with_named_child(OPERATOR, constant(operator));
    match value {
        Some(value) => node.with_named_child(VALUE, value),
        None => node,
    }
}

/// Operand of a fuzzy filter: compared value plus matching parameters.
pub fn fuzzy_match_options(value: AstNode, threshold: Value, algorithm: &str) -> AstNode {
    AstNode::operator(FUZZY_MATCH_OPTIONS)
        .with_named_child(VALUE, value)
        .with_named_child(THRESHOLD, constant(threshold))
        .with_named_child(ALGORITHM, constant(algorithm))
}

/// `similarity(left, right) > threshold`, using the list variant when
/// `any_of` is set.
pub fn fuzzy_match_comparator(
    left: AstNode,
    right: AstNode,
    algorithm: &str,
    threshold: Value,
    any_of: bool,
) -> AstNode {
    let function = if any_of { FUZZY_MATCH_ANY_OF } else { FUZZY_MATCH };
    AstNode::operator(GREATER)
        .with_child(
            AstNode::operator(function)
                .with_child(left)
                .with_child(right)
                .with_named_child(ALGORITHM, constant(algorithm)),
        )
        .with_child(constant(threshold))
}

pub fn time_add(timestamp_field: AstNode, sign: &str, iso_duration: &str) -> AstNode {
    AstNode::operator(TIME_ADD)
        .with_named_child(TIMESTAMP_FIELD, timestamp_field)
        .with_named_child(SIGN, constant(sign))
        .with_named_child(DURATION, constant(iso_duration))
}

pub fn timestamp_extract(timestamp: AstNode, part: &str) -> AstNode {
    AstNode::operator(TIMESTAMP_EXTRACT)
        .with_named_child(TIMESTAMP, timestamp)
        .with_named_child(PART, constant(part))
}

pub fn is_multiple_of(value: AstNode, divider: Value) -> AstNode {
    AstNode::operator(IS_MULTIPLE_OF)
        .with_named_child(VALUE, value)
        .with_named_child(DIVIDER, constant(divider))
}

pub fn string_template(
    template: &str,
    variables: impl IntoIterator<Item = (String, AstNode)>,
) -> AstNode {
    let mut node = AstNode::operator(STRING_TEMPLATE).with_child(constant(template));
    node.named_children.extend(variables);
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders_produce_valid_shapes() {
        let nodes = [
            undefined(),
            payload("amount"),
            database_access("accounts", "balance", &["account"]),
            aggregator("SUM", "transactions", "amount", "total"),
            filter("transactions", "status", "IsEmpty", None),
            fuzzy_match_comparator(payload("name"), constant("bob"), "ratio", json!(70), false),
            time_add(payload("created_at"), "+", "PT1H"),
            timestamp_extract(payload("created_at"), "hour"),
            is_multiple_of(payload("amount"), json!(10)),
            string_template("%a%", [("a".to_string(), undefined())]),
        ];
        for node in &nodes {
            node.check_shape().unwrap();
        }
    }

    #[test]
    fn test_unary_filter_has_no_value() {
        let node = filter("t", "f", "IsEmpty", None);
        assert!(node.named(names::VALUE).is_none());
        let node = filter("t", "f", "=", Some(constant(1)));
        assert!(node.named(names::VALUE).is_some());
    }
}
