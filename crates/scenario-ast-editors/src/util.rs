use scenario_ast::builders;
use scenario_ast::AstNode;
use serde_json::{Number, Value};

use crate::error::EditorError;

pub(crate) fn expect_operator(node: &AstNode, names: &[&str]) -> Result<(), EditorError> {
    match node.name.as_deref() {
        Some(name) if names.contains(&name) => Ok(()),
        _ => Err(EditorError::UnsupportedShape {
            id: node.id.clone(),
        }),
    }
}

/// Named operand, or an Undefined slot when the argument is absent.
pub(crate) fn operand(node: &AstNode, key: &str) -> AstNode {
    node.named(key).cloned().unwrap_or_else(builders::undefined)
}

pub(crate) fn optional_str(node: &AstNode, key: &str) -> Result<Option<String>, EditorError> {
    match node.named(key) {
        None => Ok(None),
        Some(arg) => arg
            .constant_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| EditorError::invalid(&node.id, key)),
    }
}

pub(crate) fn required_str(node: &AstNode, key: &str) -> Result<String, EditorError> {
    optional_str(node, key)?.ok_or_else(|| EditorError::missing(&node.id, key))
}

pub(crate) fn optional_f64(node: &AstNode, key: &str) -> Result<Option<f64>, EditorError> {
    match node.named(key) {
        None => Ok(None),
        Some(arg) => arg
            .constant_f64()
            .map(Some)
            .ok_or_else(|| EditorError::invalid(&node.id, key)),
    }
}

pub(crate) fn finite_threshold(value: f64) -> Result<f64, EditorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EditorError::InvalidThreshold(value))
    }
}

/// Encode a threshold, keeping integral values as JSON integers.
pub(crate) fn number_value(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}
