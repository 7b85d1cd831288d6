use scenario_ast::NodeId;
use scenario_ast_store::StoreError;
use thiserror::Error;

use crate::duration::DurationUnit;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("node {id} has no sub-editor for its shape")]
    UnsupportedShape { id: NodeId },

    #[error("node {id} is missing argument `{argument}`")]
    MissingArgument { id: NodeId, argument: String },

    #[error("invalid ISO-8601 duration {0:?}")]
    InvalidDuration(String),

    #[error("duration of {amount} {unit:?} overflows 64-bit seconds")]
    DurationOutOfRange { amount: u64, unit: DurationUnit },

    #[error("threshold {0} is not a finite number")]
    InvalidThreshold(f64),

    #[error("argument `{argument}` of node {id} has an unexpected value")]
    InvalidConstant { id: NodeId, argument: String },

    #[error("path {0} no longer resolves")]
    StalePath(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid editor configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl EditorError {
    pub(crate) fn missing(id: &str, argument: impl Into<String>) -> Self {
        EditorError::MissingArgument {
            id: id.to_string(),
            argument: argument.into(),
        }
    }

    pub(crate) fn invalid(id: &str, argument: impl Into<String>) -> Self {
        EditorError::InvalidConstant {
            id: id.to_string(),
            argument: argument.into(),
        }
    }
}
