use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("malformed path {input:?}: {reason}")]
    MalformedPath { input: String, reason: String },

    #[error("node {id} has an invalid shape: {reason}")]
    InvalidShape { id: String, reason: &'static str },
}

impl AstError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        AstError::MalformedPath {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
