//! The external validation contract.

use async_trait::async_trait;
use scenario_ast::{AstNode, DataType};
use thiserror::Error;

use crate::cancel::CancellationToken;
use crate::evaluation::EvaluationRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    pub node: AstNode,
    /// Type the host expects the whole expression to return, if any.
    pub expected_type: Option<DataType>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// The request observed its token and stopped. Not a failure.
    #[error("validation cancelled")]
    Cancelled,

    #[error("validation transport failed: {0}")]
    Transport(String),
}

/// Checks an expression tree and reports semantic errors per node.
///
/// Implementations may watch `cancel` to abandon work early; the store ignores
/// any response whose token was superseded regardless.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(
        &self,
        request: ValidationRequest,
        cancel: CancellationToken,
    ) -> Result<Vec<EvaluationRecord>, ValidatorError>;
}
