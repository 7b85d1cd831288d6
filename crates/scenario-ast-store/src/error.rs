use scenario_ast::AstError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation transport failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Ast(#[from] AstError),

    #[error("persisted state is invalid: {0}")]
    Persist(#[from] serde_json::Error),
}
