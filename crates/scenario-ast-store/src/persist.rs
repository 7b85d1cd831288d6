use scenario_ast::AstNode;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::evaluation::EvaluationRecord;

/// The two values a host loads and saves for an edit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub root: AstNode,
    #[serde(default)]
    pub evaluation: Vec<EvaluationRecord>,
}

impl PersistedState {
    pub fn from_json_str(text: &str) -> Result<Self, StoreError> {
        let state: PersistedState = serde_json::from_str(text)?;
        state.root.check_shape()?;
        Ok(state)
    }

    pub fn to_json_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }
}
