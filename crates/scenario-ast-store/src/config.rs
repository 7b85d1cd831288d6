use scenario_ast::DataType;
use serde::Deserialize;

use crate::error::StoreError;

/// Per-store settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Name used in log records to tell stores apart.
    pub label: String,
    /// Return type hint passed along with every validation request.
    pub expected_type: Option<DataType>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            label: "root".to_string(),
            expected_type: None,
        }
    }
}

impl StoreConfig {
    pub fn from_json_str(text: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_expected_type(mut self, expected_type: DataType) -> Self {
        self.expected_type = Some(expected_type);
        self
    }
}
