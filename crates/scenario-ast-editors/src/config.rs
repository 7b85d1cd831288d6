//! Editor settings a host may override from JSON.

use serde::Deserialize;

use crate::error::EditorError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub fuzzy_match: FuzzyMatchConfig,
    /// Aggregation functions offered by the aggregation editor.
    pub aggregators: Vec<String>,
    /// Used when an aggregation node carries no function yet.
    pub default_aggregator: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FuzzyMatchConfig {
    pub algorithms: Vec<String>,
    pub default_algorithm: String,
    pub levels: FuzzyLevels,
}

/// Thresholds behind the named similarity levels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FuzzyLevels {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            fuzzy_match: FuzzyMatchConfig::default(),
            aggregators: ["AVG", "COUNT", "COUNT_DISTINCT", "MAX", "MIN", "SUM", "STDDEV"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_aggregator: "SUM".to_string(),
        }
    }
}

impl Default for FuzzyMatchConfig {
    fn default() -> Self {
        Self {
            algorithms: ["ratio", "token_set_ratio", "partial_ratio"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_algorithm: "ratio".to_string(),
            levels: FuzzyLevels::default(),
        }
    }
}

impl Default for FuzzyLevels {
    fn default() -> Self {
        Self {
            low: 50.0,
            medium: 70.0,
            high: 85.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(text: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_known_aggregator(&self, name: &str) -> bool {
        self.aggregators.iter().any(|a| a == name)
    }
}

impl FuzzyMatchConfig {
    pub fn is_known_algorithm(&self, name: &str) -> bool {
        self.algorithms.iter().any(|a| a == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.fuzzy_match.default_algorithm, "ratio");
        assert_eq!(config.fuzzy_match.levels.medium, 70.0);
        assert!(config.is_known_aggregator("SUM"));
        assert!(!config.is_known_aggregator("MEDIAN"));
    }

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_json_str(
            r#"{"fuzzyMatch": {"levels": {"high": 95}}, "defaultAggregator": "COUNT"}"#,
        )
        .unwrap();
        assert_eq!(config.fuzzy_match.levels.high, 95.0);
        assert_eq!(config.fuzzy_match.levels.low, 50.0);
        assert_eq!(config.fuzzy_match.default_algorithm, "ratio");
        assert_eq!(config.default_aggregator, "COUNT");
        assert!(matches!(
            EditorConfig::from_json_str("[]"),
            Err(EditorError::Config(_))
        ));
    }
}
