//! Scenario catalog loading
//!
//! The dataset is a JSON array of scenario objects. Each carries a prompt and
//! a mapping of model name to response text. Fields other than `scenario`,
//! `scenario_index` and `responses` are ignored. A `null` prompt reads as
//! empty, and models whose response is `null` are left out.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;

use crate::{Error, Result};

/// One evaluation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    /// Prompt text
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scenario: String,

    /// Stable identity; when absent the catalog position is used
    #[serde(default)]
    pub scenario_index: Option<i64>,

    /// Model name to response text
    #[serde(default, deserialize_with = "present_responses")]
    pub responses: BTreeMap<String, String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn present_responses<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    let raw = Option::<BTreeMap<String, Option<String>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(model, response)| response.map(|r| (model, r)))
        .collect())
}

/// Ordered, truncated list of scenarios
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Read `data_root/key`, keeping at most `max_scenarios` entries
    pub async fn load(data_root: &Path, key: &str, max_scenarios: usize) -> Result<Self> {
        let path = data_root.join(key);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::Config(format!("Failed to read dataset {}: {}", path.display(), e))
        })?;
        Self::from_json(&content, max_scenarios)
    }

    /// Parse a JSON array of scenarios
    pub fn from_json(content: &str, max_scenarios: usize) -> Result<Self> {
        let mut scenarios: Vec<Scenario> = serde_json::from_str(content)?;
        scenarios.truncate(max_scenarios);
        Ok(Self { scenarios })
    }

    pub fn from_scenarios(mut scenarios: Vec<Scenario>, max_scenarios: usize) -> Self {
        scenarios.truncate(max_scenarios);
        Self { scenarios }
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Scenario> {
        self.scenarios.get(position)
    }

    /// Stored identity of the scenario at `position`
    pub fn effective_index(&self, position: usize) -> Option<i64> {
        self.scenarios
            .get(position)
            .map(|s| s.scenario_index.unwrap_or(position as i64))
    }

    /// Iterate `(position, effective index, scenario)` in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (usize, i64, &Scenario)> {
        self.scenarios
            .iter()
            .enumerate()
            .map(|(pos, s)| (pos, s.scenario_index.unwrap_or(pos as i64), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"[
        {"scenario": "First", "responses": {"a": "ra", "b": "rb"}, "reflections": ["ignored"]},
        {"scenario_index": 42, "scenario": "Second", "responses": {"a": "ra"}},
        {"responses": {}}
    ]"#;

    #[test]
    fn test_parse_with_defaults() {
        let catalog = ScenarioCatalog::from_json(DATASET, 20).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(0).unwrap().responses.len(), 2);
        assert_eq!(catalog.get(2).unwrap().scenario, "");
    }

    #[test]
    fn test_effective_index_prefers_explicit_field() {
        let catalog = ScenarioCatalog::from_json(DATASET, 20).unwrap();
        assert_eq!(catalog.effective_index(0), Some(0));
        assert_eq!(catalog.effective_index(1), Some(42));
        assert_eq!(catalog.effective_index(2), Some(2));
        assert_eq!(catalog.effective_index(3), None);
    }

    #[test]
    fn test_truncated_to_max() {
        let catalog = ScenarioCatalog::from_json(DATASET, 2).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().scenario, "Second");
    }

    #[test]
    fn test_null_prompt_reads_as_empty() {
        let catalog = ScenarioCatalog::from_json(
            r#"[
                {"scenario": null, "responses": {"a": "x", "b": "y"}},
                {"scenario": "ok", "responses": {"a": "x", "b": "y"}}
            ]"#,
            20,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().scenario, "");
        assert_eq!(catalog.get(0).unwrap().responses.len(), 2);
        assert_eq!(catalog.get(1).unwrap().scenario, "ok");
    }

    #[test]
    fn test_null_responses_read_as_empty() {
        let catalog = ScenarioCatalog::from_json(
            r#"[{"scenario": "p", "responses": null}, {"scenario": "q"}]"#,
            20,
        )
        .unwrap();
        assert!(catalog.get(0).unwrap().responses.is_empty());
        assert!(catalog.get(1).unwrap().responses.is_empty());
    }

    #[test]
    fn test_null_response_value_dropped() {
        let catalog = ScenarioCatalog::from_json(
            r#"[
                {"scenario": "p", "responses": {"a": null, "b": "y"}},
                {"scenario": "q", "responses": {"a": null, "b": "y", "c": "z"}}
            ]"#,
            20,
        )
        .unwrap();

        let first = &catalog.get(0).unwrap().responses;
        assert_eq!(first.len(), 1);
        assert_eq!(first.get("b").map(String::as_str), Some("y"));

        let second = &catalog.get(1).unwrap().responses;
        assert_eq!(second.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_non_array_rejected() {
        let err = ScenarioCatalog::from_json(r#"{"scenario": "x"}"#, 20).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
