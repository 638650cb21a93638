//! Criteria loading
//!
//! A criteria set is a plain text resource with one evaluation statement per
//! line. Position in the list is the criterion's identity within a session.
//! Criterion text is part of the stored judgement key, so a set may not
//! repeat a line.

use std::collections::HashSet;
use std::path::Path;

use crate::{Error, Result};

/// Ordered list of criteria loaded from one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaSet {
    /// Resource key as recorded in judgement records
    pub key: String,
    pub criteria: Vec<String>,
}

impl CriteriaSet {
    /// Read `data_root/key` and parse it
    pub async fn load(data_root: &Path, key: &str) -> Result<Self> {
        let path = data_root.join(key);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::Config(format!("Failed to read criteria {}: {}", path.display(), e))
        })?;
        Self::from_text(key, &content)
    }

    /// Parse criteria text; an empty set or a repeated line is rejected
    pub fn from_text(key: &str, content: &str) -> Result<Self> {
        let criteria = parse_criteria(content);
        if criteria.is_empty() {
            return Err(Error::Config(format!("Criteria set {} has no criteria", key)));
        }

        let mut seen = HashSet::with_capacity(criteria.len());
        if let Some(duplicate) = criteria.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(Error::Config(format!(
                "Criteria set {} repeats criterion {:?}",
                key, duplicate
            )));
        }
        Ok(Self {
            key: key.to_string(),
            criteria,
        })
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Split into trimmed, non-empty lines
pub fn parse_criteria(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_drops_blank_lines() {
        let text = "  Be kind.  \n\n\tAvoid harm.\r\n   \nBe honest.";
        assert_eq!(
            parse_criteria(text),
            vec!["Be kind.", "Avoid harm.", "Be honest."]
        );
    }

    #[test]
    fn test_empty_set_rejected() {
        let err = CriteriaSet::from_text("empty.txt", "\n  \n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_repeated_criterion_rejected() {
        let err = CriteriaSet::from_text("dup.txt", "Be kind.\nBe honest.\n  Be kind.  \n").unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains("\"Be kind.\""), "{}", msg),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_from_data_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Constitutions")).unwrap();
        std::fs::write(dir.path().join("Constitutions/Kindness.txt"), "A\nB\n").unwrap();

        let set = CriteriaSet::load(dir.path(), "Constitutions/Kindness.txt")
            .await
            .unwrap();
        assert_eq!(set.key, "Constitutions/Kindness.txt");
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_resource_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CriteriaSet::load(dir.path(), "nope.txt").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
