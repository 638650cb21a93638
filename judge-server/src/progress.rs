//! Progress tracking
//!
//! The set of scenarios a user has already judged is derived from their
//! judgement records; it is not stored separately.

use std::collections::HashSet;

use judge_common::db::judged_scenario_indices;
use sqlx::SqlitePool;
use tracing::warn;

/// Scenario indices `user_id` has judged for this criteria set and dataset
///
/// A storage failure degrades to the empty set: the caller proceeds as if
/// nothing were judged. No record is overwritten by doing so, since further
/// votes only add to existing counters.
pub async fn judged_scenarios(
    pool: &SqlitePool,
    user_id: &str,
    criteria_set: &str,
    dataset: &str,
) -> HashSet<i64> {
    match judged_scenario_indices(pool, user_id, criteria_set, dataset).await {
        Ok(judged) => judged,
        Err(e) => {
            warn!(
                "Failed to load progress for user {} ({} / {}): {}; treating as no progress",
                user_id, criteria_set, dataset, e
            );
            HashSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use judge_common::db::{init_database, upsert_judgement, JudgementKey};
    use judge_common::{normalize_pair, Tally};

    #[tokio::test]
    async fn test_returns_judged_indices() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("judge.db")).await.unwrap();

        let key = JudgementKey::new("u", "d.json", 4, "c.txt", "Be kind.", &normalize_pair("x", "y"));
        upsert_judgement(&pool, &key, Tally::new(1, 0, 0)).await.unwrap();

        let judged = judged_scenarios(&pool, "u", "c.txt", "d.json").await;
        assert_eq!(judged, HashSet::from([4]));
    }

    #[tokio::test]
    async fn test_storage_failure_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("judge.db")).await.unwrap();

        let key = JudgementKey::new("u", "d.json", 4, "c.txt", "Be kind.", &normalize_pair("x", "y"));
        upsert_judgement(&pool, &key, Tally::new(1, 0, 0)).await.unwrap();

        pool.close().await;

        let judged = judged_scenarios(&pool, "u", "c.txt", "d.json").await;
        assert!(judged.is_empty());
    }
}
