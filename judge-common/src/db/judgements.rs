//! Judgement record queries
//!
//! One row per (user, dataset, scenario, criteria set, criterion, canonical
//! model pair). Counters only ever grow; rows are never deleted here.

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::vote::{CanonicalPair, Tally};
use crate::Result;

/// Storage key of one judgement record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JudgementKey {
    pub user_id: String,
    pub dataset_path: String,
    pub scenario_index: i64,
    pub criteria_set_path: String,
    pub criterion: String,
    /// Case-insensitively smaller model name
    pub model_a: String,
    pub model_b: String,
}

impl JudgementKey {
    pub fn new(
        user_id: &str,
        dataset_path: &str,
        scenario_index: i64,
        criteria_set_path: &str,
        criterion: &str,
        pair: &CanonicalPair,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            dataset_path: dataset_path.to_string(),
            scenario_index,
            criteria_set_path: criteria_set_path.to_string(),
            criterion: criterion.to_string(),
            model_a: pair.model_a.clone(),
            model_b: pair.model_b.clone(),
        }
    }
}

/// Persisted row of `human_judgements`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct JudgementRecord {
    pub guid: String,
    pub user_id: String,
    pub dataset_path: String,
    pub scenario_index: i64,
    pub constitution_path: String,
    pub criterion: String,
    pub model1: String,
    pub model2: String,
    pub win1: i64,
    pub tie: i64,
    pub win2: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl JudgementRecord {
    pub fn tally(&self) -> Tally {
        Tally::new(self.win1, self.tie, self.win2)
    }
}

/// Add `tally` to the record at `key`, creating it on first vote
///
/// `tally` must already be oriented to (model_a, model_b). The increment is
/// a single `INSERT .. ON CONFLICT DO UPDATE` statement evaluated against the
/// row as it is at write time, so concurrent submissions for the same key
/// cannot lose an increment.
pub async fn upsert_judgement(pool: &SqlitePool, key: &JudgementKey, tally: Tally) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO human_judgements
            (guid, user_id, dataset_path, scenario_index, constitution_path, criterion,
             model1, model2, win1, tie, win2)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id, dataset_path, scenario_index, constitution_path, criterion, model1, model2)
        DO UPDATE SET
            win1 = human_judgements.win1 + excluded.win1,
            tie = human_judgements.tie + excluded.tie,
            win2 = human_judgements.win2 + excluded.win2,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&key.user_id)
    .bind(&key.dataset_path)
    .bind(key.scenario_index)
    .bind(&key.criteria_set_path)
    .bind(&key.criterion)
    .bind(&key.model_a)
    .bind(&key.model_b)
    .bind(tally.win1)
    .bind(tally.tie)
    .bind(tally.win2)
    .execute(pool)
    .await?;

    Ok(())
}

/// Distinct scenario indices the user has records for
///
/// Unpaginated; a user may have any number of records.
pub async fn judged_scenario_indices(
    pool: &SqlitePool,
    user_id: &str,
    criteria_set_path: &str,
    dataset_path: &str,
) -> Result<HashSet<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT scenario_index FROM human_judgements
        WHERE user_id = ? AND constitution_path = ? AND dataset_path = ?
        "#,
    )
    .bind(user_id)
    .bind(criteria_set_path)
    .bind(dataset_path)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(index,)| index).collect())
}

/// All records for one user in one study, ordered by scenario then criterion
pub async fn list_judgements(
    pool: &SqlitePool,
    user_id: &str,
    dataset_path: &str,
    criteria_set_path: &str,
) -> Result<Vec<JudgementRecord>> {
    let records = sqlx::query_as::<_, JudgementRecord>(
        r#"
        SELECT guid, user_id, dataset_path, scenario_index, constitution_path, criterion,
               model1, model2, win1, tie, win2, created_at, updated_at
        FROM human_judgements
        WHERE user_id = ? AND dataset_path = ? AND constitution_path = ?
        ORDER BY scenario_index, criterion, model1, model2
        "#,
    )
    .bind(user_id)
    .bind(dataset_path)
    .bind(criteria_set_path)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_database;
    use crate::vote::normalize_pair;

    fn key(scenario_index: i64, criterion: &str) -> JudgementKey {
        JudgementKey::new(
            "user-1",
            "Datasets/evaluations.json",
            scenario_index,
            "Constitutions/Kindness.txt",
            criterion,
            &normalize_pair("Claude", "gpt-4"),
        )
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("judge.db")).await.unwrap();

        upsert_judgement(&pool, &key(0, "Be kind."), Tally::new(1, 0, 0))
            .await
            .unwrap();
        upsert_judgement(&pool, &key(0, "Be kind."), Tally::new(0, 1, 0))
            .await
            .unwrap();

        let records = list_judgements(
            &pool,
            "user-1",
            "Datasets/evaluations.json",
            "Constitutions/Kindness.txt",
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tally(), Tally::new(1, 1, 0));
        assert_eq!(records[0].model1, "Claude");
        assert_eq!(records[0].model2, "gpt-4");
    }

    #[tokio::test]
    async fn test_distinct_indices_scoped_by_user_and_study() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("judge.db")).await.unwrap();

        for criterion in ["A", "B"] {
            upsert_judgement(&pool, &key(3, criterion), Tally::new(0, 0, 1))
                .await
                .unwrap();
        }
        upsert_judgement(&pool, &key(5, "A"), Tally::new(1, 0, 0))
            .await
            .unwrap();

        let mut other_user = key(9, "A");
        other_user.user_id = "user-2".to_string();
        upsert_judgement(&pool, &other_user, Tally::new(1, 0, 0))
            .await
            .unwrap();

        let judged = judged_scenario_indices(
            &pool,
            "user-1",
            "Constitutions/Kindness.txt",
            "Datasets/evaluations.json",
        )
        .await
        .unwrap();
        assert_eq!(judged, HashSet::from([3, 5]));

        let other_study = judged_scenario_indices(
            &pool,
            "user-1",
            "Constitutions/Other.txt",
            "Datasets/evaluations.json",
        )
        .await
        .unwrap();
        assert!(other_study.is_empty());
    }
}
