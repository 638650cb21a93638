//! Vote aggregation
//!
//! A batch carries one vote symbol per criterion for one scenario and one
//! displayed model pair. The whole batch is validated before anything is
//! written. Each criterion is then applied as one atomic upsert; a failure
//! aborts the batch, and upserts for earlier criteria in the same batch stay
//! applied (at-least-once across criteria, never partial within one).

use judge_common::db::{upsert_judgement, JudgementKey};
use judge_common::{normalize_pair, VoteSymbol};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};

/// Vote submission errors
#[derive(Error, Debug)]
pub enum VoteError {
    #[error("Must provide exactly {expected} votes, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Invalid vote value {value:?} at position {}", .index + 1)]
    InvalidSymbol { index: usize, value: String },

    #[error("Invalid model pair: {0}")]
    InvalidPair(String),

    /// `criterion` is 0-based; the message is 1-based
    #[error("Failed to save vote for criterion {}", .criterion + 1)]
    Storage {
        criterion: usize,
        #[source]
        source: judge_common::Error,
    },
}

impl VoteError {
    /// Whether the batch was rejected before any write
    pub fn is_validation(&self) -> bool {
        !matches!(self, VoteError::Storage { .. })
    }
}

/// One submission
#[derive(Debug, Clone, Copy)]
pub struct VoteBatch<'a> {
    pub user_id: &'a str,
    pub dataset: &'a str,
    pub criteria_set: &'a str,
    pub scenario_index: i64,
    /// Model displayed on the left
    pub model1: &'a str,
    /// Model displayed on the right
    pub model2: &'a str,
    pub votes: &'a [String],
}

/// Check count and symbols; returns the parsed symbols in criteria order
pub fn validate_votes(votes: &[String], expected: usize) -> Result<Vec<VoteSymbol>, VoteError> {
    if votes.len() != expected {
        return Err(VoteError::CountMismatch {
            expected,
            actual: votes.len(),
        });
    }

    votes
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            raw.parse::<VoteSymbol>()
                .map_err(|_| VoteError::InvalidSymbol {
                    index,
                    value: raw.clone(),
                })
        })
        .collect()
}

fn validate_pair(model1: &str, model2: &str) -> Result<(), VoteError> {
    if model1.trim().is_empty() || model2.trim().is_empty() {
        return Err(VoteError::InvalidPair(
            "model1 and model2 must not be empty".to_string(),
        ));
    }
    if model1 == model2 {
        return Err(VoteError::InvalidPair(format!(
            "model1 and model2 must differ, both were {:?}",
            model1
        )));
    }
    Ok(())
}

/// Apply a batch, returning the number of records written
pub async fn submit_votes(
    pool: &SqlitePool,
    criteria: &[String],
    batch: &VoteBatch<'_>,
) -> Result<usize, VoteError> {
    let symbols = validate_votes(batch.votes, criteria.len())?;
    validate_pair(batch.model1, batch.model2)?;

    let pair = normalize_pair(batch.model1, batch.model2);

    for (criterion_index, (criterion, symbol)) in criteria.iter().zip(&symbols).enumerate() {
        let key = JudgementKey::new(
            batch.user_id,
            batch.dataset,
            batch.scenario_index,
            batch.criteria_set,
            criterion,
            &pair,
        );
        let tally = symbol.increment().oriented(pair.flipped);

        if let Err(e) = upsert_judgement(pool, &key, tally).await {
            error!(
                "Failed to save vote for criterion {} of scenario {} (user {}): {}",
                criterion_index + 1,
                batch.scenario_index,
                batch.user_id,
                e
            );
            return Err(VoteError::Storage {
                criterion: criterion_index,
                source: e,
            });
        }
    }

    info!(
        "Saved {} votes for scenario {} ({} vs {})",
        symbols.len(),
        batch.scenario_index,
        pair.model_a,
        pair.model_b
    );

    Ok(symbols.len())
}
