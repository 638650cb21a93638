//! Study endpoints
//!
//! Criteria and dataset are read from the configured resources on every
//! request; the only state carried between requests is the rater's judged
//! records and the position the client sends back.

use std::collections::HashSet;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use judge_common::api::{
    InitResponse, NextScenarioResponse, ScenarioPayload, VoteRequest, VoteResponse,
};
use judge_common::{CriteriaSet, ScenarioCatalog};
use serde::Deserialize;
use tracing::{debug, error};

use super::ApiError;
use crate::aggregator::{self, VoteBatch};
use crate::identity::AuthenticatedUser;
use crate::sequencer::{self, Selection};
use crate::{progress, AppState};

/// Everything a study request needs, loaded fresh per request
struct StudyView {
    criteria: CriteriaSet,
    catalog: ScenarioCatalog,
    judged: HashSet<i64>,
    remaining: Vec<usize>,
}

async fn load_criteria(state: &AppState) -> Result<CriteriaSet, ApiError> {
    CriteriaSet::load(&state.study.data_root, &state.study.criteria_set)
        .await
        .map_err(|e| {
            error!("Failed to load criteria: {}", e);
            ApiError::Internal(e.to_string())
        })
}

async fn load_view(state: &AppState, user: &AuthenticatedUser) -> Result<StudyView, ApiError> {
    let study = &state.study;
    let criteria = load_criteria(state).await?;
    let catalog = ScenarioCatalog::load(&study.data_root, &study.dataset, study.max_scenarios)
        .await
        .map_err(|e| {
            error!("Failed to load dataset: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    let judged =
        progress::judged_scenarios(&state.db, &user.user_id, &study.criteria_set, &study.dataset)
            .await;
    let remaining = sequencer::remaining_indices(&catalog, &judged);

    Ok(StudyView {
        criteria,
        catalog,
        judged,
        remaining,
    })
}

/// GET /init
pub async fn init_study(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<InitResponse>, ApiError> {
    let view = load_view(&state, &user).await?;

    debug!(
        "Init for {}: {} remaining, {} judged",
        user.username,
        view.remaining.len(),
        view.judged.len()
    );

    Ok(Json(InitResponse {
        success: true,
        total_scenarios: view.remaining.len(),
        criteria_count: view.criteria.len(),
        completed_scenarios: view.judged.len(),
        criteria: view.criteria.criteria,
    }))
}

/// Query parameters for `GET /next-scenario`
#[derive(Debug, Deserialize)]
pub struct NextScenarioQuery {
    /// 0-based position within the remaining sequence
    #[serde(default)]
    pub position: usize,
}

/// GET /next-scenario?position=<n>
pub async fn next_scenario(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    query: Result<Query<NextScenarioQuery>, QueryRejection>,
) -> Result<Json<NextScenarioResponse>, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::Validation(format!("Invalid position: {}", e)))?;
    let view = load_view(&state, &user).await?;

    let response = match sequencer::scenario_at(&view.catalog, &view.remaining, query.position) {
        Selection::Complete => NextScenarioResponse::complete(),
        Selection::Skip { next_position } => {
            debug!(
                "Skipping position {} for {}: fewer than two responses",
                query.position, user.username
            );
            NextScenarioResponse::skip(next_position)
        }
        Selection::Ready(pick) => NextScenarioResponse::Scenario(ScenarioPayload {
            success: true,
            complete: false,
            scenario: pick.prompt,
            scenario_index: pick.scenario_index,
            response1: pick.left_response,
            response2: pick.right_response,
            model1: pick.left_model,
            model2: pick.right_model,
            criterion_total: view.criteria.len(),
            criteria: view.criteria.criteria,
            scenario_number: pick.scenario_number,
            scenario_total: pick.scenario_total,
        }),
    };

    Ok(Json(response))
}

/// POST /vote
pub async fn submit_vote(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::Validation(format!("Invalid vote batch: {}", e)))?;
    let criteria = load_criteria(&state).await?;

    let batch = VoteBatch {
        user_id: &user.user_id,
        dataset: &state.study.dataset,
        criteria_set: &state.study.criteria_set,
        scenario_index: request.scenario_index,
        model1: &request.model1,
        model2: &request.model2,
        votes: &request.votes,
    };
    aggregator::submit_votes(&state.db, &criteria.criteria, &batch).await?;

    Ok(Json(VoteResponse {
        success: true,
        next_scenario: true,
    }))
}
