//! judge-server library - human-judgement study service
//!
//! Serves scenario/response pairs to authenticated raters one at a time and
//! accumulates their pairwise votes per criterion.

use std::sync::Arc;

use axum::Router;
use judge_common::config::MAX_SESSION_TTL_HOURS;
use judge_common::StudyConfig;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod aggregator;
pub mod api;
pub mod cli;
pub mod identity;
pub mod logging;
pub mod progress;
pub mod sequencer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Study resources, read by every request
    pub study: Arc<StudyConfig>,
    /// Lifetime of issued access tokens
    pub session_ttl: chrono::Duration,
}

impl AppState {
    /// Create new application state
    ///
    /// The token lifetime is clamped to `1..=MAX_SESSION_TTL_HOURS`.
    pub fn new(db: SqlitePool, study: StudyConfig, session_ttl_hours: i64) -> Self {
        let hours = session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS);
        Self {
            db,
            study: Arc::new(study),
            session_ttl: chrono::Duration::hours(hours),
        }
    }
}

/// Build application router
///
/// Study endpoints and logout require a bearer token; login and health do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/init", get(api::init_study))
        .route("/next-scenario", get(api::next_scenario))
        .route("/vote", post(api::submit_vote))
        .route("/auth/logout", post(api::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_bearer,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/auth/login", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
