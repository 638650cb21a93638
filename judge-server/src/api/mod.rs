//! HTTP API handlers for judge-server

pub mod auth;
pub mod error;
pub mod health;
pub mod study;

pub use auth::{login, logout, require_bearer};
pub use error::ApiError;
pub use health::health_routes;
pub use study::{init_study, next_scenario, submit_vote};
