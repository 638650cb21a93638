//! API module for shared HTTP API functionality
//!
//! Provides credential helpers and the request/response types exchanged
//! between the study server and its clients.
//!
//! This module contains ONLY pure functions and shared types. The server
//! wraps these with axum middleware; the client uses the same types to
//! decode responses.

pub mod auth;
pub mod types;

pub use auth::{
    generate_salt, generate_token, hash_password, hash_token, parse_bearer, verify_password,
};
pub use types::{
    ErrorResponse, HealthResponse, InitResponse, LoginRequest, LoginResponse,
    NextScenarioResponse, ScenarioPayload, SuccessResponse, VoteRequest, VoteResponse,
};
