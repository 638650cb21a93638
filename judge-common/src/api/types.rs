//! Shared API request/response types
//!
//! Serialized by the server and decoded by the client. Field names are the
//! JSON contract of the study endpoints.

use serde::{Deserialize, Serialize};

use crate::vote::VoteSymbol;

// ========================================
// Study Endpoints
// ========================================

/// `GET /init` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    pub success: bool,
    /// Scenarios remaining for this user
    pub total_scenarios: usize,
    pub criteria_count: usize,
    /// Distinct scenarios this user has already judged
    pub completed_scenarios: usize,
    pub criteria: Vec<String>,
}

/// Normal `GET /next-scenario` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPayload {
    pub success: bool,
    pub complete: bool,
    /// Prompt text
    pub scenario: String,
    pub scenario_index: i64,
    /// Left response
    pub response1: String,
    /// Right response
    pub response2: String,
    /// Model that produced `response1`
    pub model1: String,
    /// Model that produced `response2`
    pub model2: String,
    pub criteria: Vec<String>,
    pub criterion_total: usize,
    /// 1-based position within the remaining sequence
    pub scenario_number: usize,
    /// Length of the remaining sequence
    pub scenario_total: usize,
}

/// `GET /next-scenario` response in all three shapes
///
/// Variant order matters for decoding: the most specific shape is tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextScenarioResponse {
    Scenario(ScenarioPayload),
    Skip {
        success: bool,
        complete: bool,
        skip: bool,
        #[serde(rename = "nextPosition")]
        next_position: usize,
    },
    Complete {
        success: bool,
        complete: bool,
    },
}

impl NextScenarioResponse {
    pub fn complete() -> Self {
        NextScenarioResponse::Complete {
            success: true,
            complete: true,
        }
    }

    pub fn skip(next_position: usize) -> Self {
        NextScenarioResponse::Skip {
            success: true,
            complete: false,
            skip: true,
            next_position,
        }
    }
}

/// `POST /vote` request body
///
/// Votes travel as raw strings so the server can report which symbol was
/// invalid instead of failing the whole body decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub votes: Vec<String>,
    pub scenario_index: i64,
    pub model1: String,
    pub model2: String,
}

impl VoteRequest {
    pub fn new(
        votes: &[VoteSymbol],
        scenario_index: i64,
        model1: impl Into<String>,
        model2: impl Into<String>,
    ) -> Self {
        Self {
            votes: votes.iter().map(|v| v.as_str().to_string()).collect(),
            scenario_index,
            model1: model1.into(),
            model2: model2.into(),
        }
    }
}

/// `POST /vote` success response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub success: bool,
    pub next_scenario: bool,
}

// ========================================
// Auth Endpoints
// ========================================

/// `POST /auth/login` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /auth/login` success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
    pub user_id: String,
    /// Unix seconds
    pub expires_at: i64,
}

// ========================================
// Generic Responses
// ========================================

/// Bare `{ "success": true }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error body returned with every non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `GET /health` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skip_uses_camel_case_next_position() {
        let value = serde_json::to_value(NextScenarioResponse::skip(4)).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "complete": false, "skip": true, "nextPosition": 4})
        );
    }

    #[test]
    fn test_decode_each_shape() {
        let complete: NextScenarioResponse =
            serde_json::from_value(json!({"success": true, "complete": true})).unwrap();
        assert_eq!(complete, NextScenarioResponse::complete());

        let skip: NextScenarioResponse = serde_json::from_value(
            json!({"success": true, "complete": false, "skip": true, "nextPosition": 2}),
        )
        .unwrap();
        assert_eq!(skip, NextScenarioResponse::skip(2));

        let scenario: NextScenarioResponse = serde_json::from_value(json!({
            "success": true,
            "complete": false,
            "scenario": "prompt",
            "scenario_index": 7,
            "response1": "r1",
            "response2": "r2",
            "model1": "m1",
            "model2": "m2",
            "criteria": ["c1", "c2"],
            "criterion_total": 2,
            "scenario_number": 1,
            "scenario_total": 3
        }))
        .unwrap();
        match scenario {
            NextScenarioResponse::Scenario(payload) => {
                assert_eq!(payload.scenario_index, 7);
                assert_eq!(payload.model2, "m2");
            }
            other => panic!("expected scenario, got {:?}", other),
        }
    }

    #[test]
    fn test_vote_request_encodes_symbols() {
        let request = VoteRequest::new(
            &[VoteSymbol::LeftWins, VoteSymbol::BothMissed],
            3,
            "a",
            "b",
        );
        assert_eq!(request.votes, vec!["1", "b"]);
    }
}
