//! HTTP client for the study API

use std::time::Duration;

use judge_common::api::{
    ErrorResponse, InitResponse, LoginRequest, LoginResponse, NextScenarioResponse,
    SuccessResponse, VoteRequest, VoteResponse,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

const USER_AGENT: &str = concat!("judge-client/", env!("CARGO_PKG_VERSION"));

/// Study API client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Non-2xx response carrying the server's `error` message
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not signed in")]
    NotSignedIn,

    /// Well-formed response the session cannot act on
    #[error("Unexpected response: {0}")]
    Protocol(String),
}

impl ClientError {
    /// Whether the server answered with a rejection of the request itself
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if (400..500).contains(status))
    }
}

/// Study API client
pub struct StudyClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl StudyClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// Sign in and keep the issued token for later requests
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = self.http_client.post(self.url("/auth/login")).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        });
        let response: LoginResponse = send(request).await?;

        tracing::info!(user_id = %response.user_id, "Signed in");
        self.token = Some(response.access_token.clone());
        Ok(response)
    }

    /// Revoke the current token
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let request = self.authorized(self.http_client.post(self.url("/auth/logout")))?;
        let _: SuccessResponse = send(request).await?;
        self.token = None;
        Ok(())
    }

    pub async fn init(&self) -> Result<InitResponse, ClientError> {
        let request = self.authorized(self.http_client.get(self.url("/init")))?;
        send(request).await
    }

    pub async fn next_scenario(&self, position: usize) -> Result<NextScenarioResponse, ClientError> {
        let request = self.authorized(
            self.http_client
                .get(self.url("/next-scenario"))
                .query(&[("position", position)]),
        )?;
        send(request).await
    }

    pub async fn submit_votes(&self, batch: &VoteRequest) -> Result<VoteResponse, ClientError> {
        let request = self.authorized(self.http_client.post(self.url("/vote")).json(batch))?;
        send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.token.as_ref().ok_or(ClientError::NotSignedIn)?;
        Ok(request.bearer_auth(token))
    }
}

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(error_from_body(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
}

fn error_from_body(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::UNAUTHORIZED {
        ClientError::Unauthorized(message)
    } else {
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_message_extracted() {
        let err = error_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"error":"Must provide exactly 2 votes, got 1"}"#,
        );
        assert_eq!(
            err.to_string(),
            "API error 400: Must provide exactly 2 votes, got 1"
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn test_unauthorized_mapped() {
        let err = error_from_body(
            StatusCode::UNAUTHORIZED,
            r#"{"success":false,"error":"Unauthorized"}"#,
        );
        assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Unauthorized"));
    }

    #[test]
    fn test_non_json_error_body_kept() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            err,
            ClientError::Api { status: 502, ref message } if message == "upstream down"
        ));
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_requests_need_token() {
        let client = StudyClient::new("http://127.0.0.1:5760/").unwrap();
        assert!(!client.is_signed_in());
        assert_eq!(client.url("/init"), "http://127.0.0.1:5760/init");

        let request = client.http_client.get(client.url("/init"));
        assert!(matches!(
            client.authorized(request),
            Err(ClientError::NotSignedIn)
        ));
    }
}
