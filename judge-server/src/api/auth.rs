//! Authentication middleware and sign-in endpoints
//!
//! Protected routes expect `Authorization: Bearer <token>`. A valid token
//! attaches an [`AuthenticatedUser`] to the request extensions; anything
//! else is answered with 401 before the handler runs.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use judge_common::api::{parse_bearer, LoginRequest, LoginResponse, SuccessResponse};
use tracing::error;

use super::ApiError;
use crate::identity::{self, AuthenticatedUser};
use crate::AppState;

/// Bearer-token middleware
///
/// **Note:** This is applied to protected routes only.
/// Health and login do NOT use this middleware.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer)
        .map(str::to_string)
        .ok_or(ApiError::Unauthorized)?;

    let user = identity::authenticate(&state.db, &token)
        .await
        .map_err(|e| {
            error!("Token lookup failed: {}", e);
            ApiError::Storage(format!("Authentication lookup failed: {}", e))
        })?
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::Validation(format!("Invalid login request: {}", e)))?;

    let issued = identity::login(&state.db, &request.username, &request.password, state.session_ttl)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    Ok(Json(LoginResponse {
        success: true,
        access_token: issued.access_token,
        user_id: issued.user_id,
        expires_at: issued.expires_at,
    }))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<SuccessResponse>, ApiError> {
    identity::logout(&state.db, &user).await.map_err(|e| {
        error!("Logout failed for {}: {}", user.username, e);
        ApiError::Storage("Logout failed".to_string())
    })?;

    Ok(Json(SuccessResponse { success: true }))
}
