//! Bearer-token identity
//!
//! Raters sign in with a username and password and receive an opaque access
//! token. Every protected request resolves its token back to a user here.

use chrono::Utc;
use judge_common::api::auth::{generate_token, hash_token, verify_password};
use judge_common::db::{delete_session, find_session, find_user_by_username, insert_session};
use judge_common::Result;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    /// Hash of the presented token, used to revoke it on logout
    pub token_hash: String,
}

/// A freshly issued access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub user_id: String,
    /// Unix seconds
    pub expires_at: i64,
}

/// Check credentials and issue a token; `None` when they don't match
pub async fn login(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    ttl: chrono::Duration,
) -> Result<Option<IssuedToken>> {
    let Some(user) = find_user_by_username(pool, username).await? else {
        debug!("Login for unknown user {}", username);
        return Ok(None);
    };
    if !verify_password(password, &user.password_salt, &user.password_hash) {
        debug!("Login with wrong password for {}", username);
        return Ok(None);
    }

    let access_token = generate_token();
    let expires_at = (Utc::now() + ttl).timestamp();
    insert_session(pool, &hash_token(&access_token), &user.guid, expires_at).await?;

    info!("User {} signed in", user.username);
    Ok(Some(IssuedToken {
        access_token,
        user_id: user.guid,
        expires_at,
    }))
}

/// Resolve a presented token; `None` for unknown or expired tokens
pub async fn authenticate(pool: &SqlitePool, token: &str) -> Result<Option<AuthenticatedUser>> {
    let token_hash = hash_token(token);
    let Some(owner) = find_session(pool, &token_hash).await? else {
        return Ok(None);
    };
    if owner.expires_at <= Utc::now().timestamp() {
        debug!("Rejected expired token for {}", owner.username);
        return Ok(None);
    }

    Ok(Some(AuthenticatedUser {
        user_id: owner.user_guid,
        username: owner.username,
        token_hash,
    }))
}

/// Revoke the token of an authenticated request
pub async fn logout(pool: &SqlitePool, user: &AuthenticatedUser) -> Result<()> {
    if delete_session(pool, &user.token_hash).await? {
        info!("User {} signed out", user.username);
    }
    Ok(())
}
