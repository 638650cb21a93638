//! User accounts and issued access tokens

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::auth::{generate_salt, hash_password};
use crate::{Error, Result};

/// Row of `users`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAccount {
    pub guid: String,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// Owner of a stored access token
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionOwner {
    pub user_guid: String,
    pub username: String,
    /// Unix seconds
    pub expires_at: i64,
}

/// Create a user with a freshly salted password hash, returning its guid
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("Username must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(Error::InvalidInput("Password must not be empty".to_string()));
    }

    let guid = Uuid::new_v4().to_string();
    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    let result = sqlx::query(
        "INSERT INTO users (guid, username, password_hash, password_salt) VALUES (?, ?, ?, ?)",
    )
    .bind(&guid)
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(guid),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::InvalidInput(
            format!("User {} already exists", username),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserAccount>> {
    let user = sqlx::query_as::<_, UserAccount>(
        "SELECT guid, username, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Store a token hash for `user_guid`
pub async fn insert_session(
    pool: &SqlitePool,
    token_hash: &str,
    user_guid: &str,
    expires_at: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO auth_sessions (token_hash, user_guid, expires_at) VALUES (?, ?, ?)")
        .bind(token_hash)
        .bind(user_guid)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Look up the owner of a token hash; expiry is checked by the caller
pub async fn find_session(pool: &SqlitePool, token_hash: &str) -> Result<Option<SessionOwner>> {
    let owner = sqlx::query_as::<_, SessionOwner>(
        r#"
        SELECT s.user_guid AS user_guid, u.username AS username, s.expires_at AS expires_at
        FROM auth_sessions s
        JOIN users u ON u.guid = s.user_guid
        WHERE s.token_hash = ?
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(owner)
}

/// Revoke a token; returns whether it existed
pub async fn delete_session(pool: &SqlitePool, token_hash: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM auth_sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Drop every token that expired before `now` (unix seconds)
pub async fn purge_expired_sessions(pool: &SqlitePool, now: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
