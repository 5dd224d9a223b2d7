use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use super::models::*;
use crate::db::DatabaseError;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const API_KEY_COLUMNS: &str =
    "id, user_id, name, key_prefix, key_hash, usage_count, created_at, last_used";

// User queries
pub async fn create_user(pool: &PgPool, new_user: &NewUser) -> Result<UserRecord, DatabaseError> {
    let result = sqlx::query_as::<_, UserRecord>(&format!(
        "INSERT INTO users (name, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => {
            debug!("Created user {}", user.id);
            Ok(user)
        }
        Err(e) => {
            let err = DatabaseError::from(e);
            if !matches!(err, DatabaseError::AlreadyExists) {
                error!("Failed to create user: {}", err);
            }
            Err(err)
        }
    }
}

pub async fn get_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, DatabaseError> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn update_user(
    pool: &PgPool,
    user_id: Uuid,
    changes: &UserChanges,
) -> Result<Option<UserRecord>, DatabaseError> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "UPDATE users SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            updated_at = NOW()
         WHERE id = $1
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(&changes.name)
    .bind(&changes.email)
    .bind(&changes.password_hash)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

// API key queries
pub async fn create_api_key(pool: &PgPool, new_key: &NewApiKey) -> Result<ApiKeyRecord, DatabaseError> {
    let key = sqlx::query_as::<_, ApiKeyRecord>(&format!(
        "INSERT INTO api_keys (user_id, name, key_prefix, key_hash)
         VALUES ($1, $2, $3, $4)
         RETURNING {API_KEY_COLUMNS}"
    ))
    .bind(new_key.user_id)
    .bind(&new_key.name)
    .bind(&new_key.key_prefix)
    .bind(&new_key.key_hash)
    .fetch_one(pool)
    .await?;

    debug!("Created API key {} for user {}", key.id, key.user_id);
    Ok(key)
}

pub async fn list_api_keys(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<ApiKeyRecord>, DatabaseError> {
    let keys = sqlx::query_as::<_, ApiKeyRecord>(&format!(
        "SELECT {API_KEY_COLUMNS} FROM api_keys
         WHERE user_id = $1
         ORDER BY created_at DESC, id
         LIMIT $2 OFFSET $3"
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(keys)
}

pub async fn delete_api_key(pool: &PgPool, user_id: Uuid, key_id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND user_id = $2")
        .bind(key_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count one use of the key and stamp `last_used`, in a single statement.
pub async fn record_api_key_use(
    pool: &PgPool,
    key_hash: &str,
) -> Result<Option<ApiKeyRecord>, DatabaseError> {
    let key = sqlx::query_as::<_, ApiKeyRecord>(&format!(
        "UPDATE api_keys
         SET usage_count = usage_count + 1, last_used = NOW()
         WHERE key_hash = $1
         RETURNING {API_KEY_COLUMNS}"
    ))
    .bind(key_hash)
    .fetch_optional(pool)
    .await?;

    Ok(key)
}

pub async fn usage_summary(pool: &PgPool, user_id: Uuid) -> Result<UsageSummary, DatabaseError> {
    let summary = sqlx::query_as::<_, UsageSummary>(
        "SELECT
            COUNT(*)::BIGINT AS total_keys,
            COALESCE(SUM(usage_count), 0)::BIGINT AS total_usage,
            MAX(last_used) AS last_used
         FROM api_keys
         WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(summary)
}

pub async fn ping(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
