use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{self, AuthenticatedUser};
use crate::database::models::NewApiKey;
use crate::error::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::{ApiKey, CreateApiKeyRequest, ErrorResponse, ListKeysQuery};
use crate::AppState;

/// List the caller's API keys, newest first
#[utoipa::path(
    get,
    path = "/api/keys",
    tag = "keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    params(ListKeysQuery),
    responses(
        (status = 200, description = "API keys with masked secrets", body = [ApiKey]),
        (status = 400, description = "Invalid pagination", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_keys(
    caller: AuthenticatedUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListKeysQuery>,
) -> Result<Json<Vec<ApiKey>>, ApiError> {
    query.validate()?;

    let keys = state
        .store
        .list_api_keys(caller.user_id, query.limit(), query.offset())
        .await?;

    Ok(Json(keys.into_iter().map(ApiKey::masked).collect()))
}

/// Generate a new API key. The full key is returned only in this response.
#[utoipa::path(
    post,
    path = "/api/keys",
    tag = "keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "API key created", body = ApiKey),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn create_key(
    caller: AuthenticatedUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiKey>), ApiError> {
    let req = req.normalized();
    req.validate()?;

    let key = auth::generate_api_key();
    let record = state
        .store
        .create_api_key(NewApiKey {
            user_id: caller.user_id,
            name: req.name,
            key_prefix: auth::key_prefix(&key),
            key_hash: auth::hash_api_key(&key),
        })
        .await?;

    tracing::info!("Issued API key {} for user {}", record.id, caller.user_id);
    Ok((StatusCode::CREATED, Json(ApiKey::revealed(record, key))))
}

/// Revoke one of the caller's API keys
#[utoipa::path(
    delete,
    path = "/api/keys/{id}",
    tag = "keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    params(
        ("id" = Uuid, Path, description = "API key ID")
    ),
    responses(
        (status = 204, description = "API key deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "API key not found", body = ErrorResponse)
    )
)]
pub async fn delete_key(
    caller: AuthenticatedUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_api_key(caller.user_id, id).await? {
        return Err(ApiError::NotFound("API key"));
    }

    tracing::info!("Deleted API key {} of user {}", id, caller.user_id);
    Ok(StatusCode::NO_CONTENT)
}
