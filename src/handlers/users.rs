use axum::{extract::State, Json};
use validator::Validate;

use super::auth::email_taken;
use crate::auth::{self, AuthenticatedUser};
use crate::database::models::UserChanges;
use crate::error::ApiError;
use crate::extract::AppJson;
use crate::models::{ErrorResponse, UpdateUserRequest, User};
use crate::AppState;

/// Update the current user's name, email or password
#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "users",
    security(("bearer_auth" = []), ("api_key" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn update_me(
    caller: AuthenticatedUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let req = req.normalized();
    req.validate()?;

    let mut changes = UserChanges {
        name: req.name,
        ..Default::default()
    };

    if let Some(email) = req.email {
        if let Some(existing) = state.store.find_user_by_email(&email).await? {
            if existing.id != caller.user_id {
                return Err(ApiError::Conflict("Email already exists".to_string()));
            }
        }
        changes.email = Some(email);
    }

    if let Some(password) = req.password {
        changes.password_hash = Some(auth::hash_password(&password)?);
    }

    let user = if changes.is_empty() {
        state.store.find_user_by_id(caller.user_id).await?
    } else {
        state
            .store
            .update_user(caller.user_id, changes)
            .await
            .map_err(email_taken)?
    };

    let user = user.ok_or(ApiError::NotFound("User"))?;
    tracing::info!("Updated profile of user {}", user.id);
    Ok(Json(user.into()))
}
