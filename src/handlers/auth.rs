use axum::{extract::State, http::StatusCode, Json};
use secrecy::ExposeSecret;
use validator::Validate;

use crate::auth::{self, AuthenticatedUser};
use crate::database::models::NewUser;
use crate::db::DatabaseError;
use crate::error::ApiError;
use crate::extract::AppJson;
use crate::models::{ErrorResponse, LoginRequest, LoginResponse, RegisterRequest, User};
use crate::AppState;

pub(crate) fn email_taken(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::AlreadyExists => ApiError::Conflict("Email already exists".to_string()),
        other => other.into(),
    }
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let req = req.normalized();
    req.validate()?;

    if state.store.find_user_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = auth::hash_password(&req.password)?;

    let user = state
        .store
        .create_user(NewUser {
            name: Some(req.name),
            email: req.email,
            password_hash,
        })
        .await
        .map_err(email_taken)?;

    tracing::info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let req = req.normalized();
    req.validate()?;

    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!("Rejected login for user {}", user.id);
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::issue_token(
        user.id,
        state.config.auth.jwt_secret.expose_secret().as_bytes(),
        state.config.auth.jwt_expiration_seconds,
    )?;

    tracing::info!("User {} logged in", user.id);
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_auth" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn me(
    caller: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .find_user_by_id(caller.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user.into()))
}
