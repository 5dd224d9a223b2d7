use axum::{extract::State, Json};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{ErrorResponse, MetricsResponse};
use crate::AppState;

/// Usage totals for the caller's keys
#[utoipa::path(
    get,
    path = "/api/metrics",
    tag = "metrics",
    security(("bearer_auth" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Usage summary", body = MetricsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn get_metrics(
    caller: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let summary = state.store.usage_summary(caller.user_id).await?;
    Ok(Json(summary.into()))
}
