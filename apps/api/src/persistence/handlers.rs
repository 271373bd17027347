use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::optimization::OptimizationRow;
use crate::persistence::history::{delete_optimization, list_optimizations};
use crate::persistence::usage::{get_usage_count, UsageSummary};
use crate::session::SessionContext;
use crate::state::AppState;

/// GET /api/v1/optimizations
pub async fn handle_list_optimizations(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<Vec<OptimizationRow>>, AppError> {
    let user_id = session.user_id.ok_or(AppError::Unauthorized)?;
    Ok(Json(list_optimizations(&state.db, user_id).await?))
}

/// DELETE /api/v1/optimizations/:id
pub async fn handle_delete_optimization(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user_id = session.user_id.ok_or(AppError::Unauthorized)?;
    if delete_optimization(&state.db, id, user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Optimization {id} not found")))
    }
}

/// GET /api/v1/usage
pub async fn handle_get_usage(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<UsageSummary>, AppError> {
    let key = session.usage_key().ok_or_else(|| {
        AppError::Validation("an x-session-id or x-user-id header is required".to_string())
    })?;
    let count = get_usage_count(&state.db, &key).await?;
    let limit = session
        .is_anonymous()
        .then_some(state.config.free_trial_limit);
    Ok(Json(UsageSummary::new(count, limit)))
}
