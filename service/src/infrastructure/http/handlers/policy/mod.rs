use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::{AppState, PolicyStore};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::policy::dto::{PolicyRequest, PolicyResponse};

mod dto;

pub async fn get_policy<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<PolicyResponse>, ApiError> {
    let policy = state.policy_store().load().await?;
    Ok(ApiSuccess::new(StatusCode::OK, PolicyResponse::from(policy)))
}

pub async fn put_policy<S: AppState>(
    State(state): State<S>,
    Json(request): Json<PolicyRequest>,
) -> Result<ApiSuccess<PolicyResponse>, ApiError> {
    let policy = request.into_domain();
    state.policy_store().store(&policy).await?;
    Ok(ApiSuccess::new(StatusCode::OK, PolicyResponse::from(policy)))
}
