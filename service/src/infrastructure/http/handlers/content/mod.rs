use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::Value;

use curtain_common::domain::ContentId;

use crate::domain::AppState;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::content::dto::{JobListResponse, RemovedResponse};

mod dto;

/// The save hook: the host posts the freshly saved tree here, and the purge
/// schedule is recomputed from whatever schedules the tree now carries.
pub async fn save_content_tree<S: AppState>(
    Path(content_id): Path<String>,
    State(state): State<S>,
    Json(tree): Json<Value>,
) -> Result<ApiSuccess<JobListResponse>, ApiError> {
    let content_id = ContentId::try_new(content_id)
        .map_err(|err| ApiError::UnprocessableEntity(err.to_string()))?;

    let jobs = state
        .reconciler()
        .reconcile(&content_id, &tree, Utc::now())
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, JobListResponse::new(jobs)))
}

/// The delete/deactivate hook: drops every job the content item still has.
pub async fn remove_content<S: AppState>(
    Path(content_id): Path<String>,
    State(state): State<S>,
) -> Result<ApiSuccess<RemovedResponse>, ApiError> {
    let content_id = ContentId::try_new(content_id)
        .map_err(|err| ApiError::UnprocessableEntity(err.to_string()))?;

    let cancelled = state.reconciler().remove_content(&content_id).await?;

    Ok(ApiSuccess::new(StatusCode::OK, RemovedResponse { cancelled }))
}
