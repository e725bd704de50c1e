use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;

use curtain_common::domain::{Schedule, decide};

use crate::domain::{AppState, PolicyStore};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::render::dto::{
    RenderDecisionRequest, RenderDecisionResponse,
};

mod dto;

/// The render hook: the host calls this once per scheduled container it is
/// about to emit, and renders content, placeholder, or nothing accordingly.
pub async fn render_decision<S: AppState>(
    State(state): State<S>,
    Json(request): Json<RenderDecisionRequest>,
) -> Result<ApiSuccess<RenderDecisionResponse>, ApiError> {
    let policy = state.policy_store().load().await?;
    let reference = state.reference_timezone();

    // "now" is materialized exactly once per request; authoring previews may
    // override it to time travel.
    let now = request.at.unwrap_or_else(Utc::now);

    let schedule = Schedule::from_attributes(&request.schedule);
    let viewer = request.viewer.into_domain();

    let decision = decide(now, &schedule, &viewer, &policy, reference);

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RenderDecisionResponse::new(decision, &schedule, reference),
    ))
}
