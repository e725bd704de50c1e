use axum::http::StatusCode;

pub mod content;
pub mod policy;
pub mod render;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
