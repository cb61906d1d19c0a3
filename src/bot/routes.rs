//! REST endpoints for survey progress.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::survey_bot::SurveyBot;

/// GET /api/survey/{conversation_id}
///
/// Returns the conversation's phase, answers so far, and completion time.
async fn get_status(
    State(bot): State<Arc<SurveyBot>>,
    Path(conversation_id): Path<String>,
) -> impl IntoResponse {
    match bot.status(&conversation_id).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            tracing::warn!(conversation_id = %conversation_id, error = %e, "Status lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// GET /api/health
async fn health(State(bot): State<Arc<SurveyBot>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "questions": bot.catalog().len(),
    }))
}

/// Build the survey REST routes.
pub fn survey_routes(bot: Arc<SurveyBot>) -> Router {
    Router::new()
        .route("/api/survey/{conversation_id}", get(get_status))
        .route("/api/health", get(health))
        .with_state(bot)
}
