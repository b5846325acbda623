use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use silvia_common::FieldId;

use crate::panel::{Panel, UserIntent};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct FocusUpdate {
    field: FieldId,
    focused: bool,
}

pub fn router(panel: Panel) -> Router {
    Router::new()
        .route("/api/view", get(handle_get_view))
        .route("/api/chart", get(handle_get_chart))
        .route("/api/status", get(handle_get_status))
        .route("/api/intent", post(handle_post_intent))
        .route("/api/focus", post(handle_post_focus))
        .with_state(panel)
}

async fn handle_get_view(State(panel): State<Panel>) -> impl IntoResponse {
    Json(panel.snapshot().await)
}

async fn handle_get_chart(State(panel): State<Panel>) -> impl IntoResponse {
    Json(panel.chart().await)
}

async fn handle_get_status(State(panel): State<Panel>) -> axum::response::Response {
    match panel.last_status().await {
        Some(status) => Json(status).into_response(),
        None => error_response(StatusCode::SERVICE_UNAVAILABLE, "no status received yet"),
    }
}

async fn handle_post_intent(
    State(panel): State<Panel>,
    Json(intent): Json<UserIntent>,
) -> axum::response::Response {
    match panel.dispatch(intent).await {
        Ok(()) => Json(panel.snapshot().await).into_response(),
        Err(err) => error_response(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string()),
    }
}

async fn handle_post_focus(
    State(panel): State<Panel>,
    Json(update): Json<FocusUpdate>,
) -> impl IntoResponse {
    panel.set_focus(update.field, update.focused).await;
    StatusCode::NO_CONTENT
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
