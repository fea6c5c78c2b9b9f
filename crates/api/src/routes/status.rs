use axum::extract::State;
use axum::{routing::get, Json, Router};
use homegate_core::summary::Summary;

use crate::state::AppState;

/// GET /status -- summary of the most recent monitor run.
///
/// Before the first run finishes this is the empty summary.
async fn latest_status(State(state): State<AppState>) -> Json<Summary> {
    Json(state.status.get().await)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(latest_status))
}
