//! Assistant prompt box.

use axum::{Json, Router, routing::post};
use serde::Deserialize;

use launchkit_core::intent::{Intent, detect};

use crate::state::AppState;

/// Build the intent router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/agent-intent", post(agent_intent))
}

/// Request body for intent detection.
#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub prompt: String,
}

/// POST /api/agent-intent - Map free text to a dashboard action.
async fn agent_intent(Json(body): Json<IntentRequest>) -> Json<Intent> {
    Json(detect(&body.prompt))
}
