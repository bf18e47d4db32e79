use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/health. Liveness plus which roadmap generator is active.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "llm": app.llm.is_some(),
    }))
}
