use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and page mode.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let (mode, label) = {
        let controller = state.controller.lock().await;
        (controller.mode(), controller.label())
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cvpage",
        "mode": mode.as_str(),
        "label": label.to_string(),
        "resetEnabled": state.config.reset_enabled
    }))
}
