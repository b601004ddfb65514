//! Axum route handlers for the edit/save toggle, live validation and reset.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::editing::controller::{
    schedule_label_reset, ControllerState, PageUpdate, CONFIRMATION_DELAY,
};
use crate::editing::validation::{check_field, FieldCheck, ValidatedField};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// Outer HTML of the live page.
    pub page: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub field: ValidatedField,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub field: ValidatedField,
    pub outcome: FieldCheck,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/state
pub async fn handle_get_state(State(state): State<AppState>) -> Json<ControllerState> {
    Json(state.controller.lock().await.state())
}

/// POST /api/v1/edit
///
/// Enters edit mode and returns every region re-rendered as editable.
pub async fn handle_enter_edit(State(state): State<AppState>) -> Json<PageUpdate> {
    Json(state.controller.lock().await.enter_edit())
}

/// POST /api/v1/save
///
/// Validates phone/email in the snapshot, then persists the extracted profile.
/// Invalid fields return 422 with the flagged list and keep the page editing.
pub async fn handle_save(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<PageUpdate>, AppError> {
    if request.page.trim().is_empty() {
        return Err(AppError::Validation("page cannot be empty".to_string()));
    }

    let update = state.controller.lock().await.save(&request.page).await?;
    schedule_label_reset(state.controller.clone(), CONFIRMATION_DELAY);
    Ok(Json(update))
}

/// POST /api/v1/validate
///
/// Per-keystroke check. Blank values come back as `empty`, not `invalid`.
pub async fn handle_validate(Json(request): Json<ValidateRequest>) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        field: request.field,
        outcome: check_field(request.field, &request.value),
    })
}

/// POST /api/v1/reset
pub async fn handle_reset(State(state): State<AppState>) -> Result<Json<PageUpdate>, AppError> {
    let update = state.controller.lock().await.reset().await?;
    Ok(Json(update))
}
