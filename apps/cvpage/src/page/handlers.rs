use axum::{extract::State, response::Html, Json};

use crate::models::profile::Profile;
use crate::state::AppState;

/// GET /
///
/// The full page rendered from the current profile and mode.
pub async fn handle_page(State(state): State<AppState>) -> Html<String> {
    Html(state.controller.lock().await.render_page())
}

/// GET /api/v1/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<Profile> {
    Json(state.controller.lock().await.profile().clone())
}
