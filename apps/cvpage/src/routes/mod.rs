pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::editing::handlers as editing;
use crate::export::handlers as export;
use crate::page::handlers as page;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Stylesheet, script, photos and the fallback document.
    let assets = ServeDir::new(&state.config.public_dir);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(page::handle_page))
        // Page API
        .route("/api/v1/profile", get(page::handle_get_profile))
        .route("/api/v1/state", get(editing::handle_get_state))
        .route("/api/v1/edit", post(editing::handle_enter_edit))
        .route("/api/v1/save", post(editing::handle_save))
        .route("/api/v1/validate", post(editing::handle_validate))
        .route("/api/v1/reset", post(editing::handle_reset))
        // Export API
        .route(
            "/api/v1/export",
            get(export::handle_export_rendered).post(export::handle_export),
        )
        .fallback_service(assets)
        .with_state(state)
}
