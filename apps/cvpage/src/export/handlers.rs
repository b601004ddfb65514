use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::packager::{build_archive, ExportArchive, ARCHIVE_NAME};
use crate::state::AppState;

/// Comma-separated sources left out of the archive because they could not be fetched.
static OMITTED_HEADER: HeaderName = HeaderName::from_static("x-export-omitted");

#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    /// Live page markup; the server-rendered page is used when absent.
    #[serde(default)]
    pub page: Option<String>,
}

/// GET /api/v1/export
///
/// Archives the page as currently rendered by the server.
pub async fn handle_export_rendered(State(state): State<AppState>) -> Result<Response, AppError> {
    export(&state, None).await
}

/// POST /api/v1/export
///
/// Archives the submitted snapshot so unsaved edits are exported as shown.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let page = request.page.filter(|p| !p.trim().is_empty());
    export(&state, page).await
}

async fn export(state: &AppState, page: Option<String>) -> Result<Response, AppError> {
    // Release the controller before any asset is fetched.
    let markup = match page {
        Some(page) => page,
        None => state.controller.lock().await.render_page(),
    };

    let archive = build_archive(&markup, state.assets.as_ref()).await?;
    info!("Exported {} ({})", ARCHIVE_NAME, archive.included.join(", "));
    Ok(archive_response(archive))
}

fn archive_response(archive: ExportArchive) -> Response {
    let disposition = format!("attachment; filename=\"{ARCHIVE_NAME}\"");
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&disposition)
                    .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
            ),
            (OMITTED_HEADER.clone(), omitted_value(&archive)),
        ],
        archive.bytes,
    )
        .into_response()
}

fn omitted_value(archive: &ExportArchive) -> HeaderValue {
    let sources: Vec<&str> = archive.omitted.iter().map(|o| o.source.as_str()).collect();
    HeaderValue::from_str(&sources.join(", "))
        .unwrap_or_else(|_| HeaderValue::from(archive.omitted.len()))
}
