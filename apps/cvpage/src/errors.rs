use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editing::controller::{FlaggedField, ResetError, SaveError};
use crate::export::packager::ExportError;
use crate::storage::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{message}")]
    SaveRejected {
        message: String,
        flagged: Vec<FlaggedField>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SaveError> for AppError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Rejected { ref flagged } => AppError::SaveRejected {
                message: err.to_string(),
                flagged: flagged.clone(),
            },
            SaveError::NotEditing => AppError::Conflict(err.to_string()),
            SaveError::Extract(e) => AppError::Validation(e.to_string()),
            SaveError::Store(e) => AppError::Storage(e),
        }
    }
}

impl From<ResetError> for AppError {
    fn from(err: ResetError) -> Self {
        match err {
            ResetError::Disabled => AppError::Forbidden(err.to_string()),
            ResetError::Store(e) => AppError::Storage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::SaveRejected { message, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_FIELDS",
                message.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "The profile could not be stored".to_string(),
                )
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "The archive could not be built".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::SaveRejected { flagged, .. } = &self {
            error["flagged"] = json!(flagged);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::validation::ValidatedField;

    #[test]
    fn test_rejected_save_maps_to_unprocessable() {
        let err: AppError = SaveError::Rejected {
            flagged: vec![FlaggedField {
                field: ValidatedField::Phone,
                value: "abc".into(),
            }],
        }
        .into();
        assert!(matches!(err, AppError::SaveRejected { ref flagged, .. } if flagged.len() == 1));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_reset_disabled_maps_to_forbidden() {
        let err: AppError = ResetError::Disabled.into();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_save_outside_edit_mode_maps_to_conflict() {
        let err: AppError = SaveError::NotEditing.into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
