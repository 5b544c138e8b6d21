use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::AssetStatus;
use sea_orm::DbErr;
use serde::Serialize;

use crate::lifecycle::LifecycleError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `ACCOUNT_DISABLED`,
    /// `PERMISSION_DENIED`, `NOT_FOUND`, `CONFLICT`, `INVALID_TRANSITION`,
    /// `USER_INACTIVE`, `INTERNAL_ERROR`.
    #[schema(example = "INVALID_TRANSITION")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Cannot checkout asset 7: asset is assigned")]
    pub message: String,
    /// Status the asset was in when a lifecycle operation was refused.
    /// Only present for `INVALID_TRANSITION`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "assigned")]
    pub current_status: Option<AssetStatus>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    AccountDisabled,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    /// A lifecycle operation was refused because of the asset's current status.
    InvalidTransition {
        current: AssetStatus,
        message: String,
    },
    UserInactive(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message, current_status) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_MISSING",
                "Authentication required".into(),
                None,
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".into(),
                None,
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username or password".into(),
                None,
            ),
            AppError::AccountDisabled => (
                StatusCode::FORBIDDEN,
                "ACCOUNT_DISABLED",
                "Account is disabled".into(),
                None,
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "Insufficient permissions".into(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            AppError::InvalidTransition { current, message } => (
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
                message,
                Some(current),
            ),
            AppError::UserInactive(msg) => (StatusCode::CONFLICT, "USER_INACTIVE", msg, None),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".into(),
                    None,
                )
            }
        };

        (
            status,
            ErrorBody {
                code,
                message,
                current_status,
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation(msg) => AppError::Validation(msg),
            LifecycleError::NotFound { .. } => AppError::NotFound(err.to_string()),
            LifecycleError::Conflict { current, .. } => {
                tracing::debug!("Lifecycle conflict: {err}");
                AppError::InvalidTransition {
                    current,
                    message: err.to_string(),
                }
            }
            LifecycleError::InactiveUser(_) => AppError::UserInactive(err.to_string()),
            LifecycleError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}
