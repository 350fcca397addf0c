use analytics::AnalyticsError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::{ErrorKind, ProtocolError};
use engine::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

fn protocol_status(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Authorization => (StatusCode::FORBIDDEN, "authorization"),
        ErrorKind::Validation => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
        ErrorKind::StateConflict => (StatusCode::CONFLICT, "state_conflict"),
        ErrorKind::PolicyGating => (StatusCode::PRECONDITION_FAILED, "policy"),
        ErrorKind::Lookup => (StatusCode::NOT_FOUND, "lookup"),
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error, kind) = match &self {
            AppError::Engine(EngineError::Protocol(e)) | AppError::Protocol(e) => {
                let (status, kind) = protocol_status(e.kind());
                (status, e.name(), kind)
            }
            AppError::Engine(EngineError::Custody(e)) => {
                tracing::error!(error = ?e, "Custody error.");
                (StatusCode::INTERNAL_SERVER_ERROR, "CustodyError", "custody")
            }
            AppError::Engine(EngineError::Storage(e)) => {
                tracing::error!(error = ?e, "Storage error.");
                (StatusCode::INTERNAL_SERVER_ERROR, "StorageError", "storage")
            }
            AppError::Engine(EngineError::Configuration(e)) => {
                tracing::error!(error = %e, "Configuration error.");
                (StatusCode::INTERNAL_SERVER_ERROR, "ConfigurationError", "internal")
            }
            AppError::Analytics(e) => {
                tracing::error!(error = ?e, "Analytics error.");
                (StatusCode::INTERNAL_SERVER_ERROR, "AnalyticsError", "internal")
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest", "request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", "lookup"),
        };

        let body = Json(json!({ "error": error, "message": message, "kind": kind }));
        (status, body).into_response()
    }
}
