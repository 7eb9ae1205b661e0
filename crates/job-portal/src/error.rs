use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::candidates::PortalError;
use crate::workflows::priority::TrainingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Portal(PortalError),
    Training(TrainingError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Portal(err) => write!(f, "candidate portal error: {}", err),
            AppError::Training(err) => write!(f, "model training error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Portal(err) => Some(err),
            AppError::Training(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Portal(PortalError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Portal(PortalError::DuplicateUsername(_)) | AppError::Training(_) => {
                StatusCode::CONFLICT
            }
            AppError::Portal(PortalError::NotFound(_) | PortalError::Queue(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Portal(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PortalError> for AppError {
    fn from(value: PortalError) -> Self {
        Self::Portal(value)
    }
}

impl From<TrainingError> for AppError {
    fn from(value: TrainingError) -> Self {
        Self::Training(value)
    }
}
