use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::incidences::IncidenceError;
use crate::workflows::master_data::MasterDataError;
use crate::workflows::report::ReportError;
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
    MasterData(MasterDataError),
    Incidence(IncidenceError),
    Report(ReportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::MasterData(err) => write!(f, "master data error: {}", err),
            AppError::Incidence(err) => write!(f, "incidence error: {}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
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
            AppError::MasterData(err) => Some(err),
            AppError::Incidence(err) => Some(err),
            AppError::Report(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MasterData(err) if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Incidence(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MasterData(MasterDataError::Template(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MasterData(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<MasterDataError> for AppError {
    fn from(value: MasterDataError) -> Self {
        Self::MasterData(value)
    }
}

impl From<IncidenceError> for AppError {
    fn from(value: IncidenceError) -> Self {
        Self::Incidence(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}
