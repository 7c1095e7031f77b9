use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use persistence::CalibrationError;
use serde_json::json;
use snapshot_feed::IngestError;
use thiserror::Error;
use types::errors::SignalError;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Calibration storage failed")]
    CalibrationIo,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<SignalError> for AppError {
    fn from(err: SignalError) -> Self {
        // Upstream detail stays in the logs.
        match err {
            SignalError::DataUnavailable { ticker, .. } => {
                AppError::DataUnavailable(format!("No usable market data for {ticker}"))
            }
            SignalError::InsufficientData { ticker, points } => AppError::InsufficientData(
                format!("{points} data points for {ticker} do not fill the indicator windows"),
            ),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MalformedSnapshot(e) => AppError::MalformedSnapshot(e.to_string()),
            IngestError::Encode(e) => AppError::InternalError(e.into()),
        }
    }
}

impl From<CalibrationError> for AppError {
    fn from(err: CalibrationError) -> Self {
        match err {
            CalibrationError::InvalidRegion(msg) => AppError::InvalidRegion(msg),
            CalibrationError::Io(_) | CalibrationError::Serialization(_) => AppError::CalibrationIo,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::MalformedSnapshot(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg, "MALFORMED_SNAPSHOT")
            }
            AppError::DataUnavailable(msg) => (StatusCode::NOT_FOUND, msg, "DATA_UNAVAILABLE"),
            AppError::InsufficientData(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg, "INSUFFICIENT_DATA")
            }
            AppError::InvalidRegion(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg, "INVALID_REGION")
            }
            AppError::CalibrationIo => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Calibration could not be stored".to_string(),
                "CALIBRATION_IO",
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
            ),
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
