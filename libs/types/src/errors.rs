//! Error types shared across the feed, the signal engine and the gateway
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Failures of the signal engine, surfaced as typed results to its caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// Upstream returned nothing usable (empty frame, no price column,
    /// transport failure).
    #[error("Data unavailable for {ticker}: {detail}")]
    DataUnavailable { ticker: String, detail: String },

    /// Every row was dropped because a rolling window was not yet full.
    #[error("Insufficient data for {ticker}: {points} points do not fill the rolling windows")]
    InsufficientData { ticker: String, points: usize },
}

impl SignalError {
    pub fn data_unavailable(ticker: impl Into<String>, detail: impl Into<String>) -> Self {
        SignalError::DataUnavailable {
            ticker: ticker.into(),
            detail: detail.into(),
        }
    }

    /// Short machine-readable reason, safe to return to remote callers.
    pub fn reason(&self) -> &'static str {
        match self {
            SignalError::DataUnavailable { .. } => "data_unavailable",
            SignalError::InsufficientData { .. } => "insufficient_data",
        }
    }
}

/// Snapshot validation errors (malformed input never enters the pipeline).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Snapshot timestamp is missing")]
    MissingTimestamp,

    #[error("Snapshot timestamp {value:?} is not a timezone-aware RFC 3339 datetime")]
    InvalidTimestamp { value: String },
}
