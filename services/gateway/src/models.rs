use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::calibration::CalibrationRegion;
use types::signal::Recommendation;

use crate::explain::Explanation;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    pub ticker: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kb_sources: Option<Vec<String>>,
}

impl RecommendResponse {
    pub fn new(recommendation: Recommendation, explanation: Option<Explanation>) -> Self {
        let (explanation, kb_sources) = match explanation {
            Some(e) => (Some(e.explanation), Some(e.kb_sources)),
            None => (None, None),
        };
        Self {
            recommendation,
            explanation,
            kb_sources,
        }
    }
}

/// Capture rectangle as drawn on screen, in possibly fractional pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CalibrateRequest {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalibrateResponse {
    pub status: &'static str,
    pub region: CalibrationRegion,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub subscribers: usize,
    pub history: usize,
    pub signals: usize,
    pub metrics: BTreeMap<String, u64>,
}
