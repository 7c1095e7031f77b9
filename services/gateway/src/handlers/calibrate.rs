use crate::error::AppError;
use crate::models::{CalibrateRequest, CalibrateResponse};
use crate::state::AppState;
use axum::{Json, extract::State};
use persistence::region_from_rect;
use types::calibration::CalibrationRegion;

pub async fn get_calibration(
    State(state): State<AppState>,
) -> Result<Json<CalibrationRegion>, AppError> {
    let store = state.calibration.clone();
    let region = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(anyhow::Error::from)??;
    Ok(Json(region))
}

pub async fn save_calibration(
    State(state): State<AppState>,
    Json(req): Json<CalibrateRequest>,
) -> Result<Json<CalibrateResponse>, AppError> {
    // 1. Whole pixels only
    let region = region_from_rect(req.x, req.y, req.width, req.height)?;

    // 2. Atomic replace on disk
    let store = state.calibration.clone();
    tokio::task::spawn_blocking(move || store.save(&region))
        .await
        .map_err(anyhow::Error::from)??;

    Ok(Json(CalibrateResponse {
        status: "saved",
        region,
    }))
}
