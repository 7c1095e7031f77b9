use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use types::signal::Recommendation;

pub async fn list_signals(State(state): State<AppState>) -> Json<Vec<Recommendation>> {
    Json(
        state
            .ingestor
            .latest()
            .all()
            .into_iter()
            .map(|(_, rec)| (*rec).clone())
            .collect(),
    )
}

pub async fn get_signal(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Recommendation>, AppError> {
    state
        .ingestor
        .latest()
        .get(&ticker)
        .map(|rec| Json((*rec).clone()))
        .ok_or_else(|| AppError::NotFound(format!("No signal for {ticker}")))
}
