use crate::models::StatsResponse;
use crate::state::AppState;
use axum::{Json, extract::State};

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let ingestor = &state.ingestor;
    Json(StatsResponse {
        subscribers: ingestor.broadcaster().subscriber_count(),
        history: ingestor.history().len(),
        signals: ingestor.latest().len(),
        metrics: ingestor.metrics().export(),
    })
}
