use crate::error::AppError;
use crate::models::{RecommendRequest, RecommendResponse};
use crate::state::AppState;
use axum::{Json, extract::State};
use tracing::warn;

pub async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let ticker = req.ticker.trim();
    if ticker.is_empty() {
        return Err(AppError::BadRequest("ticker must not be empty".into()));
    }

    let defaults = state.ingestor.config();
    let period = req.period.as_deref().unwrap_or(&defaults.default_period);
    let interval = req.interval.as_deref().unwrap_or(&defaults.default_interval);

    // 1. Quant recommendation
    let recommendation = state
        .ingestor
        .engine()
        .recommend(ticker, period, interval)
        .await?;

    // 2. Optional explanation; failure only costs the prose
    let explanation = match &state.explainer {
        Some(explainer) => match explainer.explain(&recommendation).await {
            Ok(explanation) => Some(explanation),
            Err(e) => {
                warn!(ticker, error = %e, "Explanation unavailable");
                None
            }
        },
        None => None,
    };

    Ok(Json(RecommendResponse::new(recommendation, explanation)))
}
