use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use snapshot_feed::IngestAck;
use types::snapshot::SnapshotPayload;

pub async fn ingest_snapshot(
    State(state): State<AppState>,
    payload: Result<Json<SnapshotPayload>, JsonRejection>,
) -> Result<Json<IngestAck>, AppError> {
    // 1. Body must decode as a snapshot payload
    let Json(payload) = payload.map_err(|e| {
        state.ingestor.metrics().record_rejected();
        AppError::MalformedSnapshot(e.body_text())
    })?;

    // 2. Validate, record, broadcast, analyse
    let outcome = state.ingestor.ingest_payload(payload).await?;

    Ok(Json(outcome.ack()))
}
