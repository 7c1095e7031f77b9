//! Snapshot ingestion
//!
//! Validates an incoming snapshot, appends it to history, fans it out to
//! live subscribers and, when it names a symbol, asks the signal engine
//! for a fresh recommendation.
//!
//! History and broadcast are never reverted by a failed analysis, and the
//! latest signal is only ever replaced by a successful one.

use std::sync::Arc;

use signal_engine::SignalEngine;
use tracing::{debug, info, warn};
use types::errors::SnapshotError;
use types::snapshot::{MarketSnapshot, SnapshotPayload};

use crate::broadcast::Broadcaster;
use crate::config::FeedConfig;
use crate::events::{AnalysisOutcome, IngestOutcome};
use crate::history::SnapshotHistory;
use crate::latest::LatestSignalState;
use crate::metrics::FeedMetrics;

/// Errors that stop a snapshot before it enters the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[from] SnapshotError),

    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Owns the feed state and runs the per-snapshot pipeline.
pub struct SnapshotIngestor {
    engine: SignalEngine,
    history: SnapshotHistory,
    broadcaster: Broadcaster,
    latest: LatestSignalState,
    metrics: Arc<FeedMetrics>,
    config: FeedConfig,
}

impl SnapshotIngestor {
    pub fn new(engine: SignalEngine, config: FeedConfig) -> Self {
        let metrics = Arc::new(FeedMetrics::new());

        info!(
            default_period = %config.default_period,
            default_interval = %config.default_interval,
            history_capacity = ?config.history_capacity,
            "SnapshotIngestor initialized"
        );

        Self {
            engine,
            history: SnapshotHistory::with_capacity(config.history_capacity),
            broadcaster: Broadcaster::new(&config, metrics.clone()),
            latest: LatestSignalState::new(),
            metrics,
            config,
        }
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn latest(&self) -> &LatestSignalState {
        &self.latest
    }

    pub fn metrics(&self) -> &FeedMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Validate a wire payload, then ingest it.
    pub async fn ingest_payload(
        &self,
        payload: SnapshotPayload,
    ) -> Result<IngestOutcome, IngestError> {
        let snapshot = MarketSnapshot::try_from(payload).map_err(|e| {
            self.metrics.record_rejected();
            warn!(error = %e, "Rejecting malformed snapshot");
            e
        })?;
        self.ingest(snapshot).await
    }

    /// Run the pipeline for a validated snapshot. Not idempotent: the same
    /// snapshot ingested twice is stored and broadcast twice.
    pub async fn ingest(&self, snapshot: MarketSnapshot) -> Result<IngestOutcome, IngestError> {
        let payload: Arc<str> = serde_json::to_string(&snapshot)?.into();
        let snapshot = Arc::new(snapshot);

        let sequence = self.history.append(snapshot.clone());
        self.metrics.record_ingested();
        debug!(
            sequence,
            source = snapshot.source(),
            symbol = snapshot.symbol().unwrap_or(""),
            "Snapshot recorded"
        );

        let report = self.broadcaster.publish(payload).await;

        let analysis = match snapshot.analysis_symbol() {
            Some(symbol) => self.analyze(symbol).await,
            None => {
                self.metrics.record_analysis_skipped();
                AnalysisOutcome::Skipped
            }
        };

        Ok(IngestOutcome {
            sequence,
            delivered: report.delivered,
            evicted: report.evicted,
            analysis,
        })
    }

    async fn analyze(&self, symbol: &str) -> AnalysisOutcome {
        let result = self
            .engine
            .recommend(symbol, &self.config.default_period, &self.config.default_interval)
            .await;

        match result {
            Ok(rec) => {
                let rec = Arc::new(rec);
                self.latest.replace(symbol, rec.clone());
                self.metrics.record_analysis_succeeded();
                info!(
                    symbol,
                    action = rec.action.as_str(),
                    confidence = rec.confidence,
                    "Latest signal updated"
                );
                AnalysisOutcome::Analyzed(rec)
            }
            Err(e) => {
                self.metrics.record_analysis_failed();
                warn!(symbol, error = %e, "Snapshot analysis failed");
                AnalysisOutcome::Failed { reason: e.reason() }
            }
        }
    }
}
