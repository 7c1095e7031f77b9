//! Feed events and ingestion outcomes

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::ids::SubscriberId;
use types::signal::Recommendation;

/// Why a delivery to one subscriber failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryFailure {
    /// The receiving side was dropped.
    #[error("subscriber channel closed")]
    Closed,
    /// The queue stayed full for the whole send timeout.
    #[error("subscriber send timed out")]
    TimedOut,
}

/// A subscriber removed from the registry after a failed delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionEvent {
    pub subscriber: SubscriberId,
    pub reason: DeliveryFailure,
    pub at: DateTime<Utc>,
}

/// Result of one fan-out sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub delivered: usize,
    pub evicted: usize,
}

/// What happened to the analysis step of an ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The recommendation was computed and stored as the latest signal.
    Analyzed(Arc<Recommendation>),
    /// The snapshot carried no symbol.
    Skipped,
    /// The engine failed; `reason` is a short machine-readable code.
    Failed { reason: &'static str },
}

impl AnalysisOutcome {
    pub fn status(&self) -> IngestStatus {
        match self {
            AnalysisOutcome::Analyzed(_) => IngestStatus::Analyzed,
            AnalysisOutcome::Skipped => IngestStatus::Skipped,
            AnalysisOutcome::Failed { .. } => IngestStatus::Failed,
        }
    }
}

/// Full result of ingesting one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// History sequence assigned to the snapshot.
    pub sequence: u64,
    pub delivered: usize,
    pub evicted: usize,
    pub analysis: AnalysisOutcome,
}

impl IngestOutcome {
    pub fn ack(&self) -> IngestAck {
        IngestAck {
            status: self.analysis.status(),
            sequence: self.sequence,
            reason: match self.analysis {
                AnalysisOutcome::Failed { reason } => Some(reason.to_string()),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Analyzed,
    Skipped,
    Failed,
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStatus::Analyzed => write!(f, "analyzed"),
            IngestStatus::Skipped => write!(f, "skipped"),
            IngestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Acknowledgement returned to the snapshot producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestAck {
    pub status: IngestStatus,
    pub sequence: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
