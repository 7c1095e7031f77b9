//! Snapshot Feed
//!
//! Accepts market snapshots from the capture collaborator and produces:
//! - An append-only, ingestion-ordered snapshot history
//! - Live fan-out of every snapshot to push subscribers, with observable
//!   eviction of subscribers that cannot keep up
//! - A fresh recommendation per snapshot that names a symbol, stored as
//!   the latest signal for that ticker
//!
//! # Architecture
//!
//! ```text
//!   Snapshot payload
//!          │
//!     ┌────▼────┐
//!     │Validate │  ← MalformedSnapshot stops here
//!     └────┬────┘
//!          │
//!     ┌────▼────┐
//!     │History  │  ← sequence assigned
//!     └────┬────┘
//!          │
//!    ┌─────▼──────┐
//!    │ Broadcast  │  ← failed subscribers evicted
//!    └─────┬──────┘
//!          │ symbol?
//!   ┌──────▼───────┐
//!   │SignalEngine  │──► LatestSignalState
//!   └──────────────┘
//! ```

pub mod broadcast;
pub mod config;
pub mod events;
pub mod history;
pub mod ingestion;
pub mod latest;
pub mod metrics;

pub use broadcast::{Broadcaster, Subscription};
pub use config::FeedConfig;
pub use events::{
    AnalysisOutcome, DeliveryFailure, EvictionEvent, IngestAck, IngestOutcome, IngestStatus,
    PublishReport,
};
pub use history::{HistoryEntry, SnapshotHistory};
pub use ingestion::{IngestError, SnapshotIngestor};
pub use latest::LatestSignalState;
pub use metrics::FeedMetrics;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
