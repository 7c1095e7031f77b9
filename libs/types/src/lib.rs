//! Types library for the market-vision pipeline
//!
//! Shared definitions used by the snapshot feed, the signal engine, the
//! calibration store and the gateway.
//!
//! # Modules
//! - `ids`: Subscriber identifiers
//! - `snapshot`: Market snapshots and their wire payload
//! - `series`: Price series and raw provider frames
//! - `signal`: Regimes, actions, signal rows and recommendations
//! - `calibration`: Screen capture region
//! - `errors`: Error taxonomy

pub mod calibration;
pub mod errors;
pub mod ids;
pub mod series;
pub mod signal;
pub mod snapshot;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calibration::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::series::*;
    pub use crate::signal::*;
    pub use crate::snapshot::*;
}
