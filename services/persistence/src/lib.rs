//! Persistence Service
//!
//! Durable state for the market-vision pipeline: the screen calibration
//! region read by the capture collaborator. Writes are atomic replaces so
//! a reader always sees either the previous or the new region.

pub mod calibration;

pub use calibration::{region_from_rect, CalibrationError, CalibrationStore};
