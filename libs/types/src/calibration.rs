//! Screen calibration region
//!
//! The rectangle the capture pipeline reads from. It is persisted by the
//! calibration store and only ever replaced as a whole.

use serde::{Deserialize, Serialize};

/// Capture rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalibrationRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CalibrationRegion {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

impl Default for CalibrationRegion {
    /// Region used before anyone has calibrated.
    fn default() -> Self {
        Self::new(200, 100, 1200, 700)
    }
}
