//! Calibration store: durable capture region
//!
//! Features:
//! - Pretty-printed JSON file holding one `CalibrationRegion`
//! - Atomic replace (write tmp, fsync, rename) so readers never see a
//!   partial file
//! - Single writer at a time
//! - Default region when nothing has been saved yet

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, error, info};
use types::calibration::CalibrationRegion;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),
}

/// Convert a floating-point rectangle to whole pixels, truncating toward
/// zero. Negative, non-finite or out-of-range values are rejected.
pub fn region_from_rect(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Result<CalibrationRegion, CalibrationError> {
    let px = |name: &str, v: f64| -> Result<u32, CalibrationError> {
        if !v.is_finite() || v < 0.0 || v >= f64::from(u32::MAX) + 1.0 {
            return Err(CalibrationError::InvalidRegion(format!(
                "{name} must be a non-negative pixel value, got {v}"
            )));
        }
        Ok(v.trunc() as u32)
    };

    Ok(CalibrationRegion::new(
        px("x", x)?,
        px("y", y)?,
        px("width", width)?,
        px("height", height)?,
    ))
}

// ── Store ───────────────────────────────────────────────────────────

/// File-backed calibration region.
pub struct CalibrationStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CalibrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "Calibration store opened");
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Stored region, or the default one if nothing was saved.
    pub fn load(&self) -> Result<CalibrationRegion, CalibrationError> {
        match fs::read(&self.path) {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No calibration saved, using default");
                Ok(CalibrationRegion::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the stored region atomically.
    pub fn save(&self, region: &CalibrationRegion) -> Result<(), CalibrationError> {
        let data = serde_json::to_vec_pretty(region)?;

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.write_atomic(&data).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Calibration save failed");
            CalibrationError::Io(e)
        })?;

        info!(
            left = region.left,
            top = region.top,
            width = region.width,
            height = region.height,
            "Calibration saved"
        );
        Ok(())
    }

    fn write_atomic(&self, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.tmp_path();
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_default() {
        let tmp = TempDir::new().unwrap();
        let store = CalibrationStore::new(tmp.path().join("calibration.json"));
        assert_eq!(store.load().unwrap(), CalibrationRegion::default());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let store = CalibrationStore::new(tmp.path().join("nested/calibration.json"));
        let region = CalibrationRegion::new(10, 20, 640, 480);

        store.save(&region).unwrap();
        assert_eq!(store.load().unwrap(), region);
        assert!(!store.tmp_path().exists());

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\"left\": 10"));
    }

    #[test]
    fn test_save_replaces_previous() {
        let tmp = TempDir::new().unwrap();
        let store = CalibrationStore::new(tmp.path().join("calibration.json"));
        store.save(&CalibrationRegion::new(1, 1, 1, 1)).unwrap();
        store.save(&CalibrationRegion::new(2, 2, 2, 2)).unwrap();
        assert_eq!(store.load().unwrap(), CalibrationRegion::new(2, 2, 2, 2));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("calibration.json");
        fs::write(&path, b"{\"left\": 1").unwrap();
        let store = CalibrationStore::new(path);
        assert!(matches!(store.load(), Err(CalibrationError::Serialization(_))));
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();
        let store = CalibrationStore::new(blocker.join("calibration.json"));
        assert!(matches!(
            store.save(&CalibrationRegion::default()),
            Err(CalibrationError::Io(_))
        ));
    }

    #[test]
    fn test_concurrent_saves_leave_a_whole_region() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(CalibrationStore::new(tmp.path().join("calibration.json")));

        let handles: Vec<_> = (1..=8u32)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.save(&CalibrationRegion::new(i, i, i, i)))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }

        let region = store.load().unwrap();
        assert!(region.left == region.top && region.top == region.width);
        assert!((1..=8).contains(&region.left));
    }

    #[test]
    fn test_region_from_rect_truncates() {
        let region = region_from_rect(10.9, 20.1, 640.5, 480.0).unwrap();
        assert_eq!(region, CalibrationRegion::new(10, 20, 640, 480));
    }

    #[test]
    fn test_region_from_rect_rejects_bad_values() {
        assert!(matches!(
            region_from_rect(-1.0, 0.0, 10.0, 10.0),
            Err(CalibrationError::InvalidRegion(_))
        ));
        assert!(region_from_rect(0.0, f64::NAN, 10.0, 10.0).is_err());
        assert!(region_from_rect(0.0, 0.0, f64::INFINITY, 10.0).is_err());
    }
}
