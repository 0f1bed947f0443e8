//! Crash-safe state persistence
//!
//! One versioned state document per cycle, written with the
//! write-to-temp-then-rename pattern: a reader (or a restarted runner)
//! either sees the previous complete document or the new complete
//! document, never a partial write.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use janus_core::{PerformanceSnapshot, RiskState, Strategy, Timestamp};
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format version written into every document; readers refuse anything
/// newer than they understand.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("State I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("State document is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("State document format {found} is newer than supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Everything the next cycle needs to resume exactly where this one
/// committed: the strategy set, the risk counters and the latest
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub format_version: u32,
    pub cycle_id: u64,
    pub saved_at: Timestamp,
    /// Trading-day bucket last seen, for day-boundary detection
    pub day_bucket: Option<NaiveDate>,
    pub equity: Decimal,
    pub strategies: Vec<Strategy>,
    pub risk_state: RiskState,
    pub latest_snapshots: Vec<PerformanceSnapshot>,
}

/// Atomic file-backed store for the state document
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a document atomically: serialize to `<path>.tmp`, fsync,
    /// then rename over the previous document.
    pub fn save(&self, document: &StateDocument) -> Result<(), StoreError> {
        let tmp_path = self.tmp_path();
        let bytes = serde_json::to_vec_pretty(document)?;

        let mut file = File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        info!(
            "[STORE] Persisted cycle {} ({} strategies, {} snapshots)",
            document.cycle_id,
            document.strategies.len(),
            document.latest_snapshots.len()
        );
        Ok(())
    }

    /// Load the last committed document; None on first run.
    pub fn load(&self) -> Result<Option<StateDocument>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let document: StateDocument = serde_json::from_str(&raw)?;
        if document.format_version > FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: document.format_version,
                supported: FORMAT_VERSION,
            });
        }
        Ok(Some(document))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use janus_core::{StrategyKind, Strategy};
    use rust_decimal_macros::dec;

    fn scratch_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("janus_store_test_{}_{}.json", tag, std::process::id()))
    }

    fn document(cycle_id: u64) -> StateDocument {
        StateDocument {
            format_version: FORMAT_VERSION,
            cycle_id,
            saved_at: Utc::now(),
            day_bucket: Some(Utc::now().date_naive()),
            equity: dec!(10_000),
            strategies: vec![Strategy::new(
                "grid-btc",
                "BTC grid",
                StrategyKind::MarketMaking,
                Utc::now(),
            )],
            risk_state: RiskState::new(dec!(10_000)),
            latest_snapshots: Vec::new(),
        }
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let path = scratch_path("roundtrip");
        let store = StateStore::new(&path);

        store.save(&document(7)).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.cycle_id, 7);
        assert_eq!(loaded.strategies.len(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_first_run_loads_none() {
        let store = StateStore::new(scratch_path("missing_never_written"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_overwrite_keeps_only_latest() {
        let path = scratch_path("overwrite");
        let store = StateStore::new(&path);

        store.save(&document(1)).unwrap();
        store.save(&document(2)).unwrap();
        assert_eq!(store.load().unwrap().unwrap().cycle_id, 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_stale_tmp_file_does_not_corrupt_state() {
        // Simulates a crash between the temp write and the rename: the
        // previous committed document must still load intact.
        let path = scratch_path("crash");
        let store = StateStore::new(&path);
        store.save(&document(3)).unwrap();

        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, b"{ \"half\": ").unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.cycle_id, 3);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(PathBuf::from(tmp));
    }

    #[test]
    fn test_newer_format_version_is_refused() {
        let path = scratch_path("version");
        let store = StateStore::new(&path);
        let mut doc = document(4);
        doc.format_version = FORMAT_VERSION + 1;
        store.save(&doc).unwrap();

        assert!(matches!(
            store.load(),
            Err(StoreError::UnsupportedVersion { .. })
        ));

        let _ = fs::remove_file(&path);
    }
}
