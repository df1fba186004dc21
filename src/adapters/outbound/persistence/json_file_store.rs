use super::store_state::StoreState;
use crate::ports::outbound::{ScanStore, UnscannedObligations};
use crate::scanning::domain::{Build, BuildScanReport, MatchRecord, Pattern, PatternId, ScanId};
use crate::shared::{Result, ScanError};
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// JsonFileScanStore keeps the tables in a single JSON document on disk.
///
/// The whole document is rewritten after every mutating call, so scanned
/// (build, pattern) pairs survive between runs and a later run only scans
/// what is still outstanding.
pub struct JsonFileScanStore {
    path: PathBuf,
    seed_patterns: Vec<Pattern>,
    state: Mutex<StoreState>,
}

impl JsonFileScanStore {
    /// Opens the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>, seed_patterns: Vec<Pattern>) -> Result<Self> {
        let path = path.into();
        let state = Self::load(&path)?;

        Ok(Self {
            path,
            seed_patterns,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<StoreState> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store {} does not exist yet; starting empty", path.display());
                return Ok(StoreState::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read store: {}", path.display()))
            }
        };

        if metadata.is_symlink() {
            anyhow::bail!(
                "Security: store path {} is a symbolic link. For security reasons, symbolic links are not allowed.",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read store: {}", path.display()))?;
        let state = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse store: {}\n\n💡 Hint: Delete the file to start from an empty store",
                path.display()
            )
        })?;
        Ok(state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| ScanError::persistence("store lock poisoned").into())
    }

    fn save(&self, state: &StoreState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(ScanError::persistence)?;
            }
        }

        let content = serde_json::to_string_pretty(state)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(ScanError::persistence)?;
        fs::rename(&tmp_path, &self.path).map_err(ScanError::persistence)?;
        Ok(())
    }

    /// Applies `f` to a copy of the tables and keeps it only once it is on disk
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> Result<T> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        let result = f(&mut next);
        self.save(&next)?;
        *state = next;
        Ok(result)
    }
}

impl ScanStore for JsonFileScanStore {
    fn scrub_tables(&self) -> Result<()> {
        self.mutate(StoreState::scrub)
    }

    fn populate_patterns(&self) -> Result<()> {
        self.mutate(|state| state.upsert_patterns(&self.seed_patterns))
    }

    fn insert_builds(&self, builds: &[Build]) -> Result<()> {
        self.mutate(|state| state.insert_builds(builds))
    }

    fn insert_scan_row(&self) -> Result<ScanId> {
        self.mutate(StoreState::insert_scan)
    }

    fn get_unscanned_build_patterns(&self) -> Result<UnscannedObligations> {
        Ok(self.lock()?.unscanned())
    }

    fn get_patterns(&self) -> Result<HashMap<PatternId, Pattern>> {
        Ok(self.lock()?.patterns_by_id())
    }

    fn insert_matches(&self, reports: &mut dyn Iterator<Item = BuildScanReport>) -> Result<usize> {
        self.mutate(|state| reports.map(|report| state.record_report(&report)).sum())
    }

    fn matches_for_scan(&self, scan_id: ScanId) -> Result<Vec<MatchRecord>> {
        Ok(self.lock()?.matches_for_scan(scan_id))
    }
}
