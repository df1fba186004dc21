use super::store_state::StoreState;
use crate::ports::outbound::{ScanStore, UnscannedObligations};
use crate::scanning::domain::{Build, BuildScanReport, MatchRecord, Pattern, PatternId, ScanId};
use crate::shared::{Result, ScanError};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// InMemoryScanStore keeps every table in process memory.
///
/// The default store when no store file is given; nothing outlives the
/// process. `populate_patterns` seeds the pattern table from the list given
/// at construction.
pub struct InMemoryScanStore {
    seed_patterns: Vec<Pattern>,
    state: Mutex<StoreState>,
}

impl InMemoryScanStore {
    pub fn new(seed_patterns: Vec<Pattern>) -> Self {
        Self {
            seed_patterns,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| ScanError::persistence("store lock poisoned").into())
    }

    /// Number of builds currently stored
    pub fn build_count(&self) -> Result<usize> {
        Ok(self.lock()?.builds.len())
    }
}

impl ScanStore for InMemoryScanStore {
    fn scrub_tables(&self) -> Result<()> {
        self.lock()?.scrub();
        Ok(())
    }

    fn populate_patterns(&self) -> Result<()> {
        self.lock()?.upsert_patterns(&self.seed_patterns);
        Ok(())
    }

    fn insert_builds(&self, builds: &[Build]) -> Result<()> {
        self.lock()?.insert_builds(builds);
        Ok(())
    }

    fn insert_scan_row(&self) -> Result<ScanId> {
        Ok(self.lock()?.insert_scan())
    }

    fn get_unscanned_build_patterns(&self) -> Result<UnscannedObligations> {
        Ok(self.lock()?.unscanned())
    }

    fn get_patterns(&self) -> Result<HashMap<PatternId, Pattern>> {
        Ok(self.lock()?.patterns_by_id())
    }

    fn insert_matches(&self, reports: &mut dyn Iterator<Item = BuildScanReport>) -> Result<usize> {
        let mut state = self.lock()?;
        Ok(reports.map(|report| state.record_report(&report)).sum())
    }

    fn matches_for_scan(&self, scan_id: ScanId) -> Result<Vec<MatchRecord>> {
        Ok(self.lock()?.matches_for_scan(scan_id))
    }
}
