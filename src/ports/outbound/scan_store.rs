use crate::scanning::domain::{Build, BuildNumber, BuildScanReport, MatchRecord, Pattern, PatternId, ScanId};
use crate::shared::Result;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Build number → pattern ids not yet applied to that build
pub type UnscannedObligations = BTreeMap<BuildNumber, BTreeSet<PatternId>>;

/// ScanStore port for the relational store behind the pipeline
///
/// The pipeline treats each call as already transactional; durability is the
/// implementation's concern. Implementations must be `Send + Sync`.
pub trait ScanStore: Send + Sync {
    /// Removes builds, scans and matches from a previous run
    fn scrub_tables(&self) -> Result<()>;

    /// Seeds the pattern table
    fn populate_patterns(&self) -> Result<()>;

    /// Persists one page of builds
    fn insert_builds(&self, builds: &[Build]) -> Result<()>;

    /// Creates a new scan row and returns its id
    fn insert_scan_row(&self) -> Result<ScanId>;

    /// Every (build, pattern) pair that has not been scanned yet
    fn get_unscanned_build_patterns(&self) -> Result<UnscannedObligations>;

    fn get_patterns(&self) -> Result<HashMap<PatternId, Pattern>>;

    /// Persists scan results.
    ///
    /// For each report, every pattern in `scanned_pattern_ids` is marked as
    /// scanned for that build and every match is recorded. Returns the number
    /// of match records written.
    fn insert_matches(&self, reports: &mut dyn Iterator<Item = BuildScanReport>) -> Result<usize>;

    /// Matches recorded by one scan
    fn matches_for_scan(&self, scan_id: ScanId) -> Result<Vec<MatchRecord>>;
}

impl<T: ScanStore + ?Sized> ScanStore for Arc<T> {
    fn scrub_tables(&self) -> Result<()> {
        (**self).scrub_tables()
    }

    fn populate_patterns(&self) -> Result<()> {
        (**self).populate_patterns()
    }

    fn insert_builds(&self, builds: &[Build]) -> Result<()> {
        (**self).insert_builds(builds)
    }

    fn insert_scan_row(&self) -> Result<ScanId> {
        (**self).insert_scan_row()
    }

    fn get_unscanned_build_patterns(&self) -> Result<UnscannedObligations> {
        (**self).get_unscanned_build_patterns()
    }

    fn get_patterns(&self) -> Result<HashMap<PatternId, Pattern>> {
        (**self).get_patterns()
    }

    fn insert_matches(&self, reports: &mut dyn Iterator<Item = BuildScanReport>) -> Result<usize> {
        (**self).insert_matches(reports)
    }

    fn matches_for_scan(&self, scan_id: ScanId) -> Result<Vec<MatchRecord>> {
        (**self).matches_for_scan(scan_id)
    }
}
