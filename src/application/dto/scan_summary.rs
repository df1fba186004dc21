use crate::scanning::domain::{BuildNumber, PatternId, ScanId};
use crate::shared::ScanError;
use std::collections::BTreeMap;

/// A build whose scan failed; its patterns stay unscanned
#[derive(Debug)]
pub struct ScanFailure {
    pub build_number: BuildNumber,
    pub error: ScanError,
}

/// ScanSummary - what one scan run produced
#[derive(Debug)]
pub struct ScanSummary {
    pub scan_id: ScanId,
    /// Obligations found at the start of the run
    pub obligations: usize,
    /// Obligations processed, successful or not
    pub processed: usize,
    /// Match records written to persistence
    pub match_count: usize,
    pub matches_by_pattern: BTreeMap<PatternId, usize>,
    /// Builds whose failing step timed out
    pub timed_out: usize,
    /// Builds where no failing step could be pinpointed
    pub unpinpointed: usize,
    pub failures: Vec<ScanFailure>,
    pub cancelled: bool,
}

impl ScanSummary {
    pub fn succeeded(&self) -> usize {
        self.processed - self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// PipelineReport - outcome of a full run: ingestion then scan
#[derive(Debug)]
pub struct PipelineReport {
    pub builds_ingested: usize,
    pub scan: ScanSummary,
}
