use crate::ports::outbound::UnscannedObligations;
use crate::scanning::domain::{
    Build, BuildNumber, BuildScanReport, MatchRecord, Pattern, PatternId, Scan, ScanId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Table contents shared by the store adapters
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(super) struct StoreState {
    #[serde(default)]
    pub builds: BTreeMap<BuildNumber, Build>,
    #[serde(default)]
    pub patterns: BTreeMap<PatternId, Pattern>,
    #[serde(default)]
    pub scans: Vec<Scan>,
    #[serde(default)]
    pub scanned: BTreeSet<(BuildNumber, PatternId)>,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

impl StoreState {
    /// Patterns are kept; everything a run produces is dropped
    pub fn scrub(&mut self) {
        self.builds.clear();
        self.scans.clear();
        self.scanned.clear();
        self.matches.clear();
    }

    pub fn upsert_patterns(&mut self, patterns: &[Pattern]) {
        for pattern in patterns {
            self.patterns.insert(pattern.id(), pattern.clone());
        }
    }

    pub fn insert_builds(&mut self, builds: &[Build]) {
        for build in builds {
            self.builds.insert(build.number(), build.clone());
        }
    }

    pub fn insert_scan(&mut self) -> ScanId {
        let next = self.scans.iter().map(|s| s.id.value()).max().unwrap_or(0) + 1;
        let id = ScanId::new(next);
        self.scans.push(Scan::new(id));
        id
    }

    pub fn unscanned(&self) -> UnscannedObligations {
        let mut obligations = BTreeMap::new();
        for number in self.builds.keys() {
            let pending: BTreeSet<PatternId> = self
                .patterns
                .keys()
                .filter(|id| !self.scanned.contains(&(*number, **id)))
                .copied()
                .collect();
            if !pending.is_empty() {
                obligations.insert(*number, pending);
            }
        }
        obligations
    }

    pub fn patterns_by_id(&self) -> HashMap<PatternId, Pattern> {
        self.patterns
            .iter()
            .map(|(id, pattern)| (*id, pattern.clone()))
            .collect()
    }

    pub fn record_report(&mut self, report: &BuildScanReport) -> usize {
        for pattern_id in &report.scanned_pattern_ids {
            self.scanned.insert((report.build_number, *pattern_id));
        }
        let records = report.match_records();
        let written = records.len();
        self.matches.extend(records);
        written
    }

    pub fn matches_for_scan(&self, scan_id: ScanId) -> Vec<MatchRecord> {
        self.matches
            .iter()
            .filter(|m| m.scan_id == scan_id)
            .cloned()
            .collect()
    }
}
