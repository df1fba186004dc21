use super::{BuildNumber, PatternId, ScanId};
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` character range within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One pattern hit on one log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMatch {
    pub pattern_id: PatternId,
    pub line_index: usize,
    pub line_text: String,
    pub span: MatchSpan,
}

/// Result of running the matcher over a whole log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogScan {
    pub line_count: usize,
    pub matches: Vec<LineMatch>,
}

impl LogScan {
    pub fn new(line_count: usize, matches: Vec<LineMatch>) -> Self {
        Self {
            line_count,
            matches,
        }
    }
}

/// What the failure step selector found for a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A failed step whose console output was fetched and scanned
    Failed { step_name: String, log: LogScan },
    /// A step that timed out; there is no log to scan
    TimedOut { step_name: String },
}

impl StepOutcome {
    pub fn step_name(&self) -> &str {
        match self {
            StepOutcome::Failed { step_name, .. } | StepOutcome::TimedOut { step_name } => {
                step_name
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, StepOutcome::TimedOut { .. })
    }

    pub fn line_count(&self) -> usize {
        match self {
            StepOutcome::Failed { log, .. } => log.line_count,
            StepOutcome::TimedOut { .. } => 0,
        }
    }

    pub fn matches(&self) -> &[LineMatch] {
        match self {
            StepOutcome::Failed { log, .. } => &log.matches,
            StepOutcome::TimedOut { .. } => &[],
        }
    }
}

/// Everything one obligation produced, handed to persistence in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildScanReport {
    pub build_number: BuildNumber,
    pub scanned_pattern_ids: Vec<PatternId>,
    pub scan_id: ScanId,
    pub steps: Vec<StepOutcome>,
}

impl BuildScanReport {
    pub fn match_count(&self) -> usize {
        self.steps.iter().map(|s| s.matches().len()).sum()
    }

    /// Flattens step matches into persisted match records
    pub fn match_records(&self) -> Vec<MatchRecord> {
        self.steps
            .iter()
            .flat_map(|step| {
                step.matches().iter().map(move |m| MatchRecord {
                    pattern_id: m.pattern_id,
                    build_number: self.build_number,
                    scan_id: self.scan_id,
                    step_name: step.step_name().to_string(),
                    line_index: m.line_index,
                    line_text: m.line_text.clone(),
                    span: m.span,
                })
            })
            .collect()
    }
}

/// A persisted match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub pattern_id: PatternId,
    pub build_number: BuildNumber,
    pub scan_id: ScanId,
    pub step_name: String,
    pub line_index: usize,
    pub line_text: String,
    pub span: MatchSpan,
}
