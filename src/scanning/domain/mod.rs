pub mod build;
pub mod log_match;
pub mod pattern;
pub mod provider;
pub mod scan;

pub use build::{Build, BuildNumber};
pub use log_match::{BuildScanReport, LineMatch, LogScan, MatchRecord, MatchSpan, StepOutcome};
pub use pattern::{CompiledPattern, Pattern, PatternId, PatternKind, PatternMatcherKind};
pub use provider::{BuildDetail, BuildStep, StepAction};
pub use scan::{Scan, ScanId};
