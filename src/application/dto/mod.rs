/// Data Transfer Objects for application layer
///
/// DTOs carry settings into the use cases and results back out to the CLI,
/// keeping the domain layer isolated.
mod scan_settings;
mod scan_summary;

pub use scan_settings::{
    CiEndpoints, ScanSettings, DEFAULT_API_BASE, DEFAULT_BRANCH, DEFAULT_PAGE_SIZE,
    DEFAULT_TARGET_COUNT, DEFAULT_WORKERS,
};
pub use scan_summary::{PipelineReport, ScanFailure, ScanSummary};
