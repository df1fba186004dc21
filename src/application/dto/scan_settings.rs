use crate::scanning::domain::BuildNumber;
use std::path::PathBuf;

/// Default CI provider API base (CircleCI v1.1 project endpoint)
pub const DEFAULT_API_BASE: &str = "https://circleci.com/api/v1.1/project/github/pytorch/pytorch";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_TARGET_COUNT: usize = 300;
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_WORKERS: usize = 8;

/// ScanSettings - resolved configuration for one pipeline run
///
/// Built by the CLI from defaults, the config file and command-line flags,
/// in increasing order of precedence.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub endpoints: CiEndpoints,
    /// Branch whose build history is ingested
    pub branch: String,
    /// API token sent as the `circle-token` query parameter
    pub token: String,
    /// Number of builds to ingest before scanning
    pub target_count: usize,
    /// Builds requested per build-list page
    pub page_size: usize,
    /// Maximum number of builds scanned concurrently
    pub workers: usize,
    pub cache_enabled: bool,
    pub cache_dir: PathBuf,
    /// Whether to wipe builds, scans and matches before populating
    pub scrub: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            endpoints: CiEndpoints::new(DEFAULT_API_BASE),
            branch: DEFAULT_BRANCH.to_string(),
            token: String::new(),
            target_count: DEFAULT_TARGET_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            workers: DEFAULT_WORKERS,
            cache_enabled: true,
            cache_dir: PathBuf::from(crate::adapters::outbound::filesystem::DEFAULT_CACHE_DIR),
            scrub: true,
        }
    }
}

/// URL layout of the CI provider's API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiEndpoints {
    api_base: String,
}

impl CiEndpoints {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Paginated build list of a branch
    pub fn branch_url(&self, branch: &str) -> String {
        format!("{}/tree/{}", self.api_base, urlencoding::encode(branch))
    }

    /// Detail of a single build, including its step tree
    pub fn build_detail_url(&self, build_number: BuildNumber) -> String {
        format!("{}/{}", self.api_base, build_number)
    }
}
