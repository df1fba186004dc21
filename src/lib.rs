//! ci-failure-scan - recurring failure signatures in CI build logs
//!
//! This library ingests a branch's build history from a CI provider, locates
//! the failing step of each build, downloads its console output and records
//! every line that matches a known failure pattern. It follows hexagonal
//! architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`scanning`): builds, patterns, match results and the
//!   pure services that select failing steps and match log lines
//! - **Application Layer** (`application`): Use cases and DTOs
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): HTTP client, disk cache, stores, console
//! - **Shared** (`shared`): Errors, cancellation and progress counting
//!
//! # Example
//!
//! ```no_run
//! use ci_failure_scan::prelude::*;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<()> {
//! let client = Arc::new(ReqwestHttpClient::new()?);
//! let store = Arc::new(InMemoryScanStore::new(vec![
//!     Pattern::literal(1, "Segmentation fault", "segfault"),
//! ]));
//! let reporter = Arc::new(StderrProgressReporter::new());
//!
//! let settings = ScanSettings {
//!     target_count: 50,
//!     ..ScanSettings::default()
//! };
//!
//! let report = RunPipelineUseCase::new(client, store, reporter)
//!     .execute(&settings, &CancellationToken::new())
//!     .await?;
//! println!("{} match(es)", report.scan.match_count);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod ports;
pub mod scanning;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::DiskCache;
    pub use crate::adapters::outbound::network::ReqwestHttpClient;
    pub use crate::adapters::outbound::persistence::{InMemoryScanStore, JsonFileScanStore};
    pub use crate::application::dto::{
        CiEndpoints, PipelineReport, ScanFailure, ScanSettings, ScanSummary,
    };
    pub use crate::application::use_cases::{
        FindMatchesUseCase, PopulateBuildsUseCase, RunPipelineUseCase,
    };
    pub use crate::ports::outbound::{HttpClient, HttpReply, ProgressReporter, ScanStore};
    pub use crate::scanning::domain::{
        Build, BuildNumber, LineMatch, LogScan, MatchRecord, Pattern, PatternId, ScanId,
        StepOutcome,
    };
    pub use crate::scanning::services::{FailureStepSelector, PatternMatcher};
    pub use crate::shared::{Result, ScanError};
}
