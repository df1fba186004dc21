use crate::adapters::outbound::filesystem::DiskCache;
use crate::application::dto::{PipelineReport, ScanSettings};
use crate::application::use_cases::{FindMatchesUseCase, PopulateBuildsUseCase};
use crate::ports::outbound::{HttpClient, ProgressReporter, ScanStore};
use crate::shared::Result;
use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// RunPipelineUseCase - one complete run
///
/// Scrubs the previous run's tables (unless disabled), seeds patterns,
/// ingests the branch's build history and scans the ingested builds.
///
/// # Type Parameters
/// * `C` - HttpClient implementation
/// * `S` - ScanStore implementation
/// * `PR` - ProgressReporter implementation
pub struct RunPipelineUseCase<C, S, PR> {
    client: Arc<C>,
    store: Arc<S>,
    progress_reporter: Arc<PR>,
}

impl<C, S, PR> RunPipelineUseCase<C, S, PR>
where
    C: HttpClient,
    S: ScanStore,
    PR: ProgressReporter,
{
    pub fn new(client: Arc<C>, store: Arc<S>, progress_reporter: Arc<PR>) -> Self {
        Self {
            client,
            store,
            progress_reporter,
        }
    }

    /// Executes the pipeline
    ///
    /// # Errors
    /// Persistence failures and build-list fetch failures are fatal.
    /// Per-build scan failures are reported in the returned summary.
    pub async fn execute(
        &self,
        settings: &ScanSettings,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport> {
        // Step 1: Reset tables from the previous run
        if settings.scrub {
            self.store
                .scrub_tables()
                .context("Failed to scrub tables from the previous run")?;
        }

        // Step 2: Seed patterns
        self.store
            .populate_patterns()
            .context("Failed to seed failure patterns")?;

        // Step 3: Ingest build history
        let builds_ingested = PopulateBuildsUseCase::new(
            self.client.clone(),
            self.store.clone(),
            self.progress_reporter.clone(),
            settings.endpoints.clone(),
            settings.page_size,
        )
        .populate(
            settings.target_count,
            &settings.branch,
            &settings.token,
            cancel,
        )
        .await?;

        // Step 4: Scan
        let cache = DiskCache::new(settings.cache_dir.clone(), settings.cache_enabled);
        let scan = FindMatchesUseCase::new(
            self.client.clone(),
            self.store.clone(),
            self.progress_reporter.clone(),
            cache,
            settings.endpoints.clone(),
            settings.workers,
        )
        .run(&settings.token, cancel)
        .await?;

        info!(
            builds_ingested,
            scan_id = scan.scan_id.value(),
            matches = scan.match_count,
            "Pipeline finished"
        );

        Ok(PipelineReport {
            builds_ingested,
            scan,
        })
    }
}
