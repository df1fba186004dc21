use crate::adapters::outbound::filesystem::DiskCache;
use crate::application::dto::{CiEndpoints, ScanFailure, ScanSummary};
use crate::ports::outbound::{HttpClient, ProgressReporter, ScanStore};
use crate::scanning::domain::provider::console_log_text;
use crate::scanning::domain::{
    BuildDetail, BuildNumber, BuildScanReport, CompiledPattern, Pattern, PatternId, ScanId,
    StepOutcome,
};
use crate::scanning::services::{FailureLocation, FailureStepSelector, PatternMatcher};
use crate::shared::{until_cancelled, ProgressCounter, Result, ScanError};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of scanning a single build
type ObligationResult = (BuildNumber, std::result::Result<BuildScanReport, ScanError>);

/// FindMatchesUseCase - scans failed builds for known failure patterns
///
/// Computes the (build, pattern) pairs not scanned yet, then scans the
/// builds concurrently, most recent first, on a bounded worker pool. Each
/// build is scanned independently: a failed fetch for one build is reported
/// and leaves that build's patterns unscanned, without stopping the others.
///
/// # Type Parameters
/// * `C` - HttpClient implementation
/// * `S` - ScanStore implementation
/// * `PR` - ProgressReporter implementation
pub struct FindMatchesUseCase<C, S, PR> {
    client: C,
    store: S,
    progress_reporter: PR,
    cache: DiskCache,
    endpoints: CiEndpoints,
    workers: usize,
}

impl<C, S, PR> FindMatchesUseCase<C, S, PR>
where
    C: HttpClient,
    S: ScanStore,
    PR: ProgressReporter,
{
    pub fn new(
        client: C,
        store: S,
        progress_reporter: PR,
        cache: DiskCache,
        endpoints: CiEndpoints,
        workers: usize,
    ) -> Self {
        Self {
            client,
            store,
            progress_reporter,
            cache,
            endpoints,
            workers: workers.max(1),
        }
    }

    /// Runs one scan over every outstanding obligation
    ///
    /// # Errors
    /// Only persistence failures are fatal. Per-build failures are collected
    /// into [`ScanSummary::failures`].
    pub async fn run(&self, api_token: &str, cancel: &CancellationToken) -> Result<ScanSummary> {
        self.progress_reporter.report("🔍 Populating matches...");

        let obligations = self.store.get_unscanned_build_patterns()?;
        let patterns = self.store.get_patterns()?;
        let scan_id = self.store.insert_scan_row()?;

        // Most recent builds first
        let ordered: Vec<(BuildNumber, BTreeSet<PatternId>)> =
            obligations.into_iter().rev().collect();
        let total = ordered.len();
        info!(scan_id = scan_id.value(), obligations = total, "Starting scan");

        let counter = ProgressCounter::new();
        let tallies: DashMap<PatternId, usize> = DashMap::new();

        let outcomes: Vec<ObligationResult> = {
            let (patterns, counter, tallies) = (&patterns, &counter, &tallies);
            stream::iter(ordered)
                .map(|(build_number, pattern_ids)| async move {
                    let result = self
                        .scan_build(build_number, &pattern_ids, patterns, scan_id, api_token, cancel)
                        .await;

                    if let Ok(report) = &result {
                        debug!(
                            build = build_number.value(),
                            matches = report.match_count(),
                            "Build scanned"
                        );
                        for step in &report.steps {
                            for m in step.matches() {
                                *tallies.entry(m.pattern_id).or_insert(0) += 1;
                            }
                        }
                    }

                    let processed = counter.increment(1);
                    self.report_obligation_progress(processed, total, build_number, &result);
                    (build_number, result)
                })
                .buffer_unordered(self.workers)
                .collect()
                .await
        };

        let processed = counter.get();
        let (reports, failures) = Self::partition(outcomes);
        let timed_out = reports
            .iter()
            .filter(|r| r.steps.iter().any(StepOutcome::is_timeout))
            .count();
        let unpinpointed = reports.iter().filter(|r| r.steps.is_empty()).count();

        for failure in &failures {
            let message = format!(
                "Build {} could not be scanned: {}",
                failure.build_number, failure.error
            );
            self.report_issue(&message, &failure.error);
        }

        let match_count = self.store.insert_matches(&mut reports.into_iter())?;

        let summary = ScanSummary {
            scan_id,
            obligations: total,
            processed,
            match_count,
            matches_by_pattern: tallies.into_iter().collect::<BTreeMap<_, _>>(),
            timed_out,
            unpinpointed,
            failures,
            cancelled: cancel.is_cancelled(),
        };

        self.progress_reporter.report_completion(&format!(
            "✅ Scan {} complete: {} of {} build(s) scanned, {} match(es), {} failure(s)",
            scan_id,
            summary.succeeded(),
            total,
            match_count,
            summary.failures.len()
        ));

        Ok(summary)
    }

    /// Scans one obligation: fetch build detail, select the failing step,
    /// match its log
    async fn scan_build(
        &self,
        build_number: BuildNumber,
        pattern_ids: &BTreeSet<PatternId>,
        patterns: &HashMap<PatternId, Pattern>,
        scan_id: ScanId,
        api_token: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<BuildScanReport, ScanError> {
        let compiled = pattern_ids
            .iter()
            .filter_map(|id| patterns.get(id))
            .map(Pattern::compile)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let detail_url = self.endpoints.build_detail_url(build_number);
        let failure_message = format!(
            "Build details fetch failed for build number: {}",
            build_number
        );
        let query = [("circle-token", api_token.to_string())];

        // Keyed on the URL without the token so entries survive token rotation
        let detail = self
            .cache
            .fetch_or_compute(
                &DiskCache::detail_key(&detail_url),
                until_cancelled(
                    cancel,
                    self.client
                        .get_json_or_fail(&detail_url, &query, &failure_message),
                ),
                |value| BuildDetail::from_json(value, &detail_url),
            )
            .await?;

        let steps = self
            .select_failure_step(&detail, &compiled, &detail_url, cancel)
            .await?;
        if steps.is_empty() {
            self.warn(&ScanError::NoFailureStepFound {
                build_number: build_number.value(),
            });
        }

        Ok(BuildScanReport {
            build_number,
            scanned_pattern_ids: pattern_ids.iter().copied().collect(),
            scan_id,
            steps,
        })
    }

    /// Locates the failing step of a build and scans its console output
    ///
    /// Returns at most one outcome. An empty list means the failure could not
    /// be pinpointed.
    pub async fn select_failure_step(
        &self,
        detail: &BuildDetail,
        patterns: &[CompiledPattern],
        detail_url: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<Vec<StepOutcome>, ScanError> {
        let selection = FailureStepSelector::locate(detail, detail_url);
        for warning in &selection.warnings {
            self.warn(warning);
        }

        match selection.location {
            Some(FailureLocation::FailedWithOutput {
                step_name,
                output_url,
            }) => {
                // The output URL is signed and short-lived; key on what produced it
                let cache_key = DiskCache::output_key(detail_url, &step_name);
                let failure_message = format!("Console output fetch failed for URL: {}", output_url);

                let log = self
                    .cache
                    .fetch_or_compute(
                        &cache_key,
                        async {
                            debug!("Downloading from: {}", output_url);
                            until_cancelled(
                                cancel,
                                self.client
                                    .get_json_or_fail(&output_url, &[], &failure_message),
                            )
                            .await
                        },
                        |value| {
                            let text = console_log_text(value, &output_url)?;
                            Ok(PatternMatcher::scan(patterns, &text))
                        },
                    )
                    .await?;

                Ok(vec![StepOutcome::Failed { step_name, log }])
            }
            Some(FailureLocation::TimedOut { step_name }) => {
                Ok(vec![StepOutcome::TimedOut { step_name }])
            }
            None => Ok(vec![]),
        }
    }

    fn warn(&self, warning: &ScanError) {
        self.report_issue(&warning.to_string(), warning);
    }

    /// Reports on the error channel, marked by whether the error is skippable
    fn report_issue(&self, message: &str, error: &ScanError) {
        debug!("{}", message);
        if error.is_warning() {
            self.progress_reporter
                .report_error(&format!("⚠️  Warning: {}", message));
        } else {
            self.progress_reporter.report_error(&format!("❌ {}", message));
        }
    }

    fn report_obligation_progress(
        &self,
        processed: usize,
        total: usize,
        build_number: BuildNumber,
        result: &std::result::Result<BuildScanReport, ScanError>,
    ) {
        let line_counts = match result {
            Ok(report) => report
                .steps
                .iter()
                .map(|step| format!("\"{}\": {}", step.step_name(), step.line_count()))
                .collect::<Vec<_>>()
                .join(";"),
            Err(_) => "failed".to_string(),
        };

        let message = format!(
            "Processed {}/{} logs (build id: {}; linecounts: {})...",
            processed, total, build_number, line_counts
        );
        debug!("{}", message);
        self.progress_reporter
            .report_progress(processed, total, Some(&message));
    }

    fn partition(outcomes: Vec<ObligationResult>) -> (Vec<BuildScanReport>, Vec<ScanFailure>) {
        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (build_number, result) in outcomes {
            match result {
                Ok(report) => reports.push(report),
                Err(error) => failures.push(ScanFailure {
                    build_number,
                    error,
                }),
            }
        }
        (reports, failures)
    }
}
