use crate::application::dto::CiEndpoints;
use crate::ports::outbound::{HttpClient, ProgressReporter, ScanStore};
use crate::scanning::domain::provider::builds_from_page;
use crate::shared::{until_cancelled, ProgressCounter, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// PopulateBuildsUseCase - ingests a branch's build history
///
/// Pages through the provider's build list and persists each page before
/// requesting the next. Pages are fetched strictly one after another: the
/// offset of a page is the number of builds ingested before it.
///
/// # Type Parameters
/// * `C` - HttpClient implementation
/// * `S` - ScanStore implementation
/// * `PR` - ProgressReporter implementation
pub struct PopulateBuildsUseCase<C, S, PR> {
    client: C,
    store: S,
    progress_reporter: PR,
    endpoints: CiEndpoints,
    page_size: usize,
}

impl<C, S, PR> PopulateBuildsUseCase<C, S, PR>
where
    C: HttpClient,
    S: ScanStore,
    PR: ProgressReporter,
{
    pub fn new(
        client: C,
        store: S,
        progress_reporter: PR,
        endpoints: CiEndpoints,
        page_size: usize,
    ) -> Self {
        Self {
            client,
            store,
            progress_reporter,
            endpoints,
            page_size: page_size.max(1),
        }
    }

    /// Ingests builds of `branch` until at least `target_count` are stored
    ///
    /// # Returns
    /// The number of builds ingested. It may exceed `target_count` by less
    /// than one page, or fall short of it if the provider runs out of builds.
    ///
    /// # Errors
    /// Any page fetch or persistence failure aborts population. Pages
    /// persisted before the failure remain.
    pub async fn populate(
        &self,
        target_count: usize,
        branch: &str,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let counter = ProgressCounter::new();
        self.populate_with_counter(target_count, branch, token, &counter, cancel)
            .await
    }

    /// Same as [`populate`](Self::populate), counting into a caller-owned
    /// counter
    pub async fn populate_with_counter(
        &self,
        target_count: usize,
        branch: &str,
        token: &str,
        counter: &ProgressCounter,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        self.progress_reporter.report("📥 Populating builds list...");

        let url = self.endpoints.branch_url(branch);
        let failure_message = format!("Build list fetch failed for branch: {}", branch);

        while counter.get() < target_count {
            let offset = counter.get();
            self.progress_reporter
                .report(&format!("   Fetch builds starting at offset {}...", offset));

            let query = [
                ("circle-token", token.to_string()),
                ("offset", offset.to_string()),
                ("limit", self.page_size.to_string()),
            ];

            let page = until_cancelled(
                cancel,
                self.client.get_json_or_fail(&url, &query, &failure_message),
            )
            .await?;

            let builds = builds_from_page(&page.value, &failure_message)?;
            if builds.is_empty() {
                self.progress_reporter.report_error(&format!(
                    "⚠️  Warning: Build history of branch '{}' exhausted after {} build(s)",
                    branch, offset
                ));
                break;
            }

            self.store.insert_builds(&builds)?;
            let ingested = counter.increment(builds.len());
            debug!(offset, page = builds.len(), ingested, "Persisted build page");
        }

        let total = counter.get();
        info!("Ingested {} build(s) from branch {}", total, branch);
        self.progress_reporter
            .report_completion(&format!("✅ Ingested {} build(s)", total));

        Ok(total)
    }
}
