//! Payload shapes returned by the CI provider.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! provider's responses is ignored.

use super::{Build, BuildNumber};
use crate::shared::ScanError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct BuildSummary {
    build_num: u64,
    #[serde(default)]
    vcs_revision: Option<String>,
    #[serde(default)]
    queued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    workflows: Option<WorkflowInfo>,
}

#[derive(Debug, Deserialize)]
struct WorkflowInfo {
    #[serde(default)]
    job_name: Option<String>,
}

impl From<BuildSummary> for Build {
    fn from(summary: BuildSummary) -> Self {
        Build::new(
            BuildNumber::new(summary.build_num),
            summary.vcs_revision.unwrap_or_default(),
            summary.queued_at,
            summary.workflows.and_then(|w| w.job_name),
        )
    }
}

/// Decodes one page of the branch build list
pub fn builds_from_page(page: &Value, context: &str) -> Result<Vec<Build>, ScanError> {
    let summaries =
        Vec::<BuildSummary>::deserialize(page).map_err(|e| ScanError::MalformedResponse {
            context: context.to_string(),
            details: e.to_string(),
        })?;
    Ok(summaries.into_iter().map(Build::from).collect())
}

/// Build detail: the ordered step list with its actions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildDetail {
    #[serde(default)]
    pub steps: Vec<BuildStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildStep {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<StepAction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepAction {
    #[serde(default)]
    pub failed: Option<bool>,
    #[serde(default)]
    pub timedout: Option<bool>,
    #[serde(default)]
    pub output_url: Option<String>,
}

impl StepAction {
    pub fn is_failed(&self) -> bool {
        self.failed.unwrap_or(false)
    }

    pub fn is_timed_out(&self) -> bool {
        self.timedout.unwrap_or(false)
    }

    /// Output location, if present and non-empty
    pub fn output_location(&self) -> Option<&str> {
        self.output_url.as_deref().filter(|url| !url.is_empty())
    }
}

impl BuildDetail {
    pub fn from_json(value: &Value, context: &str) -> Result<Self, ScanError> {
        BuildDetail::deserialize(value).map_err(|e| ScanError::MalformedResponse {
            context: context.to_string(),
            details: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ConsoleOutputEntry {
    message: String,
}

/// Extracts the raw log text from a console output payload.
///
/// The payload is an array; the first element's `message` holds the log.
pub fn console_log_text(value: &Value, context: &str) -> Result<String, ScanError> {
    let entries =
        Vec::<ConsoleOutputEntry>::deserialize(value).map_err(|e| ScanError::MalformedResponse {
            context: context.to_string(),
            details: e.to_string(),
        })?;

    entries
        .into_iter()
        .next()
        .map(|entry| entry.message)
        .ok_or_else(|| ScanError::MalformedResponse {
            context: context.to_string(),
            details: "console output array is empty".to_string(),
        })
}
