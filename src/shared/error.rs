use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes let wrapper scripts tell a clean run apart from a run in
/// which individual builds could not be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every obligation was scanned
    Success = 0,
    /// The run finished but one or more builds failed to scan
    ScanFailures = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Fatal error (build list fetch, persistence, configuration, ...)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a run that ended in `error`
    ///
    /// A run abandoned through cancellation is reported like a run with scan
    /// failures; everything else is fatal.
    pub fn for_error(error: &anyhow::Error) -> Self {
        let cancelled = error
            .chain()
            .any(|cause| matches!(cause.downcast_ref::<ScanError>(), Some(ScanError::Cancelled)));
        if cancelled {
            ExitCode::ScanFailures
        } else {
            ExitCode::ApplicationError
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::ScanFailures => write!(f, "Scan Failures (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Errors raised by the acquisition-and-scan pipeline.
///
/// `MissingOutputLocation`, `NoFailureStepFound` and `CacheRead` are
/// recoverable: callers log them as warnings and keep going. The rest are
/// fatal to the operation that produced them.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{message}\nDetails: {reason}")]
    FetchFailure { message: String, reason: String },

    #[error("Malformed response from {context}: {details}")]
    MalformedResponse { context: String, details: String },

    #[error("No output URL for build step \"{step_name}\", from JSON at URL: {url}")]
    MissingOutputLocation { step_name: String, url: String },

    #[error("No specific step failed for build \"{build_number}\"")]
    NoFailureStepFound { build_number: u64 },

    #[error("Failed to read cache file: {path}\nDetails: {details}")]
    CacheRead { path: PathBuf, details: String },

    #[error("Invalid pattern #{id}: {details}\n\n💡 Hint: Check the regular expression syntax of this pattern")]
    InvalidPattern { id: i64, details: String },

    #[error("Persistence error: {details}")]
    Persistence { details: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl ScanError {
    pub fn fetch_failure(message: impl Into<String>, reason: impl fmt::Display) -> Self {
        ScanError::FetchFailure {
            message: message.into(),
            reason: reason.to_string(),
        }
    }

    pub fn persistence(details: impl fmt::Display) -> Self {
        ScanError::Persistence {
            details: details.to_string(),
        }
    }

    /// True for errors that are reported and then skipped
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ScanError::MissingOutputLocation { .. }
                | ScanError::NoFailureStepFound { .. }
                | ScanError::CacheRead { .. }
        )
    }
}
