use crate::scanning::domain::BuildDetail;
use crate::shared::ScanError;

/// Where a build's failure lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureLocation {
    /// A failed action whose console output can be fetched
    FailedWithOutput { step_name: String, output_url: String },
    /// An action that timed out
    TimedOut { step_name: String },
}

impl FailureLocation {
    pub fn step_name(&self) -> &str {
        match self {
            FailureLocation::FailedWithOutput { step_name, .. }
            | FailureLocation::TimedOut { step_name } => step_name,
        }
    }
}

/// Outcome of walking a build's step tree
#[derive(Debug, Default)]
pub struct StepSelection {
    pub location: Option<FailureLocation>,
    /// Recoverable problems seen on the way, in document order
    pub warnings: Vec<ScanError>,
}

/// FailureStepSelector finds the step responsible for a build's failure.
///
/// Steps are walked in order and actions within each step in order. The
/// first failed action that carries an output URL, or the first timed-out
/// action, wins. Failed actions without output are reported as warnings and
/// skipped.
pub struct FailureStepSelector;

impl FailureStepSelector {
    /// `detail_url` is only used to make warnings traceable
    pub fn locate(detail: &BuildDetail, detail_url: &str) -> StepSelection {
        let mut warnings = Vec::new();

        for step in &detail.steps {
            for action in &step.actions {
                if action.is_failed() {
                    if let Some(output_url) = action.output_location() {
                        return StepSelection {
                            location: Some(FailureLocation::FailedWithOutput {
                                step_name: step.name.clone(),
                                output_url: output_url.to_string(),
                            }),
                            warnings,
                        };
                    }

                    warnings.push(ScanError::MissingOutputLocation {
                        step_name: step.name.clone(),
                        url: detail_url.to_string(),
                    });
                } else if action.is_timed_out() {
                    return StepSelection {
                        location: Some(FailureLocation::TimedOut {
                            step_name: step.name.clone(),
                        }),
                        warnings,
                    };
                }
            }
        }

        StepSelection {
            location: None,
            warnings,
        }
    }
}
