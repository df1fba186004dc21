mod failure_step_selector;
mod pattern_matcher;

pub use failure_step_selector::{FailureLocation, FailureStepSelector, StepSelection};
pub use pattern_matcher::{split_lines, PatternMatcher};
