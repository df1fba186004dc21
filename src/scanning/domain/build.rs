use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-assigned build number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildNumber(u64);

impl BuildNumber {
    pub fn new(number: u64) -> Self {
        Self(number)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BuildNumber {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

/// A build as ingested from the provider's build list.
///
/// Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    number: BuildNumber,
    revision: String,
    queued_at: Option<DateTime<Utc>>,
    job_name: Option<String>,
}

impl Build {
    pub fn new(
        number: BuildNumber,
        revision: String,
        queued_at: Option<DateTime<Utc>>,
        job_name: Option<String>,
    ) -> Self {
        Self {
            number,
            revision,
            queued_at,
            job_name,
        }
    }

    pub fn number(&self) -> BuildNumber {
        self.number
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn queued_at(&self) -> Option<DateTime<Utc>> {
        self.queued_at
    }

    pub fn job_name(&self) -> Option<&str> {
        self.job_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_numbers_order_numerically() {
        let mut numbers = vec![BuildNumber::new(9), BuildNumber::new(100), BuildNumber::new(12)];
        numbers.sort();
        assert_eq!(
            numbers,
            vec![BuildNumber::new(9), BuildNumber::new(12), BuildNumber::new(100)]
        );
    }

    #[test]
    fn test_build_number_serializes_as_plain_integer() {
        let json = serde_json::to_string(&BuildNumber::new(4021)).unwrap();
        assert_eq!(json, "4021");
    }

    #[test]
    fn test_build_accessors() {
        let build = Build::new(
            BuildNumber::new(42),
            "abc123".to_string(),
            None,
            Some("test-unit".to_string()),
        );
        assert_eq!(build.number().value(), 42);
        assert_eq!(build.revision(), "abc123");
        assert!(build.queued_at().is_none());
        assert_eq!(build.job_name(), Some("test-unit"));
    }
}
