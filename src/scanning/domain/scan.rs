use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of one execution of the matching pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(i64);

impl ScanId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    pub id: ScanId,
    pub created_at: DateTime<Utc>,
}

impl Scan {
    pub fn new(id: ScanId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
        }
    }
}
