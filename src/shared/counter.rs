use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared progress counter.
///
/// Cloning yields another handle to the same count, so one instance can be
/// handed to every worker of a pool.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter {
    value: Arc<AtomicUsize>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` and returns the value after the increment
    pub fn increment(&self, count: usize) -> usize {
        self.value.fetch_add(count, Ordering::SeqCst) + count
    }

    pub fn get(&self) -> usize {
        self.value.load(Ordering::SeqCst)
    }
}
