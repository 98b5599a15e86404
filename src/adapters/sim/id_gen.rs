//! Predictable identifiers for tests and replay.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::IdGenerator;

/// Generates `<prefix>-0`, `<prefix>-1`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: AtomicU64::new(0) }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn case_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{n}", self.prefix)
    }
}
