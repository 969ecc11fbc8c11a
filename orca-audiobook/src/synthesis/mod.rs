//! Resumable synthesis of chapter text into indexed audio artifacts.

mod orchestrator;
mod report;

pub use orchestrator::SynthesisOrchestrator;
pub use report::SynthesisReport;

/// Hands out global unit indices: 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct IndexCounter {
    last: usize,
}

impl IndexCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next index.
    pub fn allocate(&mut self) -> usize {
        self.last += 1;
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_counter_starts_at_one() {
        let mut counter = IndexCounter::new();
        assert_eq!(counter.allocate(), 1);
        assert_eq!(counter.allocate(), 2);
        assert_eq!(counter.allocate(), 3);
    }
}
