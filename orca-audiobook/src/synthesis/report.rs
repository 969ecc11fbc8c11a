//! Per-unit outcomes of a synthesis run.

use crate::error::AudiobookError;
use crate::text::ChunkKind;

/// How a unit's artifact came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// The engine produced a new artifact
    Synthesized,
    /// An artifact from an earlier run was reused
    Skipped,
}

/// Result of processing one unit.
#[derive(Debug)]
pub struct UnitOutcome {
    pub global_index: usize,
    pub chapter_index: usize,
    pub kind: ChunkKind,
    pub result: Result<UnitStatus, AudiobookError>,
}

impl UnitOutcome {
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Everything the assembler needs plus per-unit outcomes.
#[derive(Debug, Default)]
pub struct SynthesisReport {
    /// Highest index allocated, 0 for an empty run
    pub max_index: usize,
    /// Index of each chapter's marker, in chapter order
    pub marker_indices: Vec<usize>,
    /// One entry per unit, in index order
    pub outcomes: Vec<UnitOutcome>,
}

impl SynthesisReport {
    pub fn synthesized_count(&self) -> usize {
        self.count(UnitStatus::Synthesized)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(UnitStatus::Skipped)
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    fn count(&self, status: UnitStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(s) if s == status))
            .count()
    }
}
