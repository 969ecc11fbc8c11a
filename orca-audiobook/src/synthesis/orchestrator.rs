//! Chapter-by-chapter synthesis into the artifact store.

use super::IndexCounter;
use super::report::{SynthesisReport, UnitOutcome, UnitStatus};
use crate::artifact::ArtifactStore;
use crate::document::Chapter;
use crate::error::AudiobookError;
use crate::text::{TextChunk, chunk_text, chunker::DEFAULT_MAX_LENGTH, normalize};
use crate::tts::SpeechEngine;
use crate::voice::{Gender, Language, marker_phrase, resolve_voice};
use log::{debug, error, info};
use std::path::PathBuf;

/// Progress after one unit has been processed.
#[derive(Debug)]
pub struct SynthesisProgress<'a> {
    /// Units processed so far, including this one
    pub completed: usize,
    /// Units in the whole run
    pub total: usize,
    pub outcome: &'a UnitOutcome,
}

/// Turns chapters into indexed artifacts.
///
/// Units whose artifact already exists are skipped, so rerunning after an
/// interruption only synthesizes what is missing. A failing unit is logged
/// and left without an artifact; the run continues with the next one.
pub struct SynthesisOrchestrator<'a, E: SpeechEngine + ?Sized, S: ArtifactStore + ?Sized> {
    engine: &'a E,
    store: &'a S,
    model_dir: PathBuf,
    language: Language,
    gender: Gender,
    chunk_size: usize,
}

impl<'a, E: SpeechEngine + ?Sized, S: ArtifactStore + ?Sized> SynthesisOrchestrator<'a, E, S> {
    pub fn new(
        engine: &'a E,
        store: &'a S,
        model_dir: impl Into<PathBuf>,
        language: Language,
        gender: Gender,
    ) -> Self {
        Self {
            engine,
            store,
            model_dir: model_dir.into(),
            language,
            gender,
            chunk_size: DEFAULT_MAX_LENGTH,
        }
    }

    /// Set the maximum characters per body unit.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Lay out every unit of the run with its global index.
    ///
    /// Each chapter contributes its normalized, chunked body followed by one
    /// marker unit. Indices depend only on the text and the chunk size, so
    /// repeated runs over the same input agree on them.
    pub fn plan(&self, chapters: &[Chapter]) -> Vec<TextChunk> {
        let mut counter = IndexCounter::new();
        let mut units = Vec::new();

        for (i, chapter) in chapters.iter().enumerate() {
            let chapter_index = i + 1;
            let normalized = normalize(&chapter.body, self.language);

            for content in chunk_text(&normalized, self.chunk_size) {
                units.push(TextChunk::body(counter.allocate(), chapter_index, content));
            }

            units.push(TextChunk::marker(
                counter.allocate(),
                chapter_index,
                marker_phrase(self.language, chapter_index),
            ));
        }

        units
    }

    /// Synthesize every chapter.
    #[cfg(test)]
    pub async fn run(&self, chapters: &[Chapter]) -> SynthesisReport {
        self.run_with_progress(chapters, |_| {}).await
    }

    /// Synthesize every chapter, calling `on_progress` after each unit.
    pub async fn run_with_progress<F>(
        &self,
        chapters: &[Chapter],
        mut on_progress: F,
    ) -> SynthesisReport
    where
        F: FnMut(SynthesisProgress<'_>),
    {
        let units = self.plan(chapters);
        let total = units.len();
        let mut report = SynthesisReport::default();

        info!(
            "Synthesizing {} units from {} chapters with {}",
            total,
            chapters.len(),
            self.engine.name()
        );

        for unit in &units {
            let outcome = self.process(unit).await;

            if unit.is_marker() {
                report.marker_indices.push(unit.global_index);
            }
            report.max_index = report.max_index.max(unit.global_index);

            on_progress(SynthesisProgress {
                completed: report.outcomes.len() + 1,
                total,
                outcome: &outcome,
            });
            report.outcomes.push(outcome);
        }

        report
    }

    async fn process(&self, unit: &TextChunk) -> UnitOutcome {
        let result = if self.store.exists(unit.global_index) {
            info!(
                "Unit {} (chapter {}) skipped, artifact exists: {}",
                unit.global_index,
                unit.chapter_index,
                self.store.location(unit.global_index).display()
            );
            Ok(UnitStatus::Skipped)
        } else {
            self.synthesize(unit).await.map(|()| UnitStatus::Synthesized)
        };

        if let Err(e) = &result {
            error!("{}", e);
        }

        UnitOutcome {
            global_index: unit.global_index,
            chapter_index: unit.chapter_index,
            kind: unit.kind,
            result,
        }
    }

    async fn synthesize(&self, unit: &TextChunk) -> Result<(), AudiobookError> {
        let voice = resolve_voice(&self.model_dir, self.language, self.gender, unit.is_marker());
        debug!(
            "Unit {} ({} voice, {} chars)",
            unit.global_index,
            voice.gender,
            unit.content.chars().count()
        );

        let audio = self
            .engine
            .synthesize(&unit.content, &voice)
            .await
            .map_err(|e| self.failure(unit, format!("{:#}", e)))?;

        self.store
            .write(unit.global_index, &audio)
            .map_err(|e| self.failure(unit, e.to_string()))
    }

    fn failure(&self, unit: &TextChunk, message: String) -> AudiobookError {
        AudiobookError::Synthesis {
            index: unit.global_index,
            chapter: unit.chapter_index,
            path: self.store.location(unit.global_index),
            message,
        }
    }
}
