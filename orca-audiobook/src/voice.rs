//! Voice selection for narration and chapter markers.
//!
//! Orca ships one model file per language and gender. Narration uses the
//! requested gender; chapter markers use the opposite one so chapter
//! boundaries are audible.

use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

/// Supported narration languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Language {
    De,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Voice gender of an Orca model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A resolved voice: which model file speaks a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceModel {
    pub language: Language,
    pub gender: Gender,
    pub model_path: PathBuf,
}

/// File name of the Orca model for a language and gender.
pub fn model_file_name(language: Language, gender: Gender) -> String {
    format!("orca_params_{}_{}.pv", language.code(), gender.code())
}

/// Resolve the voice for a unit.
///
/// Narration (`is_marker == false`) speaks with `gender`, chapter markers
/// with the opposite gender.
pub fn resolve_voice(
    model_dir: &Path,
    language: Language,
    gender: Gender,
    is_marker: bool,
) -> VoiceModel {
    let gender = if is_marker { gender.opposite() } else { gender };
    VoiceModel {
        language,
        gender,
        model_path: model_dir.join(model_file_name(language, gender)),
    }
}

/// Every model file a run with `(language, gender)` loads.
pub fn required_models(model_dir: &Path, language: Language, gender: Gender) -> Vec<PathBuf> {
    [false, true]
        .into_iter()
        .map(|is_marker| resolve_voice(model_dir, language, gender, is_marker).model_path)
        .collect()
}

/// Spoken text of the marker closing `chapter`.
pub fn marker_phrase(language: Language, chapter: usize) -> String {
    match language {
        Language::De => format!("Ende von Kapitel {}.", chapter),
        Language::En => format!("End of chapter {}.", chapter),
    }
}
