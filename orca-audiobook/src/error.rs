use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudiobookError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Source document not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to parse section {section}: {message}")]
    DocumentParse { section: String, message: String },

    #[error("Synthesis failed for unit {index} (chapter {chapter}, {}): {message}", .path.display())]
    Synthesis {
        index: usize,
        chapter: usize,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to load artifact {index} ({}): {message}", .path.display())]
    ArtifactLoad {
        index: usize,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to export {}: {message}", .path.display())]
    Export { path: PathBuf, message: String },

    #[error("Failed to delete artifact {index} ({}): {source}", .path.display())]
    Cleanup {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AudiobookError>;
