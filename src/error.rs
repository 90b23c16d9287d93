use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid tagger model: {0}")]
    InvalidModel(String),

    #[error("Invalid dictionary line {line} in {}", path.display())]
    InvalidDictionary { path: PathBuf, line: usize },

    #[error("Length mismatch: expected {expected} labels, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Expected {expected} display labels, got {actual}")]
    DisplayLabels { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
