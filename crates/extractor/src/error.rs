use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No input path given")]
    EmptyPath,

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to load C# grammar: {0}")]
    LanguageError(#[from] tree_sitter::LanguageError),

    #[error("Parser produced no syntax tree")]
    ParseError,

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ExtractError {
    /// Whether the failure stems from the caller's input rather than from processing it.
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyPath | Self::NotFound(_) | Self::Unreadable { .. } | Self::ConfigError(_)
        )
    }
}
