use thiserror::Error;

/// Main error type for the htpy-tailwind-scanner crate
#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to parse file {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to write output to {path}: {message}")]
    OutputError { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Failed to load Python grammar: {0}")]
    GrammarError(String),

    #[error("Watch error: {0}")]
    WatchError(String),
}

impl ScannerError {
    /// Whether this error came from parsing a single source file
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ScannerError::ParseError { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScannerError>;
