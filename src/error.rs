//! Error types for offscribe.
//!
//! Pipeline failures map onto exactly one [`ErrorKind`]. Callers branch on the
//! kind (or its stable [`ErrorKind::code`]) rather than on message text.

use crate::engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OffscribeError {
    // Model lifecycle errors
    #[error("Model not found at path: {path}")]
    ModelNotFound { path: String },

    #[error("Failed to load model from {path}: {source}")]
    ModelLoad {
        path: String,
        #[source]
        source: EngineError,
    },

    #[error("Model not initialized. Call load_model first.")]
    ModelNotInitialized,

    // Transcription errors
    #[error("Audio file not found: {path}")]
    AudioNotFound { path: String },

    #[error("Failed to transcribe {path}: {source}")]
    Transcription {
        path: String,
        #[source]
        source: TranscriptionFailure,
    },

    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors (configuration files, CLI output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What went wrong once a transcription got past its preconditions.
#[derive(Error, Debug)]
pub enum TranscriptionFailure {
    #[error("reading audio failed: {0}")]
    Read(#[source] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("cancelled")]
    Cancelled,
}

/// Stable classification of an [`OffscribeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ModelNotFound,
    ModelLoadError,
    ModelNotInitialized,
    AudioNotFound,
    TranscriptionError,
    ConfigError,
    IoError,
}

impl ErrorKind {
    /// Upper-snake-case code, stable across releases.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ModelNotFound => "MODEL_NOT_FOUND",
            ErrorKind::ModelLoadError => "MODEL_LOAD_ERROR",
            ErrorKind::ModelNotInitialized => "MODEL_NOT_INITIALIZED",
            ErrorKind::AudioNotFound => "AUDIO_NOT_FOUND",
            ErrorKind::TranscriptionError => "TRANSCRIPTION_ERROR",
            ErrorKind::ConfigError => "CONFIG_ERROR",
            ErrorKind::IoError => "IO_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl OffscribeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OffscribeError::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            OffscribeError::ModelLoad { .. } => ErrorKind::ModelLoadError,
            OffscribeError::ModelNotInitialized => ErrorKind::ModelNotInitialized,
            OffscribeError::AudioNotFound { .. } => ErrorKind::AudioNotFound,
            OffscribeError::Transcription { .. } => ErrorKind::TranscriptionError,
            OffscribeError::ConfigParse { .. }
            | OffscribeError::ConfigInvalidValue { .. }
            | OffscribeError::Config(_) => ErrorKind::ConfigError,
            OffscribeError::Io(_) => ErrorKind::IoError,
        }
    }

    /// True when the transcription was stopped through its cancel token.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            OffscribeError::Transcription {
                source: TranscriptionFailure::Cancelled,
                ..
            }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, OffscribeError>;
