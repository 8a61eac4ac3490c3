//! offscribe - offline transcription of audio files
//!
//! Adapts a streaming speech recognizer (Vosk, Whisper) to finite audio files:
//! load a model once, then turn any number of files into transcripts.
//!
//! ```ignore
//! use offscribe::engine::vosk::{VoskConfig, VoskEngine};
//! use offscribe::TranscriptionPipeline;
//!
//! let pipeline = TranscriptionPipeline::new(VoskEngine::new(VoskConfig::default()));
//! pipeline.load_model("/models/en-small")?;
//! let text = pipeline.transcribe("/audio/sample.wav")?;
//! # Ok::<(), offscribe::OffscribeError>(())
//! ```

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod app;
pub mod audio;
pub mod cancel;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod pipeline;
#[cfg(feature = "cli")]
pub mod telemetry;

// Core traits (engine → session)
pub use engine::{RecognitionResult, RecognizerSession, SpeechEngine};

// Pipeline
pub use cancel::CancelToken;
pub use pipeline::{PipelineState, TranscriptionPipeline};

// Error handling
pub use error::{ErrorKind, OffscribeError, Result, TranscriptionFailure};

// Config
pub use config::{Backend, Config};

/// Package version, suffixed with `+<short git hash>` when built from a checkout.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    option_env!("GIT_HASH")
        .filter(|hash| !hash.is_empty())
        .map_or_else(|| version.to_string(), |hash| format!("{version}+{hash}"))
}
