//! Speech recognition engines.
//!
//! The pipeline never decodes audio itself. It drives an engine through two
//! traits: [`SpeechEngine`] loads models and opens sessions, and
//! [`RecognizerSession`] accumulates audio and produces the final result.
//! Dropping a session releases it.

pub mod mock;
pub mod result;
#[cfg(feature = "vosk")]
pub mod vosk;
#[cfg(feature = "whisper")]
pub mod whisper;

pub use result::{RecognitionResult, WordTiming};

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Failures reported by an engine backend.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("model rejected: {0}")]
    ModelRejected(String),

    #[error("failed to create recognizer session: {0}")]
    Session(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("malformed recognizer result: {0}")]
    MalformedResult(#[from] serde_json::Error),

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// A speech recognition backend.
///
/// Implementations own whatever global setup the backend needs. Models are
/// shared with sessions through `Arc`, so a model outlives every session
/// created from it even if the pipeline replaces it mid-transcription.
pub trait SpeechEngine: Send + Sync {
    /// Loaded acoustic/language model. Never mutated after load.
    type Model: Send + Sync;

    /// Per-request decode state bound to one model.
    type Session: RecognizerSession;

    /// Whether several sessions may decode against one model at the same time.
    const CONCURRENT_SESSIONS: bool;

    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Check that the backend can run on this platform.
    fn probe(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Load a model from an existing path.
    fn load_model(&self, path: &Path) -> Result<Self::Model, EngineError>;

    /// Open a fresh session on `model` at `sample_rate` Hz.
    fn create_session(
        &self,
        model: Arc<Self::Model>,
        sample_rate: u32,
    ) -> Result<Self::Session, EngineError>;
}

/// Stateful decode context for a single transcription.
pub trait RecognizerSession {
    /// Feed the next chunk of the audio byte stream.
    ///
    /// Chunks arrive in file order. Splitting a stream into chunks at any
    /// boundary must not change the final result.
    fn accept(&mut self, chunk: &[u8]) -> Result<(), EngineError>;

    /// Finish the stream and return the final result.
    fn finalize(self) -> Result<RecognitionResult, EngineError>;
}

/// Implement SpeechEngine for Arc<T> so one engine can back several pipelines.
impl<T: SpeechEngine> SpeechEngine for Arc<T> {
    type Model = T::Model;
    type Session = T::Session;
    const CONCURRENT_SESSIONS: bool = T::CONCURRENT_SESSIONS;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn probe(&self) -> Result<(), EngineError> {
        (**self).probe()
    }

    fn load_model(&self, path: &Path) -> Result<Self::Model, EngineError> {
        (**self).load_model(path)
    }

    fn create_session(
        &self,
        model: Arc<Self::Model>,
        sample_rate: u32,
    ) -> Result<Self::Session, EngineError> {
        (**self).create_session(model, sample_rate)
    }
}
