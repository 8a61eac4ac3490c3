//! Bounded audio-file transcription.
//!
//! A [`TranscriptionPipeline`] holds at most one loaded model and turns audio
//! files into transcripts:
//!
//! ```text
//! load_model ──► Ready ──► transcribe: open file → session → chunks → finalize → text
//! ```
//!
//! Every transcription gets a fresh session. The model slot is swapped
//! atomically: a transcription keeps the model it started with alive until it
//! finishes, even if `load_model` replaces it in the meantime.

use crate::audio::ChunkReader;
use crate::cancel::CancelToken;
use crate::defaults::{CHUNK_SIZE, SAMPLE_RATE};
use crate::engine::{RecognizerSession, SpeechEngine};
use crate::error::{OffscribeError, Result, TranscriptionFailure};
use std::fs::File;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

/// Lifecycle state of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No model loaded; transcription is rejected.
    NoModel,
    /// A model is loaded and transcriptions may run.
    Ready,
}

struct LoadedModel<M> {
    path: PathBuf,
    model: Arc<M>,
}

impl<M> Clone for LoadedModel<M> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            model: Arc::clone(&self.model),
        }
    }
}

/// Adapts a streaming recognizer to finite audio files.
pub struct TranscriptionPipeline<E: SpeechEngine> {
    engine: E,
    slot: RwLock<Option<LoadedModel<E::Model>>>,
    /// Held for the whole session when the engine cannot run sessions in parallel.
    session_gate: Mutex<()>,
}

impl<E: SpeechEngine> std::fmt::Debug for TranscriptionPipeline<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionPipeline")
            .field("engine", &self.engine.name())
            .field("model_path", &self.model_path())
            .finish()
    }
}

impl<E: SpeechEngine> TranscriptionPipeline<E> {
    /// Create a pipeline with no model loaded.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            slot: RwLock::new(None),
            session_gate: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Load the model at `path`, replacing any model already held.
    ///
    /// # Errors
    /// Returns `OffscribeError::ModelNotFound` if `path` does not exist
    /// Returns `OffscribeError::ModelLoad` if the engine rejects the model
    pub fn load_model(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OffscribeError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let started = Instant::now();
        let model = self
            .engine
            .load_model(path)
            .map_err(|source| OffscribeError::ModelLoad {
                path: path.display().to_string(),
                source,
            })?;

        let loaded = LoadedModel {
            path: path.to_path_buf(),
            model: Arc::new(model),
        };
        let previous = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(loaded);

        tracing::info!(
            engine = self.engine.name(),
            path = %path.display(),
            replaced = ?previous.as_ref().map(|p| p.path.display().to_string()),
            load_ms = started.elapsed().as_millis() as u64,
            "model loaded"
        );

        // Sessions still running on the previous model keep it alive.
        drop(previous);
        Ok(())
    }

    /// Release the held model and return to `NoModel`.
    pub fn unload_model(&self) {
        let previous = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            tracing::info!(path = %previous.path.display(), "model unloaded");
        }
    }

    pub fn state(&self) -> PipelineState {
        if self.current_model().is_some() {
            PipelineState::Ready
        } else {
            PipelineState::NoModel
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == PipelineState::Ready
    }

    /// Path of the model currently held.
    pub fn model_path(&self) -> Option<PathBuf> {
        self.current_model().map(|loaded| loaded.path)
    }

    /// Whether the engine can run on this platform.
    ///
    /// Never fails: engine errors and panics both report `false`.
    pub fn is_available(&self) -> bool {
        match catch_unwind(AssertUnwindSafe(|| self.engine.probe())) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(engine = self.engine.name(), error = %e, "engine unavailable");
                false
            }
            Err(_) => {
                tracing::warn!(engine = self.engine.name(), "engine probe panicked");
                false
            }
        }
    }

    /// Transcribe the audio file at `audio_path`.
    ///
    /// # Errors
    /// Returns `OffscribeError::ModelNotInitialized` if no model is loaded
    /// Returns `OffscribeError::AudioNotFound` if the file does not exist or cannot be opened
    /// Returns `OffscribeError::Transcription` if reading, feeding or finalizing fails
    pub fn transcribe(&self, audio_path: impl AsRef<Path>) -> Result<String> {
        self.transcribe_with_cancel(audio_path, &CancelToken::new())
    }

    /// Transcribe, checking `token` before every chunk.
    ///
    /// A cancelled transcription fails with `OffscribeError::Transcription`
    /// and returns no partial text.
    pub fn transcribe_with_cancel(
        &self,
        audio_path: impl AsRef<Path>,
        token: &CancelToken,
    ) -> Result<String> {
        let loaded = self
            .current_model()
            .ok_or(OffscribeError::ModelNotInitialized)?;

        let path = audio_path.as_ref();
        let file = open_audio(path)?;

        let _span = tracing::debug_span!(
            "transcription",
            engine = self.engine.name(),
            audio = %path.display(),
            model = %loaded.path.display()
        )
        .entered();
        let started = Instant::now();

        let _serial = (!E::CONCURRENT_SESSIONS)
            .then(|| self.session_gate.lock().unwrap_or_else(PoisonError::into_inner));

        let failed = |source: TranscriptionFailure| OffscribeError::Transcription {
            path: path.display().to_string(),
            source,
        };

        let mut session = self
            .engine
            .create_session(loaded.model, SAMPLE_RATE)
            .map_err(|e| failed(e.into()))?;

        let mut reader = ChunkReader::new(file, CHUNK_SIZE);
        loop {
            if token.is_cancelled() {
                tracing::debug!(bytes = reader.bytes_read(), "transcription cancelled");
                return Err(failed(TranscriptionFailure::Cancelled));
            }
            match reader.next_chunk() {
                Ok(Some(chunk)) => session.accept(chunk).map_err(|e| failed(e.into()))?,
                Ok(None) => break,
                Err(e) => return Err(failed(TranscriptionFailure::Read(e))),
            }
        }

        let text = session
            .finalize()
            .map_err(|e| failed(e.into()))?
            .into_text();

        tracing::debug!(
            bytes = reader.bytes_read(),
            chunks = reader.chunks_read(),
            text_len = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transcription completed"
        );

        Ok(text)
    }

    fn current_model(&self) -> Option<LoadedModel<E::Model>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Open an audio file for sequential reading.
fn open_audio(path: &Path) -> Result<File> {
    let not_found = || OffscribeError::AudioNotFound {
        path: path.display().to_string(),
    };
    if !path.exists() || path.is_dir() {
        return Err(not_found());
    }
    File::open(path).map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "audio file not readable");
        not_found()
    })
}
