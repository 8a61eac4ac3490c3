//! Whisper-based speech recognition.
//!
//! Whisper decodes whole utterances rather than streams, so a session buffers
//! every sample it is fed and runs inference once, at finalize.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be
//! installed:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::audio::PcmAssembler;
use crate::audio::pcm::samples_to_f32;
use crate::defaults;
use crate::engine::{EngineError, RecognitionResult, RecognizerSession, SpeechEngine};
use std::path::Path;
use std::sync::{Arc, Once};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for the Whisper engine.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Language code (e.g., "en", "es", "fr"), or "auto" to detect
    pub language: String,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

/// Whisper engine. Models are single GGML files.
#[derive(Debug, Clone, Default)]
pub struct WhisperEngine {
    config: WhisperConfig,
}

impl WhisperEngine {
    pub fn new(config: WhisperConfig) -> Self {
        // Suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });
        Self { config }
    }

    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

/// Buffered Whisper session.
pub struct WhisperSession {
    context: Arc<WhisperContext>,
    config: WhisperConfig,
    pcm: PcmAssembler,
    samples: Vec<i16>,
}

impl std::fmt::Debug for WhisperSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperSession")
            .field("config", &self.config)
            .field("samples", &self.samples.len())
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

impl SpeechEngine for WhisperEngine {
    type Model = WhisperContext;
    type Session = WhisperSession;
    const CONCURRENT_SESSIONS: bool = false;

    fn name(&self) -> &str {
        "whisper"
    }

    fn load_model(&self, path: &Path) -> Result<WhisperContext, EngineError> {
        let path_str = path.to_str().ok_or_else(|| {
            EngineError::ModelRejected("Invalid UTF-8 in model path".to_string())
        })?;
        WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| EngineError::ModelRejected(format!("Failed to load Whisper model: {e}")))
    }

    fn create_session(
        &self,
        model: Arc<WhisperContext>,
        sample_rate: u32,
    ) -> Result<WhisperSession, EngineError> {
        if sample_rate != defaults::SAMPLE_RATE {
            return Err(EngineError::Session(format!(
                "Whisper requires {}Hz audio, got {sample_rate}Hz",
                defaults::SAMPLE_RATE
            )));
        }
        Ok(WhisperSession {
            context: model,
            config: self.config.clone(),
            pcm: PcmAssembler::new(),
            samples: Vec::new(),
        })
    }
}

impl RecognizerSession for WhisperSession {
    fn accept(&mut self, chunk: &[u8]) -> Result<(), EngineError> {
        let samples = self.pcm.push(chunk);
        self.samples.extend_from_slice(samples);
        Ok(())
    }

    fn finalize(self) -> Result<RecognitionResult, EngineError> {
        if self.samples.is_empty() {
            return Ok(RecognitionResult::default());
        }
        let audio = samples_to_f32(&self.samples);

        let mut state = self
            .context
            .create_state()
            .map_err(|e| EngineError::Session(format!("Failed to create Whisper state: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        if self.config.language == defaults::AUTO_LANGUAGE {
            params.set_language(None);
        } else {
            params.set_language(Some(&self.config.language));
        }
        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio)
            .map_err(|e| EngineError::Decode(format!("Whisper inference failed: {e}")))?;

        let mut text = String::new();
        for segment in state.as_iter() {
            text.push_str(&segment.to_string());
        }

        Ok(RecognitionResult::new(text.trim()))
    }
}
