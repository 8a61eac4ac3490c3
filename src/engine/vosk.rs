//! Vosk-based speech recognition.
//!
//! # Feature Gate
//!
//! This module requires the `vosk` feature and a `libvosk` shared library the
//! linker can find:
//!
//! ```bash
//! cargo build --features vosk
//! ```

use crate::audio::PcmAssembler;
use crate::engine::{EngineError, RecognitionResult, RecognizerSession, SpeechEngine, WordTiming};
use std::path::Path;
use std::sync::{Arc, Once};
use vosk::{CompleteResult, LogLevel, Model, Recognizer};

static LOG_LEVEL_SET: Once = Once::new();

/// Configuration for the Vosk engine.
#[derive(Debug, Clone, Default)]
pub struct VoskConfig {
    /// Include per-word timings in results.
    pub words: bool,
    /// Number of alternative transcripts to request (0 = single best).
    pub max_alternatives: u16,
}

/// Vosk engine. Models are directories in the Vosk model layout.
#[derive(Debug, Clone, Default)]
pub struct VoskEngine {
    config: VoskConfig,
}

impl VoskEngine {
    pub fn new(config: VoskConfig) -> Self {
        // Kaldi logs every model load to stderr otherwise
        LOG_LEVEL_SET.call_once(|| vosk::set_log_level(LogLevel::Error));
        Self { config }
    }

    pub fn config(&self) -> &VoskConfig {
        &self.config
    }
}

/// A Vosk recognizer bound to one model.
pub struct VoskSession {
    recognizer: Recognizer,
    pcm: PcmAssembler,
    // Dropped after the recognizer.
    _model: Arc<Model>,
}

impl std::fmt::Debug for VoskSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoskSession")
            .field("recognizer", &"<Recognizer>")
            .field("pcm", &self.pcm)
            .finish()
    }
}

impl SpeechEngine for VoskEngine {
    type Model = Model;
    type Session = VoskSession;
    // libvosk models are reference counted and read-only once loaded.
    const CONCURRENT_SESSIONS: bool = true;

    fn name(&self) -> &str {
        "vosk"
    }

    fn load_model(&self, path: &Path) -> Result<Model, EngineError> {
        let path_str = path.to_str().ok_or_else(|| {
            EngineError::ModelRejected("Invalid UTF-8 in model path".to_string())
        })?;
        Model::new(path_str).ok_or_else(|| {
            EngineError::ModelRejected(format!(
                "{} is not a valid Vosk model directory",
                path.display()
            ))
        })
    }

    fn create_session(
        &self,
        model: Arc<Model>,
        sample_rate: u32,
    ) -> Result<VoskSession, EngineError> {
        let mut recognizer = Recognizer::new(&model, sample_rate as f32).ok_or_else(|| {
            EngineError::Session(format!("Vosk refused a recognizer at {sample_rate}Hz"))
        })?;
        recognizer.set_words(self.config.words);
        if self.config.max_alternatives > 0 {
            recognizer.set_max_alternatives(self.config.max_alternatives);
        }

        Ok(VoskSession {
            recognizer,
            pcm: PcmAssembler::new(),
            _model: model,
        })
    }
}

impl RecognizerSession for VoskSession {
    fn accept(&mut self, chunk: &[u8]) -> Result<(), EngineError> {
        let samples = self.pcm.push(chunk);
        if samples.is_empty() {
            return Ok(());
        }
        self.recognizer
            .accept_waveform(samples)
            .map(|_state| ())
            .map_err(|e| EngineError::Decode(format!("Vosk rejected waveform: {e}")))
    }

    fn finalize(mut self) -> Result<RecognitionResult, EngineError> {
        let result = match self.recognizer.final_result() {
            CompleteResult::Single(single) => RecognitionResult {
                text: single.text.to_string(),
                words: single
                    .result
                    .iter()
                    .map(|w| WordTiming {
                        word: w.word.to_string(),
                        start: w.start,
                        end: w.end,
                        conf: w.conf,
                    })
                    .collect(),
            },
            CompleteResult::Multiple(multiple) => multiple
                .alternatives
                .first()
                .map(|best| RecognitionResult::new(best.text))
                .unwrap_or_default(),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vosk_config_default() {
        let config = VoskConfig::default();
        assert!(!config.words);
        assert_eq!(config.max_alternatives, 0);
    }

    #[test]
    fn test_vosk_rejects_non_model_directory() {
        let dir = tempfile::tempdir().unwrap();
        let engine = VoskEngine::new(VoskConfig::default());
        let result = engine.load_model(dir.path());
        assert!(matches!(result, Err(EngineError::ModelRejected(_))));
    }

    #[test]
    fn test_vosk_session_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<VoskSession>();
    }
}
