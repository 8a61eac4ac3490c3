#![cfg(any(feature = "vosk", feature = "whisper"))]

//! Real-engine transcription. Skipped unless a model and a recording are
//! provided through the environment:
//!
//! - `OFFSCRIBE_TEST_AUDIO`: 16 kHz mono 16-bit WAV saying "the quick brown fox"
//! - `OFFSCRIBE_TEST_VOSK_MODEL`: Vosk model directory
//! - `OFFSCRIBE_TEST_WHISPER_MODEL`: Whisper GGML model file

use offscribe::{SpeechEngine, TranscriptionPipeline};
use std::path::PathBuf;

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .map(PathBuf::from)
        .filter(|path| path.exists())
}

fn find_inputs(backend: &str, model_var: &str) -> Option<(PathBuf, PathBuf)> {
    match (env_path(model_var), env_path("OFFSCRIBE_TEST_AUDIO")) {
        (Some(model), Some(audio)) => Some((model, audio)),
        _ => {
            eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
            eprintln!("║  NO {backend:<6} MODEL OR AUDIO FOUND, SKIPPING BACKEND TESTS    ║");
            eprintln!("║                                                              ║");
            eprintln!("║  Set {model_var:<29} and OFFSCRIBE_TEST_AUDIO ║");
            eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
            None
        }
    }
}

fn assert_known_speech<E: SpeechEngine>(pipeline: &TranscriptionPipeline<E>, audio: &PathBuf) {
    let text = pipeline.transcribe(audio).expect("transcription failed");
    let lower = text.to_lowercase();
    for word in ["quick", "brown", "fox"] {
        assert!(lower.contains(word), "Expected '{word}' in transcription, got: {text}");
    }
    eprintln!("[{}] Transcription: \"{text}\"", pipeline.engine().name());
}

#[cfg(feature = "vosk")]
mod vosk_backend {
    use super::*;
    use offscribe::engine::vosk::{VoskConfig, VoskEngine};

    #[test]
    fn test_vosk_transcribes_known_speech() {
        let Some((model, audio)) = find_inputs("VOSK", "OFFSCRIBE_TEST_VOSK_MODEL") else {
            return;
        };
        let pipeline = TranscriptionPipeline::new(VoskEngine::new(VoskConfig::default()));
        assert!(pipeline.is_available());
        pipeline.load_model(&model).expect("failed to load Vosk model");

        assert_known_speech(&pipeline, &audio);
        // Second call reuses the loaded model.
        assert_known_speech(&pipeline, &audio);
    }

    #[test]
    fn test_vosk_rejects_non_model_directory() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = TranscriptionPipeline::new(VoskEngine::new(VoskConfig::default()));
        let error = pipeline.load_model(dir.path()).unwrap_err();
        assert_eq!(error.kind(), offscribe::ErrorKind::ModelLoadError);
    }
}

#[cfg(feature = "whisper")]
mod whisper_backend {
    use super::*;
    use offscribe::engine::whisper::{WhisperConfig, WhisperEngine};

    #[test]
    fn test_whisper_transcribes_known_speech() {
        let Some((model, audio)) = find_inputs("WHISPER", "OFFSCRIBE_TEST_WHISPER_MODEL") else {
            return;
        };
        let config = WhisperConfig {
            language: "en".to_string(),
            threads: Some(4),
        };
        let pipeline = TranscriptionPipeline::new(WhisperEngine::new(config));
        pipeline.load_model(&model).expect("failed to load Whisper model");

        assert_known_speech(&pipeline, &audio);
    }

    #[test]
    fn test_whisper_rejects_garbage_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("ggml-bogus.bin");
        std::fs::write(&bogus, b"not a ggml model").unwrap();

        let pipeline = TranscriptionPipeline::new(WhisperEngine::new(WhisperConfig::default()));
        let error = pipeline.load_model(&bogus).unwrap_err();
        assert_eq!(error.kind(), offscribe::ErrorKind::ModelLoadError);
    }
}
