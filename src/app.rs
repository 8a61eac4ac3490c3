//! Command implementations behind the `offscribe` binary.
//!
//! The pipeline is generic over its engine; this module picks the engine from
//! the configuration and drives the pipeline for each command.

use crate::audio::wav::probe_wav;
use crate::cancel::CancelToken;
use crate::config::{Backend, Config};
use crate::engine::SpeechEngine;
use crate::engine::mock::MockEngine;
use crate::error::{OffscribeError, Result};
use crate::pipeline::TranscriptionPipeline;
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options for the transcribe command.
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    pub files: Vec<PathBuf>,
    pub model: Option<PathBuf>,
    pub backend: Option<Backend>,
    pub timeout: Option<Duration>,
    pub with_path: bool,
    pub color: bool,
}

/// Outcome counts of a transcribe run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Load the configured model once and transcribe every file in order.
///
/// Transcripts go to `out`, one line per file. Per-file failures go to `err`
/// as `KIND: message` and are counted; they do not stop the run. Failing to
/// load the model is returned as an error.
pub fn run_transcribe<O: Write, E: Write>(
    config: &Config,
    options: &TranscribeOptions,
    out: &mut O,
    err: &mut E,
) -> Result<Summary> {
    let backend = options.backend.unwrap_or(config.engine.backend);
    let model_path = options
        .model
        .clone()
        .or_else(|| config.engine.model_path.clone())
        .ok_or_else(|| OffscribeError::ConfigInvalidValue {
            key: "engine.model_path".to_string(),
            message: "no model configured (set engine.model_path or pass --model)".to_string(),
        })?;

    match backend {
        Backend::Mock => {
            let pipeline = TranscriptionPipeline::new(MockEngine::new());
            transcribe_files(&pipeline, &model_path, options, out, err)
        }
        #[cfg(feature = "vosk")]
        Backend::Vosk => {
            let pipeline = TranscriptionPipeline::new(vosk_engine(config));
            transcribe_files(&pipeline, &model_path, options, out, err)
        }
        #[cfg(feature = "whisper")]
        Backend::Whisper => {
            let pipeline = TranscriptionPipeline::new(whisper_engine(config));
            transcribe_files(&pipeline, &model_path, options, out, err)
        }
        #[allow(unreachable_patterns)]
        other => Err(not_compiled(other)),
    }
}

/// Drive an already constructed pipeline over `options.files`.
pub fn transcribe_files<S: SpeechEngine, O: Write, E: Write>(
    pipeline: &TranscriptionPipeline<S>,
    model_path: &Path,
    options: &TranscribeOptions,
    out: &mut O,
    err: &mut E,
) -> Result<Summary> {
    pipeline.load_model(model_path)?;

    let mut summary = Summary::default();
    for file in &options.files {
        warn_on_format_mismatch(file);

        let token = options
            .timeout
            .map(CancelToken::with_timeout)
            .unwrap_or_default();

        match pipeline.transcribe_with_cancel(file, &token) {
            Ok(text) => {
                if options.with_path {
                    writeln!(out, "{}\t{}", file.display(), text)?;
                } else {
                    writeln!(out, "{}", text)?;
                }
                summary.succeeded += 1;
            }
            Err(e) => {
                writeln!(err, "{}", format_error(&e, options.color))?;
                summary.failed += 1;
            }
        }
    }
    out.flush()?;

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "transcription run finished"
    );
    Ok(summary)
}

/// Whether `backend` is compiled in and can run here.
#[cfg_attr(
    not(any(feature = "vosk", feature = "whisper")),
    allow(unused_variables)
)]
pub fn check_backend(config: &Config, backend: Backend) -> bool {
    match backend {
        Backend::Mock => TranscriptionPipeline::new(MockEngine::new()).is_available(),
        #[cfg(feature = "vosk")]
        Backend::Vosk => TranscriptionPipeline::new(vosk_engine(config)).is_available(),
        #[cfg(feature = "whisper")]
        Backend::Whisper => TranscriptionPipeline::new(whisper_engine(config)).is_available(),
        #[allow(unreachable_patterns)]
        other => {
            tracing::debug!(backend = %other, "backend not compiled in");
            false
        }
    }
}

/// Render an error as `KIND: message`, with the kind in red if `color`.
pub fn format_error(error: &OffscribeError, color: bool) -> String {
    let code = error.kind().code();
    if color {
        format!("{}: {}", code.red().bold(), error)
    } else {
        format!("{}: {}", code, error)
    }
}

fn warn_on_format_mismatch(file: &Path) {
    match probe_wav(file) {
        Ok(Some(info)) if !info.matches_recognizer_format() => {
            tracing::warn!(
                file = %file.display(),
                problems = %info.mismatches().join("; "),
                "audio is not 16kHz mono 16-bit PCM; transcript may be garbage"
            );
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(file = %file.display(), error = %e, "WAV probe skipped"),
    }
}

fn not_compiled(backend: Backend) -> OffscribeError {
    OffscribeError::ConfigInvalidValue {
        key: "engine.backend".to_string(),
        message: format!(
            "{backend} support not compiled in; rebuild with --features {backend}"
        ),
    }
}

#[cfg(feature = "vosk")]
fn vosk_engine(config: &Config) -> crate::engine::vosk::VoskEngine {
    use crate::engine::vosk::{VoskConfig, VoskEngine};
    VoskEngine::new(VoskConfig {
        words: config.engine.words,
        max_alternatives: 0,
    })
}

#[cfg(feature = "whisper")]
fn whisper_engine(config: &Config) -> crate::engine::whisper::WhisperEngine {
    use crate::engine::whisper::{WhisperConfig, WhisperEngine};
    WhisperEngine::new(WhisperConfig {
        language: config.engine.language.clone(),
        threads: config.engine.threads,
    })
}
