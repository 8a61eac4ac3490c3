//! Default configuration constants for offscribe.
//!
//! Shared constants used by the pipeline, the engines and the configuration
//! layer.

/// Sample rate in Hz every recognizer session is created with.
///
/// Fixed at 16kHz, the rate speech models are trained on. It is not negotiated
/// with the audio file and cannot be configured.
pub const SAMPLE_RATE: u32 = 16000;

/// Number of bytes read from the audio file and fed to a session at a time.
pub const CHUNK_SIZE: usize = 4096;

/// Default language code for engines that accept one.
///
/// "auto" lets the engine detect the spoken language automatically.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Default log filter when neither the config nor `OFFSCRIBE_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV_VAR: &str = "OFFSCRIBE_LOG";
