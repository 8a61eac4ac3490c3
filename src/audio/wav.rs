//! WAV header inspection.
//!
//! Transcription never parses the audio: the engine receives the raw bytes.
//! This probe exists so callers can warn when a file is obviously not in the
//! format the recognizer expects.

use crate::defaults::SAMPLE_RATE;
use crate::error::Result;
use std::io::{Read, Seek};
use std::path::Path;

/// Format summary read from a WAV header.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub float: bool,
    /// Samples per channel.
    pub frames: u32,
}

impl WavInfo {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }

    /// Whether the file is 16kHz mono 16-bit integer PCM.
    pub fn matches_recognizer_format(&self) -> bool {
        self.mismatches().is_empty()
    }

    /// Human-readable differences from the recognizer format.
    pub fn mismatches(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.sample_rate != SAMPLE_RATE {
            problems.push(format!(
                "sample rate is {}Hz, expected {}Hz",
                self.sample_rate, SAMPLE_RATE
            ));
        }
        if self.channels != 1 {
            problems.push(format!("{} channels, expected mono", self.channels));
        }
        if self.float || self.bits_per_sample != 16 {
            let format = if self.float { "float" } else { "int" };
            problems.push(format!(
                "{}-bit {} samples, expected 16-bit int",
                self.bits_per_sample, format
            ));
        }
        problems
    }
}

/// Read the WAV header of a file.
///
/// Returns `Ok(None)` if the file is not a WAV file (e.g. raw PCM).
pub fn probe_wav(path: &Path) -> Result<Option<WavInfo>> {
    let file = std::fs::File::open(path)?;
    probe_reader(std::io::BufReader::new(file))
}

/// Read a WAV header from any seekable reader.
pub fn probe_reader<R: Read + Seek>(reader: R) -> Result<Option<WavInfo>> {
    let wav_reader = match hound::WavReader::new(reader) {
        Ok(r) => r,
        Err(hound::Error::IoError(e)) if e.kind() != std::io::ErrorKind::UnexpectedEof => {
            return Err(e.into());
        }
        Err(e) => {
            tracing::debug!(error = %e, "not a WAV header");
            return Ok(None);
        }
    };

    let spec = wav_reader.spec();
    Ok(Some(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        float: spec.sample_format == hound::SampleFormat::Float,
        frames: wav_reader.duration(),
    }))
}
