//! Final recognizer result.

use crate::engine::EngineError;
use serde::{Deserialize, Serialize};

/// Structured result a session returns at end of stream.
///
/// Only `text` matters to the pipeline. A result without a `text` field is
/// valid and decodes to an empty transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionResult {
    pub text: String,
    #[serde(rename = "result", skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<WordTiming>,
}

/// A recognized word with its position in the audio, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordTiming {
    pub word: String,
    pub start: f32,
    pub end: f32,
    pub conf: f32,
}

impl RecognitionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            words: Vec::new(),
        }
    }

    /// Decode an engine's JSON result document.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Take the transcript exactly as the engine reported it.
    pub fn into_text(self) -> String {
        self.text
    }
}
