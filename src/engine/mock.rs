//! Deterministic in-process engine for tests and benchmarks.
//!
//! The mock "hears" text: NUL bytes are silence and every other byte is read
//! as UTF-8. A file containing `hello world` transcribes to `"hello world"`;
//! a file of zeros transcribes to `""`. The final result is produced as a JSON
//! document and decoded like a real engine's output.

use crate::engine::{EngineError, RecognitionResult, RecognizerSession, SpeechEngine};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counters shared by a mock engine, its models and its sessions.
#[derive(Debug, Default)]
pub struct MockStats {
    models_loaded: AtomicUsize,
    models_released: AtomicUsize,
    sessions_created: AtomicUsize,
    sessions_released: AtomicUsize,
    active_sessions: AtomicUsize,
    max_active_sessions: AtomicUsize,
    last_sample_rate: AtomicU32,
    chunk_sizes: Mutex<Vec<usize>>,
    session_models: Mutex<Vec<PathBuf>>,
}

impl MockStats {
    pub fn models_loaded(&self) -> usize {
        self.models_loaded.load(Ordering::SeqCst)
    }

    pub fn models_released(&self) -> usize {
        self.models_released.load(Ordering::SeqCst)
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }

    pub fn sessions_released(&self) -> usize {
        self.sessions_released.load(Ordering::SeqCst)
    }

    /// Highest number of sessions that were alive at the same time.
    pub fn max_active_sessions(&self) -> usize {
        self.max_active_sessions.load(Ordering::SeqCst)
    }

    pub fn last_sample_rate(&self) -> u32 {
        self.last_sample_rate.load(Ordering::SeqCst)
    }

    /// Sizes of every chunk fed to any session, in feed order.
    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunk_sizes
            .lock()
            .map(|sizes| sizes.clone())
            .unwrap_or_default()
    }

    /// Model path each session was created on, in creation order.
    pub fn session_models(&self) -> Vec<PathBuf> {
        self.session_models
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }
}

/// How sessions created by a mock engine behave.
#[derive(Debug, Clone, Default)]
struct Behavior {
    response: Option<String>,
    omit_text: bool,
    feed_failure_after: Option<usize>,
    finalize_failure: bool,
    feed_delay: Option<Duration>,
    concurrent: bool,
}

/// Mock engine with builder-style failure injection.
#[derive(Debug, Clone)]
pub struct MockEngine {
    behavior: Behavior,
    load_failure: bool,
    rejected_paths: Vec<PathBuf>,
    available: bool,
    panicking_probe: bool,
    stats: Arc<MockStats>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            behavior: Behavior {
                concurrent: true,
                ..Behavior::default()
            },
            load_failure: false,
            rejected_paths: Vec::new(),
            available: true,
            panicking_probe: false,
            stats: Arc::new(MockStats::default()),
        }
    }

    /// Return `response` as the transcript regardless of the audio.
    pub fn with_response(mut self, response: &str) -> Self {
        self.behavior.response = Some(response.to_string());
        self
    }

    /// Produce final results that lack a `text` field.
    pub fn without_text_field(mut self) -> Self {
        self.behavior.omit_text = true;
        self
    }

    /// Reject every model.
    pub fn with_load_failure(mut self) -> Self {
        self.load_failure = true;
        self
    }

    /// Reject only the model at `path`.
    pub fn with_load_failure_for(mut self, path: impl Into<PathBuf>) -> Self {
        self.rejected_paths.push(path.into());
        self
    }

    /// Fail the feed of chunk number `chunks + 1`.
    pub fn with_feed_failure_after(mut self, chunks: usize) -> Self {
        self.behavior.feed_failure_after = Some(chunks);
        self
    }

    pub fn with_finalize_failure(mut self) -> Self {
        self.behavior.finalize_failure = true;
        self
    }

    /// Sleep for `delay` on every chunk fed.
    pub fn with_feed_delay(mut self, delay: Duration) -> Self {
        self.behavior.feed_delay = Some(delay);
        self
    }

    /// Report the backend as missing from the platform.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Panic inside `probe`.
    pub fn panicking_probe(mut self) -> Self {
        self.panicking_probe = true;
        self
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

/// Mock engine whose sessions must never overlap.
///
/// Creating a session while another one is alive fails, so a caller that
/// ignores `CONCURRENT_SESSIONS = false` is caught.
#[derive(Debug, Clone)]
pub struct SerialMockEngine(MockEngine);

impl SerialMockEngine {
    pub fn new(mut inner: MockEngine) -> Self {
        inner.behavior.concurrent = false;
        Self(inner)
    }

    pub fn stats(&self) -> Arc<MockStats> {
        self.0.stats()
    }
}

impl SpeechEngine for SerialMockEngine {
    type Model = MockModel;
    type Session = MockSession;
    const CONCURRENT_SESSIONS: bool = false;

    fn name(&self) -> &str {
        "mock-serial"
    }

    fn probe(&self) -> Result<(), EngineError> {
        self.0.probe()
    }

    fn load_model(&self, path: &Path) -> Result<MockModel, EngineError> {
        self.0.load_model(path)
    }

    fn create_session(
        &self,
        model: Arc<MockModel>,
        sample_rate: u32,
    ) -> Result<MockSession, EngineError> {
        self.0.create_session(model, sample_rate)
    }
}

/// Model "loaded" by the mock engine.
#[derive(Debug)]
pub struct MockModel {
    path: PathBuf,
    stats: Arc<MockStats>,
}

impl MockModel {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MockModel {
    fn drop(&mut self) {
        self.stats.models_released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Session accumulating audio bytes.
#[derive(Debug)]
pub struct MockSession {
    _model: Arc<MockModel>,
    behavior: Behavior,
    audio: Vec<u8>,
    chunks_fed: usize,
    stats: Arc<MockStats>,
}

impl MockSession {
    fn decode(&self) -> String {
        if let Some(response) = &self.behavior.response {
            return response.clone();
        }
        let voiced: Vec<u8> = self.audio.iter().copied().filter(|&b| b != 0).collect();
        String::from_utf8_lossy(&voiced)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.stats.active_sessions.fetch_sub(1, Ordering::SeqCst);
        self.stats.sessions_released.fetch_add(1, Ordering::SeqCst);
    }
}

impl SpeechEngine for MockEngine {
    type Model = MockModel;
    type Session = MockSession;
    const CONCURRENT_SESSIONS: bool = true;

    fn name(&self) -> &str {
        "mock"
    }

    fn probe(&self) -> Result<(), EngineError> {
        if self.panicking_probe {
            panic!("mock probe panicked");
        }
        if self.available {
            Ok(())
        } else {
            Err(EngineError::Unavailable("mock engine disabled".to_string()))
        }
    }

    fn load_model(&self, path: &Path) -> Result<MockModel, EngineError> {
        if self.load_failure || self.rejected_paths.iter().any(|p| p == path) {
            return Err(EngineError::ModelRejected(format!(
                "{} is not a mock model",
                path.display()
            )));
        }
        self.stats.models_loaded.fetch_add(1, Ordering::SeqCst);
        Ok(MockModel {
            path: path.to_path_buf(),
            stats: Arc::clone(&self.stats),
        })
    }

    fn create_session(
        &self,
        model: Arc<MockModel>,
        sample_rate: u32,
    ) -> Result<MockSession, EngineError> {
        if !self.behavior.concurrent && self.stats.active_sessions.load(Ordering::SeqCst) > 0 {
            return Err(EngineError::Session(
                "another session is already running".to_string(),
            ));
        }

        self.stats.sessions_created.fetch_add(1, Ordering::SeqCst);
        let active = self.stats.active_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats
            .max_active_sessions
            .fetch_max(active, Ordering::SeqCst);
        self.stats
            .last_sample_rate
            .store(sample_rate, Ordering::SeqCst);
        if let Ok(mut paths) = self.stats.session_models.lock() {
            paths.push(model.path.clone());
        }

        Ok(MockSession {
            _model: model,
            behavior: self.behavior.clone(),
            audio: Vec::new(),
            chunks_fed: 0,
            stats: Arc::clone(&self.stats),
        })
    }
}

impl RecognizerSession for MockSession {
    fn accept(&mut self, chunk: &[u8]) -> Result<(), EngineError> {
        if self
            .behavior
            .feed_failure_after
            .is_some_and(|limit| self.chunks_fed >= limit)
        {
            return Err(EngineError::Decode(format!(
                "mock feed failure at chunk {}",
                self.chunks_fed
            )));
        }
        if let Some(delay) = self.behavior.feed_delay {
            std::thread::sleep(delay);
        }
        if let Ok(mut sizes) = self.stats.chunk_sizes.lock() {
            sizes.push(chunk.len());
        }
        self.audio.extend_from_slice(chunk);
        self.chunks_fed += 1;
        Ok(())
    }

    fn finalize(self) -> Result<RecognitionResult, EngineError> {
        if self.behavior.finalize_failure {
            return Err(EngineError::Decode("mock finalize failure".to_string()));
        }
        let document = if self.behavior.omit_text {
            serde_json::json!({ "result": [] })
        } else {
            serde_json::json!({ "text": self.decode() })
        };
        RecognitionResult::from_json(&document.to_string())
    }
}
