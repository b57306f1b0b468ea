//! Speech capture adapter — wraps a speech-to-text engine behind one seam.
//!
//! DESIGN
//! ======
//! The engine itself (platform API, cloud STT, a test double) lives behind
//! [`SpeechEngine`]. [`SpeechCapture`] owns the per-utterance state the
//! student controller observes: listening flag, interim and final
//! transcripts, confidence, error, and elapsed response time. Engines push
//! [`EngineEvent`]s through a channel; the capture consumes them via
//! [`SpeechCapture::apply`].
//!
//! LIFECYCLE
//! =========
//! `start_listening` acquires a capture session from the engine; a final
//! transcript, an engine error, or `stop_listening`/`abort_listening`
//! releases it. Every stop path is safe to call from any state, including
//! before a start completes.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::warn;

// =============================================================================
// ENGINE SEAM
// =============================================================================

/// Events an engine reports while a capture session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Partial transcript; superseded by later events.
    Interim { transcript: String, confidence: f64 },
    /// Utterance complete. The only event callers treat as "answer ready".
    Final { transcript: String, confidence: f64 },
    /// The engine gave up without hearing anything.
    NoSpeech,
    /// Engine failure; capture is over.
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech recognition is not supported in this environment")]
    Unsupported,
    #[error("speech engine failed to start: {0}")]
    EngineStart(String),
}

/// Control handle for one running capture session. Dropping it must also
/// release the capture resource.
pub trait CaptureControl: Send {
    fn stop(&mut self);
}

/// Speech-to-text engine seam.
pub trait SpeechEngine: Send + Sync {
    /// Whether capture is available at all in this environment.
    fn supported(&self) -> bool;

    /// Begin one capture session, delivering events through `events`.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine cannot start a session.
    fn start(&self, events: mpsc::Sender<EngineEvent>) -> Result<Box<dyn CaptureControl>, SpeechError>;
}

/// Engine for environments with no speech capability. Every start fails
/// with [`SpeechError::Unsupported`]; the capture surfaces that as an
/// explanatory error instead of blocking the test.
pub struct UnsupportedEngine;

impl SpeechEngine for UnsupportedEngine {
    fn supported(&self) -> bool {
        false
    }

    fn start(&self, _events: mpsc::Sender<EngineEvent>) -> Result<Box<dyn CaptureControl>, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

// =============================================================================
// TEXT TO SPEECH
// =============================================================================

/// Fire-and-forget playback collaborator. Used to read a word aloud for
/// pronunciation and reading tests.
pub trait Speak: Send + Sync {
    fn speak(&self, text: &str);
}

// =============================================================================
// CAPTURE STATE
// =============================================================================

/// Observable capture state for one utterance at a time.
pub struct SpeechCapture {
    engine: Arc<dyn SpeechEngine>,
    session: Option<Box<dyn CaptureControl>>,
    events: Option<mpsc::Receiver<EngineEvent>>,
    listening: bool,
    interim: String,
    final_transcript: String,
    confidence: f64,
    error: Option<String>,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl SpeechCapture {
    #[must_use]
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            session: None,
            events: None,
            listening: false,
            interim: String::new(),
            final_transcript: String::new(),
            confidence: 0.0,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    #[must_use]
    pub fn supported(&self) -> bool {
        self.engine.supported()
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    #[must_use]
    pub fn interim_transcript(&self) -> &str {
        &self.interim
    }

    #[must_use]
    pub fn final_transcript(&self) -> &str {
        &self.final_transcript
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Milliseconds between `start_listening` and the final transcript.
    /// `None` until an utterance completes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn response_time_ms(&self) -> Option<u64> {
        let started = self.started_at?;
        let finished = self.finished_at?;
        Some(finished.duration_since(started).as_millis() as u64)
    }

    /// Begin listening. A no-op while already listening; surfaces an error
    /// instead of starting when the environment is unsupported.
    pub fn start_listening(&mut self) {
        if self.listening {
            return;
        }
        if !self.engine.supported() {
            self.error = Some(SpeechError::Unsupported.to_string());
            return;
        }

        self.reset_transcript();
        let (tx, rx) = mpsc::channel(32);
        match self.engine.start(tx) {
            Ok(session) => {
                self.session = Some(session);
                self.events = Some(rx);
                self.listening = true;
                self.started_at = Some(Instant::now());
                self.finished_at = None;
            }
            Err(e) => {
                warn!(error = %e, "speech capture failed to start");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Stop listening and release the capture session. Safe from any state.
    pub fn stop_listening(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        self.events = None;
        self.listening = false;
    }

    /// Stop listening and discard anything captured so far.
    pub fn abort_listening(&mut self) {
        self.stop_listening();
        self.reset_transcript();
    }

    pub fn reset_transcript(&mut self) {
        self.interim.clear();
        self.final_transcript.clear();
        self.confidence = 0.0;
        self.error = None;
    }

    /// Whether the captured final transcript matches the expected word at
    /// the given similarity threshold.
    #[must_use]
    pub fn check_word_match(&self, expected: &str, threshold: f64) -> bool {
        !self.final_transcript.is_empty()
            && crate::similarity::matches(&self.final_transcript, expected, threshold)
    }

    /// Next engine event, if a session is running.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.events.as_mut()?.recv().await
    }

    /// Fold one engine event into the observable state.
    pub fn apply(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Interim { transcript, confidence } => {
                self.interim = transcript.clone();
                self.confidence = *confidence;
            }
            EngineEvent::Final { transcript, confidence } => {
                self.final_transcript = transcript.clone();
                self.interim.clear();
                self.confidence = *confidence;
                self.finished_at = Some(Instant::now());
                self.stop_listening();
            }
            EngineEvent::NoSpeech => {
                self.error = Some("no speech detected".into());
                self.stop_listening();
            }
            EngineEvent::Error(message) => {
                self.error = Some(message.clone());
                self.stop_listening();
            }
        }
    }
}

#[cfg(test)]
#[path = "speech_test.rs"]
mod tests;
