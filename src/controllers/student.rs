//! Student controller — answers dispatched words from the student's side.
//!
//! DESIGN
//! ======
//! A state machine driven by coordinator events and speech-capture events.
//! Submission branches by test type: spoken tests submit automatically when
//! a final transcript lands, spelling submits typed text explicitly, and
//! recognition just acknowledges the word. A per-word latch guarantees at
//! most one submission per dispatch; the coordinator never enforces this.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::facade::Facade;
use crate::protocol::{
    ClientEvent, PronunciationRequest, ServerEvent, TestResponse, TestType, WordDispatch,
};
use crate::similarity::{PRONUNCIATION_THRESHOLD, matches};
use crate::speech::{EngineEvent, Speak, SpeechCapture};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StudentError {
    #[error("no word to respond to")]
    NoActiveWord,
    #[error("response already submitted for this word")]
    AlreadySubmitted,
    #[error("type an answer first")]
    EmptyResponse,
    #[error("wrong submission path for {0} tests")]
    WrongTestType(TestType),
}

/// Where the student is in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentPhase {
    WaitingForSession,
    WaitingForWord,
    Responding,
    Submitted,
}

pub struct StudentController {
    facade: Facade,
    capture: SpeechCapture,
    tts: Option<Arc<dyn Speak>>,
    student_id: String,
    student_name: String,
    phase: StudentPhase,
    current: Option<WordDispatch>,
    word_received_at: Option<Instant>,
    typed: String,
    has_submitted: bool,
    /// Read the word aloud automatically on spoken test types.
    auto_speak: bool,
}

// =============================================================================
// CONTROLLER
// =============================================================================

impl StudentController {
    #[must_use]
    pub fn new(
        facade: Facade,
        capture: SpeechCapture,
        tts: Option<Arc<dyn Speak>>,
        student_id: &str,
        student_name: &str,
    ) -> Self {
        Self {
            facade,
            capture,
            tts,
            student_id: student_id.to_string(),
            student_name: student_name.to_string(),
            phase: StudentPhase::WaitingForSession,
            current: None,
            word_received_at: None,
            typed: String::new(),
            has_submitted: false,
            auto_speak: true,
        }
    }

    #[must_use]
    pub fn phase(&self) -> StudentPhase {
        self.phase
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&WordDispatch> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn has_submitted(&self) -> bool {
        self.has_submitted
    }

    #[must_use]
    pub fn capture(&self) -> &SpeechCapture {
        &self.capture
    }

    pub fn set_auto_speak(&mut self, enabled: bool) {
        self.auto_speak = enabled;
    }

    pub fn set_typed_response(&mut self, text: &str) {
        self.typed = text.to_string();
    }

    // ===== COORDINATOR EVENTS =====

    /// Fold one coordinator event into controller state.
    pub fn handle_event(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::TestSessionStarted(start) => {
                info!(session_id = %start.session_id, test_type = %start.test_type, "session started");
                self.phase = StudentPhase::WaitingForWord;
                self.current = None;
                self.has_submitted = false;
                self.typed.clear();
            }
            ServerEvent::ReceiveTestWord(dispatch) => {
                self.begin_word(dispatch);
            }
            ServerEvent::TestSessionEnded(_) => {
                // An in-flight capture would otherwise be orphaned.
                self.capture.abort_listening();
                self.phase = StudentPhase::WaitingForSession;
                self.current = None;
                self.has_submitted = false;
            }
            _ => {}
        }
    }

    fn begin_word(&mut self, dispatch: &WordDispatch) {
        self.typed.clear();
        self.capture.abort_listening();
        self.has_submitted = false;
        self.current = Some(dispatch.clone());
        self.word_received_at = Some(Instant::now());
        self.phase = StudentPhase::Responding;

        match dispatch.test_type {
            TestType::Pronunciation | TestType::Reading => {
                if self.auto_speak {
                    if let Some(tts) = &self.tts {
                        tts.speak(&dispatch.word);
                    }
                }
                self.capture.start_listening();
            }
            TestType::Recognition | TestType::Spelling => {}
        }
    }

    // ===== SPEECH CAPTURE =====

    /// Fold one engine event in; a final transcript on a spoken test type
    /// submits automatically.
    pub fn handle_capture_event(&mut self, event: &EngineEvent) {
        self.capture.apply(event);

        let EngineEvent::Final { transcript, confidence } = event else {
            return;
        };
        let Some(dispatch) = self.current.clone() else {
            return;
        };
        if !matches!(dispatch.test_type, TestType::Pronunciation | TestType::Reading) {
            return;
        }
        if self.has_submitted || self.phase != StudentPhase::Responding {
            return;
        }

        let recognized = matches(transcript, &dispatch.word, PRONUNCIATION_THRESHOLD);
        self.submit(&dispatch, transcript.clone(), recognized, *confidence);
    }

    /// Retry a spoken answer after a miss or a no-speech timeout.
    pub fn retry_listening(&mut self) {
        if self.phase == StudentPhase::Responding && !self.has_submitted {
            self.capture.abort_listening();
            self.capture.start_listening();
        }
    }

    /// Cancel an in-flight capture without submitting.
    pub fn cancel_listening(&mut self) {
        self.capture.stop_listening();
    }

    /// Ask the room to pronounce the current word.
    ///
    /// # Errors
    ///
    /// Fails when no word is active.
    pub fn request_pronunciation(&self) -> Result<(), StudentError> {
        let Some(dispatch) = &self.current else {
            return Err(StudentError::NoActiveWord);
        };
        self.facade.emit(ClientEvent::RequestWordPronunciation(PronunciationRequest {
            word: dispatch.word.clone(),
            student_id: self.student_id.clone(),
            session_id: Some(dispatch.session_id.clone()),
        }));
        Ok(())
    }

    // ===== SUBMISSION =====

    /// Submit the typed answer for a spelling test. Correctness is a
    /// trimmed, case-insensitive exact match.
    ///
    /// # Errors
    ///
    /// Fails locally on the wrong test type, an empty answer, a missing
    /// word, or a duplicate submit.
    pub fn submit_typed(&mut self) -> Result<(), StudentError> {
        let dispatch = self.active_word()?;
        if dispatch.test_type != TestType::Spelling {
            return Err(StudentError::WrongTestType(dispatch.test_type));
        }
        let typed = self.typed.trim().to_string();
        if typed.is_empty() {
            return Err(StudentError::EmptyResponse);
        }

        let recognized = typed.eq_ignore_ascii_case(dispatch.word.trim());
        self.submit(&dispatch, typed, recognized, 0.0);
        Ok(())
    }

    /// Acknowledge a recognition word. No client-side correctness judgment;
    /// the teacher assesses manually.
    ///
    /// # Errors
    ///
    /// Fails locally on the wrong test type, a missing word, or a duplicate
    /// submit.
    pub fn acknowledge_word(&mut self) -> Result<(), StudentError> {
        let dispatch = self.active_word()?;
        if dispatch.test_type != TestType::Recognition {
            return Err(StudentError::WrongTestType(dispatch.test_type));
        }
        self.submit(&dispatch, "viewed".into(), true, 0.0);
        Ok(())
    }

    fn active_word(&self) -> Result<WordDispatch, StudentError> {
        let Some(dispatch) = self.current.clone() else {
            return Err(StudentError::NoActiveWord);
        };
        if self.has_submitted {
            return Err(StudentError::AlreadySubmitted);
        }
        Ok(dispatch)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn submit(&mut self, dispatch: &WordDispatch, response: String, recognized: bool, confidence: f64) {
        let response_time = self
            .word_received_at
            .map_or(0, |t| t.elapsed().as_millis() as u64);

        self.facade.emit(ClientEvent::SubmitTestResponse(TestResponse {
            session_id: dispatch.session_id.clone(),
            word: dispatch.word.clone(),
            student_id: self.student_id.clone(),
            student_name: self.student_name.clone(),
            response,
            response_time,
            test_type: dispatch.test_type,
            recognized,
            confidence,
        }));
        self.has_submitted = true;
        self.phase = StudentPhase::Submitted;
    }
}

#[cfg(test)]
#[path = "student_test.rs"]
mod tests;
