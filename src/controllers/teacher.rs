//! Teacher controller — drives a test session from the teacher's side.
//!
//! DESIGN
//! ======
//! A plain state machine over coordinator events. Validation failures
//! (no words picked, no students present) stay local and never reach the
//! wire. Word movement (`next_word`/`previous_word`) is local too; only
//! `send_current_word` dispatches anything. Assessment persistence is
//! fire-and-forget through the profile store: write failures are logged,
//! a missing store becomes a notice, and neither blocks the session.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::facade::Facade;
use crate::profile::{AssessmentRecord, ProfileStore, ResponseOutcome, SessionReport};
use crate::protocol::{
    ClientEvent, RoomUser, Role, ServerEvent, SessionEnd, SessionStart, TestResponse, TestType,
    WordDispatch, now_ms,
};
use crate::words::catalog::assess_word_difficulty;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TeacherError {
    #[error("select at least one word before starting")]
    NoWordsSelected,
    #[error("no students connected")]
    NoStudentsConnected,
    #[error("no active session")]
    NoActiveSession,
}

/// Where the teacher is in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherPhase {
    SelectingWords,
    SessionActive,
    Ended,
}

pub struct TeacherController {
    facade: Facade,
    store: Option<Arc<dyn ProfileStore>>,
    room: String,
    teacher_id: String,
    phase: TeacherPhase,
    roster: Vec<RoomUser>,
    session: Option<SessionStart>,
    index: usize,
    /// Responses buffered for the current word only; cleared per dispatch.
    responses: Vec<TestResponse>,
    /// Every accepted response across the session, for the end report.
    session_responses: Vec<ResponseOutcome>,
    /// Non-blocking notices (persistence failures and the like) for the UI.
    notices: Vec<String>,
}

// =============================================================================
// CONTROLLER
// =============================================================================

impl TeacherController {
    #[must_use]
    pub fn new(facade: Facade, store: Option<Arc<dyn ProfileStore>>, room: &str, teacher_id: &str) -> Self {
        Self {
            facade,
            store,
            room: room.to_string(),
            teacher_id: teacher_id.to_string(),
            phase: TeacherPhase::SelectingWords,
            roster: Vec::new(),
            session: None,
            index: 0,
            responses: Vec::new(),
            session_responses: Vec::new(),
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> TeacherPhase {
        self.phase
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.words_to_test.get(self.index)).map(String::as_str)
    }

    #[must_use]
    pub fn word_index(&self) -> usize {
        self.index
    }

    /// Responses received for the currently dispatched word.
    #[must_use]
    pub fn responses(&self) -> &[TestResponse] {
        &self.responses
    }

    #[must_use]
    pub fn connected_students(&self) -> usize {
        self.roster.iter().filter(|u| u.user.role == Role::Student).count()
    }

    /// Drain accumulated notices for display.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    // ===== COORDINATOR EVENTS =====

    /// Fold one coordinator event into controller state.
    pub fn handle_event(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::ChatroomUsers(roster) => {
                self.roster = roster.clone();
            }
            ServerEvent::StudentTestResponse(response) => {
                self.buffer_response(response);
            }
            ServerEvent::TestSessionEnded(end) => {
                // Covers ends issued by another teacher in the room.
                if self.session.as_ref().is_some_and(|s| s.session_id == end.session_id) {
                    self.phase = TeacherPhase::Ended;
                }
            }
            _ => {}
        }
    }

    fn buffer_response(&mut self, response: &TestResponse) {
        let Some(session) = &self.session else {
            return;
        };
        if response.session_id != session.session_id {
            return;
        }
        // Stray responses to a superseded word are the controller's problem,
        // not the coordinator's.
        if self.current_word() != Some(response.word.as_str()) {
            warn!(word = %response.word, student = %response.student_name, "discarding late response");
            return;
        }
        self.session_responses.push(ResponseOutcome {
            word: response.word.clone(),
            response: response.response.clone(),
            is_correct: response.recognized,
            response_time: response.response_time,
        });
        self.responses.push(response.clone());
    }

    // ===== OPERATIONS =====

    /// Start a session over the given words.
    ///
    /// # Errors
    ///
    /// Local validation only: fails when no words are selected or no
    /// students are connected. Nothing is sent in either case.
    pub fn start_test_session(
        &mut self,
        test_type: TestType,
        words: Vec<String>,
        fry_level: u8,
    ) -> Result<(), TeacherError> {
        if words.is_empty() {
            return Err(TeacherError::NoWordsSelected);
        }
        if self.connected_students() == 0 {
            return Err(TeacherError::NoStudentsConnected);
        }

        let start = SessionStart {
            session_id: Uuid::new_v4().to_string(),
            teacher_id: self.teacher_id.clone(),
            room: self.room.clone(),
            test_type,
            words_to_test: words,
            fry_level,
        };
        info!(session_id = %start.session_id, words = start.words_to_test.len(), "starting test session");

        self.session = Some(start.clone());
        self.index = 0;
        self.responses.clear();
        self.session_responses.clear();
        self.phase = TeacherPhase::SessionActive;
        self.facade.emit(ClientEvent::StartTestSession(start));
        Ok(())
    }

    /// Dispatch the word at the current index. Re-sending the same word is
    /// allowed; each dispatch clears the response buffer so stale answers
    /// are visually distinguishable.
    ///
    /// # Errors
    ///
    /// Fails when no session is active.
    pub fn send_current_word(&mut self) -> Result<(), TeacherError> {
        if self.phase != TeacherPhase::SessionActive {
            return Err(TeacherError::NoActiveSession);
        }
        let Some(session) = &self.session else {
            return Err(TeacherError::NoActiveSession);
        };
        let Some(word) = session.words_to_test.get(self.index) else {
            return Err(TeacherError::NoActiveSession);
        };

        let dispatch = WordDispatch {
            session_id: session.session_id.clone(),
            word: word.clone(),
            test_type: session.test_type,
            room: self.room.clone(),
            sequence: u32::try_from(self.index + 1).unwrap_or(u32::MAX),
            difficulty: Some(difficulty_band(word).to_string()),
        };

        self.responses.clear();
        self.facade.emit(ClientEvent::SendTestWord(dispatch));
        Ok(())
    }

    /// Move to the next word locally. No dispatch happens until
    /// `send_current_word`.
    pub fn next_word(&mut self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if self.index + 1 < session.words_to_test.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous word locally.
    pub fn previous_word(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Hand one assessed response off to the profile store. Fire-and-forget:
    /// write failures are logged, and a missing store becomes a notice.
    pub fn save_assessment_note(
        &mut self,
        response: &TestResponse,
        recognized: bool,
        score: Option<f64>,
        notes: &str,
    ) {
        let Some(store) = &self.store else {
            warn!("no profile store configured, assessment note dropped");
            self.notices.push("assessment not saved: no profile store configured".into());
            return;
        };

        let record = AssessmentRecord {
            student_id: response.student_id.clone(),
            word_tested: response.word.clone(),
            test_type: response.test_type,
            date_completed: now_ms(),
            responses: vec![ResponseOutcome {
                word: response.word.clone(),
                response: response.response.clone(),
                is_correct: recognized,
                response_time: response.response_time,
            }],
            score,
            notes: if notes.is_empty() { None } else { Some(notes.to_string()) },
        };

        let store = Arc::clone(store);
        tokio::spawn(async move {
            if let Err(e) = store.persist_assessment(&record).await {
                error!(error = %e, word = %record.word_tested, "failed to persist assessment");
            }
        });
    }

    /// End the session and persist a summary report.
    ///
    /// # Errors
    ///
    /// Fails when no session is active.
    pub fn end_test_session(&mut self) -> Result<(), TeacherError> {
        if self.phase != TeacherPhase::SessionActive {
            return Err(TeacherError::NoActiveSession);
        }
        let Some(session) = self.session.clone() else {
            return Err(TeacherError::NoActiveSession);
        };

        let total = u32::try_from(session.words_to_test.len()).unwrap_or(u32::MAX);
        let completed = u32::try_from(self.index + 1).unwrap_or(u32::MAX).min(total);
        let end = SessionEnd {
            session_id: session.session_id.clone(),
            room: self.room.clone(),
            completed_count: completed,
            total_words: total,
        };

        self.phase = TeacherPhase::Ended;
        self.facade.emit(ClientEvent::EndTestSession(end));

        if let Some(store) = &self.store {
            let report = SessionReport {
                session_id: session.session_id,
                room: self.room.clone(),
                test_type: session.test_type,
                fry_level: session.fry_level,
                words_tested: session.words_to_test,
                responses: std::mem::take(&mut self.session_responses),
                ended_at: now_ms(),
            };
            let store = Arc::clone(store);
            tokio::spawn(async move {
                if let Err(e) = store.persist_test_session(&report).await {
                    error!(error = %e, session_id = %report.session_id, "failed to persist session report");
                }
            });
        }
        Ok(())
    }
}

/// Coarse difficulty label attached to dispatches as a rendering hint.
fn difficulty_band(word: &str) -> &'static str {
    match assess_word_difficulty(word) {
        1 | 2 => "easy",
        3 => "medium",
        _ => "hard",
    }
}

#[cfg(test)]
#[path = "teacher_test.rs"]
mod tests;
