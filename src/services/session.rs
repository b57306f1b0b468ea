//! Session service — test-session lifecycle within a room.
//!
//! DESIGN
//! ======
//! The coordinator is deliberately permissive: it tracks session state for
//! observability and the "last dispatched word" marker, but it never blocks
//! an event on that state. A start while another session runs replaces it
//! (last start wins); a response with no matching session is still
//! forwarded. Correctness enforcement lives in the controllers.

use tracing::{info, warn};

use crate::protocol::{SessionEnd, SessionStart, TestResponse, WordDispatch, now_ms};
use crate::state::{AppState, TestSession};

/// Record a session start on its room. Replaces any session already
/// running there.
pub async fn start_session(state: &AppState, start: &SessionStart) {
    let mut rooms = state.rooms.write().await;
    let Some(room_state) = rooms.get_mut(&start.room) else {
        warn!(room = %start.room, session_id = %start.session_id, "session started in unknown room");
        return;
    };

    if let Some(previous) = &room_state.session {
        warn!(
            room = %start.room,
            replaced = %previous.params.session_id,
            session_id = %start.session_id,
            "new session start replaces active session"
        );
    }

    info!(
        room = %start.room,
        session_id = %start.session_id,
        test_type = %start.test_type,
        words = start.words_to_test.len(),
        fry_level = start.fry_level,
        "test session started"
    );
    room_state.session = Some(TestSession::new(start.clone(), now_ms()));
}

/// Record a word dispatch as the session's current word.
pub async fn record_dispatch(state: &AppState, dispatch: &WordDispatch) {
    let mut rooms = state.rooms.write().await;
    let session = rooms.get_mut(&dispatch.room).and_then(|r| r.session.as_mut());
    let Some(session) = session else {
        warn!(room = %dispatch.room, word = %dispatch.word, "word dispatched with no active session");
        return;
    };

    if session.params.session_id != dispatch.session_id {
        warn!(
            room = %dispatch.room,
            active = %session.params.session_id,
            dispatched = %dispatch.session_id,
            "dispatch session id does not match active session"
        );
    }
    session.last_dispatch = Some(dispatch.clone());
}

/// Count a forwarded response against the room's active session, if any.
pub async fn record_response(state: &AppState, room: &str, response: &TestResponse) {
    let mut rooms = state.rooms.write().await;
    let session = rooms.get_mut(room).and_then(|r| r.session.as_mut());
    let Some(session) = session else {
        // Forwarded anyway; the coordinator does not validate session state.
        warn!(
            room,
            session_id = %response.session_id,
            student = %response.student_name,
            "response submitted with no active session"
        );
        return;
    };
    session.response_count += 1;
}

/// Close out the room's session, logging a summary. Missing sessions are
/// tolerated so duplicate end events stay harmless.
pub async fn end_session(state: &AppState, end: &SessionEnd) {
    let mut rooms = state.rooms.write().await;
    let Some(room_state) = rooms.get_mut(&end.room) else {
        warn!(room = %end.room, session_id = %end.session_id, "session ended in unknown room");
        return;
    };

    let Some(session) = room_state.session.take() else {
        warn!(room = %end.room, session_id = %end.session_id, "end event with no active session");
        return;
    };

    info!(
        room = %end.room,
        session_id = %session.params.session_id,
        completed = end.completed_count,
        total = end.total_words,
        responses = session.response_count,
        duration_ms = now_ms() - session.started_at,
        "test session ended"
    );
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
