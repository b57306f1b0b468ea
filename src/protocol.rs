//! Wire events — the closed message set for Sightline.
//!
//! ARCHITECTURE
//! ============
//! Every communication between a client and the room coordinator is one of
//! these events. Clients send `ClientEvent`s over WebSocket, the coordinator
//! dispatches by variant, and fan-out flows back as `ServerEvent`s. The two
//! enums are the entire wire contract: there is no open-ended payload map,
//! and unknown events fail to parse at the boundary.
//!
//! DESIGN
//! ======
//! - Tagged encoding: `{"event": "...", "data": {...}}` via serde.
//! - Payload field names are camelCase on the wire (`sessionId`, `fryLevel`)
//!   to stay compatible with existing clients.
//! - Events carry their room explicitly; the coordinator never infers it.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// =============================================================================
// TIME
// =============================================================================

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// SHARED TYPES
// =============================================================================

/// Participant role within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

/// The four assessment modes a session can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Recognition,
    Pronunciation,
    Spelling,
    Reading,
}

impl TestType {
    pub const ALL: [TestType; 4] = [
        TestType::Recognition,
        TestType::Pronunciation,
        TestType::Spelling,
        TestType::Reading,
    ];

    /// Stable wire/display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Recognition => "recognition",
            TestType::Pronunciation => "pronunciation",
            TestType::Spelling => "spelling",
            TestType::Reading => "reading",
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity block attached to room membership events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub role: Role,
}

/// One roster entry, broadcast to the room whenever membership changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomUser {
    pub username: String,
    pub user: UserInfo,
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoom {
    pub username: String,
    pub user: UserInfo,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRoom {
    pub username: String,
    pub room: String,
    #[serde(rename = "__createdtime__", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,
}

/// Parameters of a teacher-driven test session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStart {
    pub session_id: String,
    pub teacher_id: String,
    pub room: String,
    pub test_type: TestType,
    pub words_to_test: Vec<String>,
    pub fry_level: u8,
}

/// The currently broadcast word. Superseded by each new dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDispatch {
    pub session_id: String,
    pub word: String,
    pub test_type: TestType,
    pub room: String,
    /// 1-based position within the session's word list.
    pub sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl WordDispatch {
    /// How long student UIs should show the word before hiding it.
    /// Only recognition tests auto-hide.
    #[must_use]
    pub fn display_ms(&self) -> Option<u64> {
        match self.test_type {
            TestType::Recognition => Some(3_000),
            _ => None,
        }
    }
}

/// A student's answer to a dispatched word, forwarded verbatim to the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResponse {
    pub session_id: String,
    pub word: String,
    pub student_id: String,
    pub student_name: String,
    /// Typed text, transcript, or a marker such as `"viewed"`.
    pub response: String,
    /// Milliseconds between receiving the word and answering.
    pub response_time: u64,
    pub test_type: TestType,
    pub recognized: bool,
    /// Only meaningful for spoken responses; 0 otherwise.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEnd {
    pub session_id: String,
    pub room: String,
    pub completed_count: u32,
    pub total_words: u32,
}

/// Chat-adjacent presence status. Relayed as-is; never gated on session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub username: String,
    pub room: String,
    pub status: String,
    pub user_role: Role,
}

/// Chat-adjacent typing indicator. Relayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUpdate {
    pub username: String,
    pub room: String,
    pub is_typing: bool,
}

/// Student asking the teacher side to speak the current word aloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PronunciationRequest {
    pub word: String,
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

// =============================================================================
// CLIENT → COORDINATOR
// =============================================================================

/// Everything a client may send. Parsed at the WebSocket boundary;
/// anything else is rejected with a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(JoinRoom),
    LeaveRoom(LeaveRoom),
    StartTestSession(SessionStart),
    SendTestWord(WordDispatch),
    SubmitTestResponse(TestResponse),
    EndTestSession(SessionEnd),
    SendStatus(StatusUpdate),
    UserTyping(TypingUpdate),
    RequestWordPronunciation(PronunciationRequest),
}

impl ClientEvent {
    /// Wire tag, for structured logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom(_) => "join_room",
            ClientEvent::LeaveRoom(_) => "leave_room",
            ClientEvent::StartTestSession(_) => "start_test_session",
            ClientEvent::SendTestWord(_) => "send_test_word",
            ClientEvent::SubmitTestResponse(_) => "submit_test_response",
            ClientEvent::EndTestSession(_) => "end_test_session",
            ClientEvent::SendStatus(_) => "send_status",
            ClientEvent::UserTyping(_) => "user_typing",
            ClientEvent::RequestWordPronunciation(_) => "request_word_pronunciation",
        }
    }
}

// =============================================================================
// COORDINATOR → CLIENTS
// =============================================================================

/// Everything the coordinator may broadcast back into a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ChatroomUsers(Vec<RoomUser>),
    TestSessionStarted(SessionStart),
    ReceiveTestWord(WordDispatch),
    StudentTestResponse(TestResponse),
    TestSessionEnded(SessionEnd),
    StatusReceived(StatusUpdate),
    UserTyping(TypingUpdate),
    PronunciationRequested(PronunciationRequest),
    /// Coordinator-side rejection of an unparseable or unroutable event.
    GatewayError { message: String },
}

impl ServerEvent {
    /// Wire tag, for structured logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ChatroomUsers(_) => "chatroom_users",
            ServerEvent::TestSessionStarted(_) => "test_session_started",
            ServerEvent::ReceiveTestWord(_) => "receive_test_word",
            ServerEvent::StudentTestResponse(_) => "student_test_response",
            ServerEvent::TestSessionEnded(_) => "test_session_ended",
            ServerEvent::StatusReceived(_) => "status_received",
            ServerEvent::UserTyping(_) => "user_typing",
            ServerEvent::PronunciationRequested(_) => "pronunciation_requested",
            ServerEvent::GatewayError { .. } => "gateway_error",
        }
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
