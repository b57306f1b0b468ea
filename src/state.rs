//! Shared coordinator state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the live room map: per-room membership, each member's outbound
//! event channel, and at most one active test session. Rooms exist only
//! while someone is connected; there is no persistence tier behind them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::protocol::{RoomUser, ServerEvent, SessionStart, UserInfo, WordDispatch};

// =============================================================================
// MEMBERSHIP
// =============================================================================

/// One connected participant within a room.
pub struct RoomMember {
    pub username: String,
    pub user: UserInfo,
    /// Milliseconds since Unix epoch at join time.
    pub joined_at: i64,
    /// Outbound channel; the ws task forwards these to the socket.
    pub tx: mpsc::Sender<ServerEvent>,
}

// =============================================================================
// TEST SESSION
// =============================================================================

/// The room's active test session. At most one per room; a new start
/// replaces whatever was running.
pub struct TestSession {
    pub params: SessionStart,
    /// Most recent dispatch. Superseded, never replayed to late joiners.
    pub last_dispatch: Option<WordDispatch>,
    /// Responses forwarded so far, for the end-of-session log line.
    pub response_count: u32,
    pub started_at: i64,
}

impl TestSession {
    #[must_use]
    pub fn new(params: SessionStart, started_at: i64) -> Self {
        Self { params, last_dispatch: None, response_count: 0, started_at }
    }
}

// =============================================================================
// ROOM STATE
// =============================================================================

/// Per-room live state. Created on first join, evicted with the last leave.
#[derive(Default)]
pub struct RoomState {
    /// Connected members keyed by connection ID.
    pub members: HashMap<Uuid, RoomMember>,
    pub session: Option<TestSession>,
}

impl RoomState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current roster in insertion-agnostic order, sorted by username so
    /// every client renders the same list.
    #[must_use]
    pub fn roster(&self) -> Vec<RoomUser> {
        let mut users: Vec<RoomUser> = self
            .members
            .values()
            .map(|m| RoomUser { username: m.username.clone(), user: m.user.clone() })
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared coordinator state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — the room map is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<String, RoomState>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self { rooms: Arc::new(RwLock::new(HashMap::new())) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
