//! Room service — membership, roster, and fan-out.
//!
//! DESIGN
//! ======
//! Rooms are created lazily on first join and evicted when the last member
//! leaves. Eviction discards any active test session with the room; there
//! is nothing to flush. All mutation happens under the room map's write
//! lock, which serializes concurrent joins, leaves, and session events
//! per room.

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::protocol::{RoomUser, ServerEvent, UserInfo, now_ms};
use crate::state::{AppState, RoomMember, RoomState};

/// Add (or re-add) a member to a room and return the updated roster.
///
/// Joining never fails: an unknown room is created, and a reconnecting
/// member under the same connection ID simply replaces their channel.
pub async fn join_room(
    state: &AppState,
    room: &str,
    conn_id: Uuid,
    username: &str,
    user: UserInfo,
    tx: mpsc::Sender<ServerEvent>,
) -> Vec<RoomUser> {
    let mut rooms = state.rooms.write().await;
    let room_state = rooms.entry(room.to_string()).or_insert_with(RoomState::new);

    if room_state.session.is_some() {
        // Late joiner during an active session: they receive future
        // dispatches only, never a replay of the current word.
        info!(%conn_id, room, "member joined mid-session, no word replay");
    }

    room_state.members.insert(
        conn_id,
        RoomMember { username: username.to_string(), user, joined_at: now_ms(), tx },
    );
    info!(%conn_id, room, members = room_state.members.len(), "member joined room");

    room_state.roster()
}

/// Remove a member and return the updated roster, or `None` when the room
/// was evicted (or never existed).
pub async fn leave_room(state: &AppState, room: &str, conn_id: Uuid) -> Option<Vec<RoomUser>> {
    let mut rooms = state.rooms.write().await;
    let room_state = rooms.get_mut(room)?;

    room_state.members.remove(&conn_id);
    info!(%conn_id, room, remaining = room_state.members.len(), "member left room");

    if room_state.members.is_empty() {
        if let Some(session) = room_state.session.take() {
            warn!(room, session_id = %session.params.session_id, "discarding session with emptied room");
        }
        rooms.remove(room);
        info!(room, "evicted empty room");
        return None;
    }

    Some(room_state.roster())
}

/// Whether the connection is currently a member of the room.
pub async fn is_member(state: &AppState, room: &str, conn_id: Uuid) -> bool {
    let rooms = state.rooms.read().await;
    rooms.get(room).is_some_and(|r| r.members.contains_key(&conn_id))
}

/// Send an event to every member of a room, optionally excluding one
/// connection.
pub async fn broadcast(state: &AppState, room: &str, event: &ServerEvent, exclude: Option<Uuid>) {
    let rooms = state.rooms.read().await;
    let Some(room_state) = rooms.get(room) else {
        return;
    };

    for (conn_id, member) in &room_state.members {
        if exclude == Some(*conn_id) {
            continue;
        }
        // Best-effort: if a member's channel is full, skip it.
        let _ = member.tx.try_send(event.clone());
    }
}

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;
