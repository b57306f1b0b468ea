//! WebSocket handler — bidirectional event relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a connection ID and enters a `select!` loop:
//! - Incoming client events → parse + dispatch by variant
//! - Broadcast events from room peers → forward to client
//!
//! Handler functions are pure business logic — they validate, mutate state,
//! and return an `Outcome`. The dispatch layer owns all outbound concerns:
//! reply to sender and broadcast to the room.
//!
//! The coordinator is permissive by design: session events are tracked but
//! never gated on session state, and responses are forwarded verbatim.
//! Controllers enforce correctness.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → connection gets an ID and a peer channel
//! 2. Client sends events → dispatch → handler returns Outcome
//! 3. Dispatch applies Outcome (reply / broadcast / both)
//! 4. Close → leave current room → roster rebroadcast → cleanup

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::protocol::{ClientEvent, ServerEvent};
use crate::services;
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer uses this to
/// decide who receives what — handlers never send events directly.
enum Outcome {
    /// Broadcast to ALL room members including sender.
    Broadcast { room: String, event: ServerEvent },
    /// Broadcast to room peers EXCLUDING sender. Used for presence chatter
    /// (status, typing) and pronunciation requests.
    BroadcastExcludeSender { room: String, event: ServerEvent },
    /// Send to sender only.
    Reply(ServerEvent),
    /// Nothing outbound.
    Silent,
}

fn not_in_room(room: &str) -> Outcome {
    Outcome::Reply(ServerEvent::GatewayError { message: format!("not a member of room: {room}") })
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();

    // Per-connection channel for receiving broadcast events from peers.
    let (peer_tx, mut peer_rx) = mpsc::channel::<ServerEvent>(256);

    info!(%conn_id, "ws: client connected");

    // The room this connection has joined, used for events whose payload
    // carries no room of its own.
    let mut current_room: Option<String> = None;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies =
                            process_inbound_text(&state, &mut current_room, conn_id, &peer_tx, &text).await;
                        for event in replies {
                            if send_event(&mut socket, &event).await.is_err() {
                                return;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = peer_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    // Re-broadcast the roster to whoever remains in the room.
    if let Some(room) = current_room {
        if let Some(roster) = services::room::leave_room(&state, &room, conn_id).await {
            services::room::broadcast(&state, &room, &ServerEvent::ChatroomUsers(roster), None).await;
        }
    }
    info!(%conn_id, "ws: client disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, event = event.name(), "ws: failed to encode event");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Parse and process one inbound text message and return events for the
/// sender. Separated from the socket loop so tests can drive dispatch
/// end-to-end through registered peer channels.
async fn process_inbound_text(
    state: &AppState,
    current_room: &mut Option<String>,
    conn_id: Uuid,
    peer_tx: &mpsc::Sender<ServerEvent>,
    text: &str,
) -> Vec<ServerEvent> {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%conn_id, error = %e, "ws: invalid inbound event");
            return vec![ServerEvent::GatewayError { message: format!("invalid event: {e}") }];
        }
    };

    info!(%conn_id, event = event.name(), "ws: recv event");
    let outcome = dispatch_event(state, current_room, conn_id, peer_tx, event).await;

    match outcome {
        Outcome::Broadcast { room, event } => {
            services::room::broadcast(state, &room, &event, None).await;
            vec![]
        }
        Outcome::BroadcastExcludeSender { room, event } => {
            services::room::broadcast(state, &room, &event, Some(conn_id)).await;
            vec![]
        }
        Outcome::Reply(event) => vec![event],
        Outcome::Silent => vec![],
    }
}

async fn dispatch_event(
    state: &AppState,
    current_room: &mut Option<String>,
    conn_id: Uuid,
    peer_tx: &mpsc::Sender<ServerEvent>,
    event: ClientEvent,
) -> Outcome {
    match event {
        ClientEvent::JoinRoom(join) => {
            // Joining a second room implicitly leaves the first.
            if let Some(old_room) = current_room.take() {
                if old_room != join.room {
                    if let Some(roster) = services::room::leave_room(state, &old_room, conn_id).await {
                        services::room::broadcast(
                            state,
                            &old_room,
                            &ServerEvent::ChatroomUsers(roster),
                            None,
                        )
                        .await;
                    }
                }
            }

            let roster = services::room::join_room(
                state,
                &join.room,
                conn_id,
                &join.username,
                join.user,
                peer_tx.clone(),
            )
            .await;
            *current_room = Some(join.room.clone());
            Outcome::Broadcast { room: join.room, event: ServerEvent::ChatroomUsers(roster) }
        }

        ClientEvent::LeaveRoom(leave) => {
            if current_room.as_deref() == Some(leave.room.as_str()) {
                *current_room = None;
            }
            match services::room::leave_room(state, &leave.room, conn_id).await {
                Some(roster) => Outcome::Broadcast {
                    room: leave.room,
                    event: ServerEvent::ChatroomUsers(roster),
                },
                None => Outcome::Silent,
            }
        }

        ClientEvent::StartTestSession(start) => {
            if !services::room::is_member(state, &start.room, conn_id).await {
                return not_in_room(&start.room);
            }
            services::session::start_session(state, &start).await;
            let room = start.room.clone();
            Outcome::Broadcast { room, event: ServerEvent::TestSessionStarted(start) }
        }

        ClientEvent::SendTestWord(dispatch) => {
            if !services::room::is_member(state, &dispatch.room, conn_id).await {
                return not_in_room(&dispatch.room);
            }
            services::session::record_dispatch(state, &dispatch).await;
            let room = dispatch.room.clone();
            Outcome::Broadcast { room, event: ServerEvent::ReceiveTestWord(dispatch) }
        }

        ClientEvent::SubmitTestResponse(response) => {
            // Responses carry no room; they land in the sender's room.
            let Some(room) = current_room.clone() else {
                return Outcome::Reply(ServerEvent::GatewayError {
                    message: "join a room before submitting responses".into(),
                });
            };
            services::session::record_response(state, &room, &response).await;
            Outcome::Broadcast { room, event: ServerEvent::StudentTestResponse(response) }
        }

        ClientEvent::EndTestSession(end) => {
            if !services::room::is_member(state, &end.room, conn_id).await {
                return not_in_room(&end.room);
            }
            services::session::end_session(state, &end).await;
            let room = end.room.clone();
            Outcome::Broadcast { room, event: ServerEvent::TestSessionEnded(end) }
        }

        ClientEvent::SendStatus(status) => {
            if !services::room::is_member(state, &status.room, conn_id).await {
                return not_in_room(&status.room);
            }
            let room = status.room.clone();
            Outcome::BroadcastExcludeSender { room, event: ServerEvent::StatusReceived(status) }
        }

        ClientEvent::UserTyping(typing) => {
            if !services::room::is_member(state, &typing.room, conn_id).await {
                return not_in_room(&typing.room);
            }
            let room = typing.room.clone();
            Outcome::BroadcastExcludeSender { room, event: ServerEvent::UserTyping(typing) }
        }

        ClientEvent::RequestWordPronunciation(request) => {
            let Some(room) = current_room.clone() else {
                return Outcome::Reply(ServerEvent::GatewayError {
                    message: "join a room before requesting pronunciation".into(),
                });
            };
            Outcome::BroadcastExcludeSender {
                room,
                event: ServerEvent::PronunciationRequested(request),
            }
        }
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
