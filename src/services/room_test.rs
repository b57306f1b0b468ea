use super::*;
use crate::protocol::{Role, StatusUpdate, TypingUpdate};
use crate::state::test_helpers::{dummy_session, register_member, test_app_state};
use crate::state::TestSession;
use std::time::Duration;
use tokio::time::timeout;

async fn recv(rx: &mut mpsc::Receiver<ServerEvent>) -> ServerEvent {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

fn teacher(name: &str) -> UserInfo {
    UserInfo { name: name.into(), role: Role::Teacher }
}

#[tokio::test]
async fn join_creates_room_and_returns_roster() {
    let state = test_app_state();
    let (tx, _rx) = mpsc::channel(8);
    let roster = join_room(&state, "r1", Uuid::new_v4(), "Ms. Rivera", teacher("Ms. Rivera"), tx).await;

    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].username, "Ms. Rivera");
    assert!(state.rooms.read().await.contains_key("r1"));
}

#[tokio::test]
async fn last_leave_evicts_room_and_discards_session() {
    let state = test_app_state();
    let (conn_id, _rx) = register_member(&state, "r1", "ana", Role::Student).await;
    state
        .rooms
        .write()
        .await
        .get_mut("r1")
        .expect("room exists")
        .session = Some(TestSession::new(dummy_session("r1"), 0));

    let roster = leave_room(&state, "r1", conn_id).await;
    assert!(roster.is_none());
    assert!(!state.rooms.read().await.contains_key("r1"));
}

#[tokio::test]
async fn leave_with_peers_remaining_returns_roster() {
    let state = test_app_state();
    let (conn_a, _rx_a) = register_member(&state, "r1", "ana", Role::Student).await;
    let (_conn_b, _rx_b) = register_member(&state, "r1", "ben", Role::Student).await;

    let roster = leave_room(&state, "r1", conn_a).await.expect("room survives");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].username, "ben");
}

#[tokio::test]
async fn leave_unknown_room_is_harmless() {
    let state = test_app_state();
    assert!(leave_room(&state, "nowhere", Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn broadcast_reaches_all_members() {
    let state = test_app_state();
    let (_a, mut rx_a) = register_member(&state, "r1", "ana", Role::Student).await;
    let (_b, mut rx_b) = register_member(&state, "r1", "ben", Role::Student).await;

    let event = ServerEvent::StatusReceived(StatusUpdate {
        username: "ana".into(),
        room: "r1".into(),
        status: "ready".into(),
        user_role: Role::Student,
    });
    broadcast(&state, "r1", &event, None).await;

    assert_eq!(recv(&mut rx_a).await.name(), "status_received");
    assert_eq!(recv(&mut rx_b).await.name(), "status_received");
}

#[tokio::test]
async fn broadcast_can_exclude_the_sender() {
    let state = test_app_state();
    let (conn_a, mut rx_a) = register_member(&state, "r1", "ana", Role::Student).await;
    let (_b, mut rx_b) = register_member(&state, "r1", "ben", Role::Student).await;

    let event = ServerEvent::UserTyping(TypingUpdate {
        username: "ana".into(),
        room: "r1".into(),
        is_typing: true,
    });
    broadcast(&state, "r1", &event, Some(conn_a)).await;

    assert_eq!(recv(&mut rx_b).await.name(), "user_typing");
    assert!(rx_a.try_recv().is_err(), "sender should not receive their own typing event");
}

#[tokio::test]
async fn broadcast_to_unknown_room_is_a_no_op() {
    let state = test_app_state();
    let event = ServerEvent::GatewayError { message: "x".into() };
    broadcast(&state, "nowhere", &event, None).await;
}

#[tokio::test]
async fn membership_check_tracks_joins() {
    let state = test_app_state();
    let (conn_id, _rx) = register_member(&state, "r1", "ana", Role::Student).await;
    assert!(is_member(&state, "r1", conn_id).await);
    assert!(!is_member(&state, "r2", conn_id).await);
    assert!(!is_member(&state, "r1", Uuid::new_v4()).await);
}
