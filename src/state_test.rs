use super::*;
use crate::protocol::{Role, now_ms};

#[test]
fn new_room_is_empty() {
    let room = RoomState::new();
    assert!(room.members.is_empty());
    assert!(room.session.is_none());
    assert!(room.roster().is_empty());
}

#[tokio::test]
async fn roster_is_sorted_by_username() {
    let state = test_helpers::test_app_state();
    test_helpers::register_member(&state, "r1", "zoe", Role::Student).await;
    test_helpers::register_member(&state, "r1", "ana", Role::Student).await;
    test_helpers::register_member(&state, "r1", "Ms. Rivera", Role::Teacher).await;

    let rooms = state.rooms.read().await;
    let roster = rooms["r1"].roster();
    let names: Vec<&str> = roster.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["Ms. Rivera", "ana", "zoe"]);
}

#[test]
fn fresh_session_has_no_dispatch() {
    let session = TestSession::new(test_helpers::dummy_session("r1"), now_ms());
    assert!(session.last_dispatch.is_none());
    assert_eq!(session.response_count, 0);
}

#[tokio::test]
async fn rooms_are_independent() {
    let state = test_helpers::test_app_state();
    test_helpers::register_member(&state, "r1", "ana", Role::Student).await;
    test_helpers::register_member(&state, "r2", "ben", Role::Student).await;

    let rooms = state.rooms.read().await;
    assert_eq!(rooms["r1"].members.len(), 1);
    assert_eq!(rooms["r2"].members.len(), 1);
}
