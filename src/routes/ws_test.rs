use super::*;
use crate::protocol::{
    JoinRoom, PronunciationRequest, Role, SessionEnd, SessionStart, StatusUpdate, TestResponse,
    TestType, TypingUpdate, UserInfo, WordDispatch,
};
use crate::state::test_helpers::test_app_state;
use futures::{SinkExt, StreamExt};
use tokio::time::{Duration, timeout};

// ===== HARNESS =====

/// A simulated connection: the pieces of per-connection state the socket
/// loop would otherwise own.
struct TestConn {
    conn_id: Uuid,
    current_room: Option<String>,
    peer_tx: mpsc::Sender<ServerEvent>,
    peer_rx: mpsc::Receiver<ServerEvent>,
}

impl TestConn {
    fn new() -> Self {
        let (peer_tx, peer_rx) = mpsc::channel(32);
        Self { conn_id: Uuid::new_v4(), current_room: None, peer_tx, peer_rx }
    }
}

/// Push one client event through dispatch, returning direct replies.
async fn drive(state: &AppState, conn: &mut TestConn, event: &ClientEvent) -> Vec<ServerEvent> {
    let text = serde_json::to_string(event).expect("encode event");
    process_inbound_text(state, &mut conn.current_room, conn.conn_id, &conn.peer_tx, &text).await
}

async fn recv_broadcast(conn: &mut TestConn) -> ServerEvent {
    timeout(Duration::from_millis(500), conn.peer_rx.recv())
        .await
        .expect("broadcast receive timed out")
        .expect("broadcast channel closed unexpectedly")
}

async fn assert_no_broadcast(conn: &mut TestConn) {
    assert!(
        timeout(Duration::from_millis(80), conn.peer_rx.recv()).await.is_err(),
        "expected no broadcast event"
    );
}

fn join(room: &str, name: &str, role: Role) -> ClientEvent {
    ClientEvent::JoinRoom(JoinRoom {
        username: name.into(),
        user: UserInfo { name: name.into(), role },
        room: room.into(),
    })
}

fn session_start(room: &str) -> SessionStart {
    SessionStart {
        session_id: "s-1".into(),
        teacher_id: "t-1".into(),
        room: room.into(),
        test_type: TestType::Recognition,
        words_to_test: vec!["the".into(), "of".into()],
        fry_level: 1,
    }
}

fn dispatch(start: &SessionStart, word: &str, sequence: u32) -> WordDispatch {
    WordDispatch {
        session_id: start.session_id.clone(),
        word: word.into(),
        test_type: start.test_type,
        room: start.room.clone(),
        sequence,
        difficulty: None,
    }
}

fn response(start: &SessionStart, word: &str, answer: &str) -> TestResponse {
    TestResponse {
        session_id: start.session_id.clone(),
        word: word.into(),
        student_id: "stu-1".into(),
        student_name: "Ana".into(),
        response: answer.into(),
        response_time: 1800,
        test_type: start.test_type,
        recognized: true,
        confidence: 0.88,
    }
}

// ===== PARSE BOUNDARY =====

#[tokio::test]
async fn invalid_json_yields_gateway_error() {
    let state = test_app_state();
    let mut conn = TestConn::new();
    let replies = process_inbound_text(
        &state,
        &mut conn.current_room,
        conn.conn_id,
        &conn.peer_tx,
        "not json at all",
    )
    .await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].name(), "gateway_error");
}

#[tokio::test]
async fn unknown_event_yields_gateway_error() {
    let state = test_app_state();
    let mut conn = TestConn::new();
    let replies = process_inbound_text(
        &state,
        &mut conn.current_room,
        conn.conn_id,
        &conn.peer_tx,
        r#"{"event":"rm_rf","data":{}}"#,
    )
    .await;
    assert_eq!(replies[0].name(), "gateway_error");
}

// ===== MEMBERSHIP =====

#[tokio::test]
async fn join_broadcasts_roster_to_everyone() {
    let state = test_app_state();
    let mut teacher = TestConn::new();
    let mut student = TestConn::new();

    drive(&state, &mut teacher, &join("r1", "Ms. Rivera", Role::Teacher)).await;
    let ServerEvent::ChatroomUsers(roster) = recv_broadcast(&mut teacher).await else {
        panic!("expected roster");
    };
    assert_eq!(roster.len(), 1);

    drive(&state, &mut student, &join("r1", "Ana", Role::Student)).await;
    let ServerEvent::ChatroomUsers(roster) = recv_broadcast(&mut teacher).await else {
        panic!("expected roster");
    };
    assert_eq!(roster.len(), 2);
    assert_eq!(student.current_room.as_deref(), Some("r1"));
}

#[tokio::test]
async fn joining_a_second_room_leaves_the_first() {
    let state = test_app_state();
    let mut mover = TestConn::new();
    let mut stayer = TestConn::new();

    drive(&state, &mut stayer, &join("r1", "ben", Role::Student)).await;
    drive(&state, &mut mover, &join("r1", "ana", Role::Student)).await;
    recv_broadcast(&mut stayer).await; // own join
    recv_broadcast(&mut stayer).await; // ana's join

    drive(&state, &mut mover, &join("r2", "ana", Role::Student)).await;

    let ServerEvent::ChatroomUsers(roster) = recv_broadcast(&mut stayer).await else {
        panic!("expected roster");
    };
    assert_eq!(roster.len(), 1);
    assert_eq!(mover.current_room.as_deref(), Some("r2"));
}

#[tokio::test]
async fn events_for_foreign_rooms_are_rejected() {
    let state = test_app_state();
    let mut outsider = TestConn::new();

    let replies = drive(
        &state,
        &mut outsider,
        &ClientEvent::StartTestSession(session_start("r1")),
    )
    .await;
    assert_eq!(replies[0].name(), "gateway_error");
}

// ===== SESSION FLOW =====

#[tokio::test]
async fn full_session_flow_reaches_all_members() {
    let state = test_app_state();
    let mut teacher = TestConn::new();
    let mut student = TestConn::new();

    drive(&state, &mut teacher, &join("r1", "Ms. Rivera", Role::Teacher)).await;
    drive(&state, &mut student, &join("r1", "Ana", Role::Student)).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut student).await;

    // Start reaches teacher and student alike.
    let start = session_start("r1");
    drive(&state, &mut teacher, &ClientEvent::StartTestSession(start.clone())).await;
    assert_eq!(recv_broadcast(&mut teacher).await.name(), "test_session_started");
    assert_eq!(recv_broadcast(&mut student).await.name(), "test_session_started");

    // Word dispatch.
    drive(&state, &mut teacher, &ClientEvent::SendTestWord(dispatch(&start, "the", 1))).await;
    recv_broadcast(&mut teacher).await;
    let ServerEvent::ReceiveTestWord(word) = recv_broadcast(&mut student).await else {
        panic!("expected word dispatch");
    };
    assert_eq!(word.word, "the");
    assert_eq!(word.display_ms(), Some(3_000));

    // Student answer is forwarded verbatim to the whole room.
    drive(&state, &mut student, &ClientEvent::SubmitTestResponse(response(&start, "the", "the"))).await;
    let ServerEvent::StudentTestResponse(forwarded) = recv_broadcast(&mut teacher).await else {
        panic!("expected response");
    };
    assert_eq!(forwarded.student_name, "Ana");
    assert_eq!(recv_broadcast(&mut student).await.name(), "student_test_response");

    // End discards the session.
    let end = SessionEnd {
        session_id: start.session_id.clone(),
        room: "r1".into(),
        completed_count: 1,
        total_words: 2,
    };
    drive(&state, &mut teacher, &ClientEvent::EndTestSession(end)).await;
    assert_eq!(recv_broadcast(&mut teacher).await.name(), "test_session_ended");
    assert_eq!(recv_broadcast(&mut student).await.name(), "test_session_ended");
    assert!(state.rooms.read().await["r1"].session.is_none());
}

#[tokio::test]
async fn late_joiner_gets_no_word_replay() {
    let state = test_app_state();
    let mut teacher = TestConn::new();
    let mut late = TestConn::new();

    drive(&state, &mut teacher, &join("r1", "Ms. Rivera", Role::Teacher)).await;
    recv_broadcast(&mut teacher).await;

    let start = session_start("r1");
    drive(&state, &mut teacher, &ClientEvent::StartTestSession(start.clone())).await;
    drive(&state, &mut teacher, &ClientEvent::SendTestWord(dispatch(&start, "the", 1))).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut teacher).await;

    drive(&state, &mut late, &join("r1", "Zoe", Role::Student)).await;
    // The late joiner sees the roster and nothing dispatched before them.
    assert_eq!(recv_broadcast(&mut late).await.name(), "chatroom_users");
    assert_no_broadcast(&mut late).await;
}

#[tokio::test]
async fn response_without_session_is_still_forwarded() {
    let state = test_app_state();
    let mut teacher = TestConn::new();
    let mut student = TestConn::new();

    drive(&state, &mut teacher, &join("r1", "Ms. Rivera", Role::Teacher)).await;
    drive(&state, &mut student, &join("r1", "Ana", Role::Student)).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut teacher).await;

    let orphan = session_start("r1");
    drive(&state, &mut student, &ClientEvent::SubmitTestResponse(response(&orphan, "of", "of"))).await;
    assert_eq!(recv_broadcast(&mut teacher).await.name(), "student_test_response");
}

#[tokio::test]
async fn response_before_joining_is_rejected() {
    let state = test_app_state();
    let mut conn = TestConn::new();
    let start = session_start("r1");
    let replies =
        drive(&state, &mut conn, &ClientEvent::SubmitTestResponse(response(&start, "of", "of"))).await;
    assert_eq!(replies[0].name(), "gateway_error");
}

#[tokio::test]
async fn owner_departure_leaves_session_active() {
    let state = test_app_state();
    let mut teacher = TestConn::new();
    let mut student = TestConn::new();

    drive(&state, &mut teacher, &join("r1", "Ms. Rivera", Role::Teacher)).await;
    drive(&state, &mut student, &join("r1", "Ana", Role::Student)).await;
    drive(&state, &mut teacher, &ClientEvent::StartTestSession(session_start("r1"))).await;

    drive(
        &state,
        &mut teacher,
        &ClientEvent::LeaveRoom(crate::protocol::LeaveRoom {
            username: "Ms. Rivera".into(),
            room: "r1".into(),
            created_time: None,
        }),
    )
    .await;

    let rooms = state.rooms.read().await;
    assert!(rooms["r1"].session.is_some(), "orphaned session should stay active");
    assert_eq!(rooms["r1"].members.len(), 1);
}

// ===== PRESENCE CHATTER =====

#[tokio::test]
async fn status_and_typing_skip_the_sender_and_ignore_sessions() {
    let state = test_app_state();
    let mut teacher = TestConn::new();
    let mut student = TestConn::new();

    drive(&state, &mut teacher, &join("r1", "Ms. Rivera", Role::Teacher)).await;
    drive(&state, &mut student, &join("r1", "Ana", Role::Student)).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut student).await;

    // An active session must not gate presence chatter.
    drive(&state, &mut teacher, &ClientEvent::StartTestSession(session_start("r1"))).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut student).await;

    drive(
        &state,
        &mut student,
        &ClientEvent::SendStatus(StatusUpdate {
            username: "Ana".into(),
            room: "r1".into(),
            status: "ready".into(),
            user_role: Role::Student,
        }),
    )
    .await;
    drive(
        &state,
        &mut student,
        &ClientEvent::UserTyping(TypingUpdate {
            username: "Ana".into(),
            room: "r1".into(),
            is_typing: true,
        }),
    )
    .await;

    assert_eq!(recv_broadcast(&mut teacher).await.name(), "status_received");
    assert_eq!(recv_broadcast(&mut teacher).await.name(), "user_typing");
    assert_no_broadcast(&mut student).await;
}

#[tokio::test]
async fn pronunciation_request_reaches_peers_only() {
    let state = test_app_state();
    let mut teacher = TestConn::new();
    let mut student = TestConn::new();

    drive(&state, &mut teacher, &join("r1", "Ms. Rivera", Role::Teacher)).await;
    drive(&state, &mut student, &join("r1", "Ana", Role::Student)).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut teacher).await;
    recv_broadcast(&mut student).await;

    drive(
        &state,
        &mut student,
        &ClientEvent::RequestWordPronunciation(PronunciationRequest {
            word: "because".into(),
            student_id: "stu-1".into(),
            session_id: None,
        }),
    )
    .await;

    let ServerEvent::PronunciationRequested(request) = recv_broadcast(&mut teacher).await else {
        panic!("expected pronunciation request");
    };
    assert_eq!(request.word, "because");
    assert_no_broadcast(&mut student).await;
}

// ===== TRANSPORT SMOKE TEST =====

#[tokio::test]
async fn ws_endpoint_speaks_the_wire_protocol() {
    let state = test_app_state();
    let app = crate::routes::app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect");

    let join_text = serde_json::to_string(&join("r1", "Ana", Role::Student)).expect("encode");
    socket
        .send(tokio_tungstenite::tungstenite::Message::Text(join_text.into()))
        .await
        .expect("send join");

    let reply = timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("reply timed out")
        .expect("socket closed")
        .expect("ws error");
    let event: ServerEvent =
        serde_json::from_str(reply.to_text().expect("text frame")).expect("decode");
    assert_eq!(event.name(), "chatroom_users");
}
