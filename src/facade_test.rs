use super::*;
use crate::protocol::{TypingUpdate, StatusUpdate, Role};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn typing_event() -> ServerEvent {
    ServerEvent::UserTyping(TypingUpdate { username: "ana".into(), room: "r1".into(), is_typing: true })
}

fn status_event() -> ServerEvent {
    ServerEvent::StatusReceived(StatusUpdate {
        username: "ana".into(),
        room: "r1".into(),
        status: "ready".into(),
        user_role: Role::Student,
    })
}

fn typing_client_event() -> ClientEvent {
    ClientEvent::UserTyping(TypingUpdate { username: "ana".into(), room: "r1".into(), is_typing: true })
}

#[test]
fn emit_delivers_through_the_channel() {
    let (facade, mut rx) = Facade::connected();
    assert!(facade.is_connected());

    facade.emit(typing_client_event());
    let event = rx.try_recv().expect("event queued");
    assert_eq!(event.name(), "user_typing");
}

#[test]
fn emit_when_disconnected_never_panics() {
    let facade = Facade::disconnected();
    assert!(!facade.is_connected());
    facade.emit(typing_client_event());
}

#[test]
fn emit_after_transport_drop_is_swallowed() {
    let (facade, rx) = Facade::connected();
    drop(rx);
    assert!(!facade.is_connected());
    facade.emit(typing_client_event());
}

#[test]
fn handlers_fire_for_their_event_only() {
    let (mut facade, _rx) = Facade::connected();
    let typing_hits = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&typing_hits);
    facade.on("user_typing", move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
    });

    facade.dispatch(&typing_event());
    facade.dispatch(&status_event());
    assert_eq!(typing_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn duplicate_registration_means_two_invocations() {
    let (mut facade, _rx) = Facade::connected();
    let hits = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        let hits = Arc::clone(&hits);
        facade.on("user_typing", move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
    }

    facade.dispatch(&typing_event());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn off_is_idempotent() {
    let (mut facade, _rx) = Facade::connected();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let id = facade.on("user_typing", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(facade.off(id));
    assert!(!facade.off(id));
    facade.dispatch(&typing_event());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn disconnect_clears_handlers_and_channel() {
    let (mut facade, _rx) = Facade::connected();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    facade.on("user_typing", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    facade.disconnect();
    assert!(!facade.is_connected());
    facade.dispatch(&typing_event());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    facade.emit(typing_client_event());
}
