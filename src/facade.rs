//! Connection facade — the one place client code touches the transport.
//!
//! DESIGN
//! ======
//! Controllers never see a socket. They hold a [`Facade`], which owns the
//! outbound event channel plus a handler registry for inbound events.
//! `emit` on a dead connection logs a warning and drops the event — it
//! never fails into the caller. Handlers are tracked by identity
//! ([`HandlerId`]) so registration and cleanup stay idempotent, and
//! dropping the facade deregisters everything with it.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::warn;

use crate::protocol::{ClientEvent, ServerEvent};

/// Identity of one registered handler, returned by [`Facade::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&ServerEvent) + Send>;

pub struct Facade {
    outbound: Option<mpsc::UnboundedSender<ClientEvent>>,
    handlers: HashMap<&'static str, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl Facade {
    /// Facade over an established channel. Returns the receiving end the
    /// transport task drains.
    #[must_use]
    pub fn connected() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let facade = Self { outbound: Some(tx), handlers: HashMap::new(), next_id: 0 };
        (facade, rx)
    }

    /// Facade with no channel. Emits are dropped with a warning.
    #[must_use]
    pub fn disconnected() -> Self {
        Self { outbound: None, handlers: HashMap::new(), next_id: 0 }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.outbound.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Send an event toward the coordinator. Never errors: a disconnected
    /// facade logs and drops.
    pub fn emit(&self, event: ClientEvent) {
        let name = event.name();
        let Some(tx) = &self.outbound else {
            warn!(event = name, "emit on disconnected facade, event dropped");
            return;
        };
        if tx.send(event).is_err() {
            warn!(event = name, "transport gone, event dropped");
        }
    }

    /// Register a handler for one event name (the wire tag, e.g.
    /// `"receive_test_word"`).
    pub fn on(
        &mut self,
        event: &'static str,
        handler: impl FnMut(&ServerEvent) + Send + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(event).or_default().push((id, Box::new(handler)));
        id
    }

    /// Deregister a handler. Unknown or already-removed IDs are a no-op;
    /// returns whether anything was removed.
    pub fn off(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        for handlers in self.handlers.values_mut() {
            let before = handlers.len();
            handlers.retain(|(hid, _)| *hid != id);
            removed |= handlers.len() != before;
        }
        removed
    }

    /// Invoke every handler registered for this event's name.
    pub fn dispatch(&mut self, event: &ServerEvent) {
        if let Some(handlers) = self.handlers.get_mut(event.name()) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    /// Drop the channel and every registered handler.
    pub fn disconnect(&mut self) {
        self.outbound = None;
        self.handlers.clear();
    }
}

#[cfg(test)]
#[path = "facade_test.rs"]
mod tests;
