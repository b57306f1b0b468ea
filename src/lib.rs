//! Sightline — live sight-word testing sessions over WebSocket.
//!
//! ARCHITECTURE
//! ============
//! One coordinator process relays a small closed event set between a
//! teacher and their students, room by room. Everything session-critical
//! flows through `/ws`:
//!
//! - [`protocol`]: the wire contract (client and server event enums)
//! - [`state`] + [`services`] + [`routes`]: the room session coordinator
//! - [`words`]: the FRY word catalog and adaptive leveling engines
//! - [`similarity`]: fuzzy matching for spoken answers
//! - [`speech`], [`facade`], [`controllers`], [`profile`]: the client-side
//!   building blocks (capture, transport seam, role state machines,
//!   assessment persistence)
//!
//! The coordinator is intentionally permissive: it relays and observes but
//! does not judge. Scoring, submission latching, and stray-response
//! handling all live in the controllers.

pub mod controllers;
pub mod facade;
pub mod profile;
pub mod protocol;
pub mod routes;
pub mod services;
pub mod similarity;
pub mod speech;
pub mod state;
pub mod words;
