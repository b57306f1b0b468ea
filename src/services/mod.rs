//! Coordinator services — room membership and session lifecycle.

pub mod room;
pub mod session;
