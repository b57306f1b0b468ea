//! Word catalog and the adaptive engines built on top of it.

pub mod catalog;
pub mod leveling;
