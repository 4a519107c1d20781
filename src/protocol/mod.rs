//! # Protocol Logic
//!
//! The pieces that sit between raw frames and a live connection: the
//! magic-based frame dispatcher and the per-session state machine shared by
//! client and server.

pub mod dispatcher;
pub mod session;

#[cfg(test)]
mod tests;

pub use dispatcher::FrameKind;
pub use session::{SessionEvent, SessionState};
