//! # Transport
//!
//! Exact-byte delivery over a TCP stream.
//!
//! The transport knows byte counts, not payload shapes: control frames are
//! read at their fixed size, data frames header-first and then the declared
//! payload. Every read carries a deadline, and the four-byte magic peek
//! that classifies the next frame never consumes from the stream.

pub mod tcp;

pub use tcp::{Channel, Frame};
