//! # Error Types
//!
//! Error handling for the BSTP protocol suite.
//!
//! This module defines all error variants that can occur while framing,
//! transporting, or dispatching PIAP and TITP packets.
//!
//! ## Error Categories
//! - **Transport errors**: partial I/O, peer-closed sockets, read deadlines.
//!   Fatal to the current send/receive attempt, recoverable only by
//!   reconnecting the session.
//! - **Frame errors**: truncated buffers, wrong magic, unsupported versions,
//!   declared lengths that do not match a known payload shape.
//! - **Dispatch errors**: a peeked magic that belongs to neither protocol.
//! - **Precondition errors**: calling an operation in the wrong session state.
//!   These signal a caller bug, not a protocol failure.
//!
//! Format and business *status codes* (wrong password, task not found, stale
//! timestamp) are deliberately **not** errors: they travel back to the sender
//! inside response packets as [`crate::core::status`] values and never tear
//! down the connection.
//!
//! All errors implement `std::error::Error` for interoperability.

use std::io;
use thiserror::Error;

/// Static messages for [`ProtocolError::InvalidState`], which names the
/// violated precondition without allocating.
pub mod constants {
    pub const ERR_NOT_AUTHENTICATED: &str = "Operation requires an authenticated session";
    pub const ERR_SESSION_CLOSED: &str = "Session has already ended";
}

/// ProtocolError is the primary error type for all protocol operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the stream (zero-byte read / unexpected EOF).
    /// Distinct from [`ProtocolError::Io`] so session drivers can treat a
    /// clean disconnect differently from a broken transport.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// A per-read deadline elapsed before the requested bytes arrived.
    #[error("Operation timed out")]
    Timeout,

    #[error("Invalid frame header")]
    InvalidHeader,

    #[error("Truncated frame: expected {expected} bytes, got {got}")]
    TruncatedFrame { expected: usize, got: usize },

    #[error("Magic mismatch: expected {expected:#010x}, found {found:#010x}")]
    MagicMismatch { expected: u32, found: u32 },

    #[error("Unsupported protocol version: {0:#06x}")]
    UnsupportedVersion(u16),

    #[error("Unknown message type: {0:#06x}")]
    UnknownMessageType(u16),

    /// Declared `payload_length` matches no payload shape of the protocol.
    #[error("Invalid payload length: {0} bytes")]
    InvalidPayloadLength(u32),

    /// The next frame on the stream belongs to neither PIAP nor TITP.
    /// The four peeked bytes were **not** consumed; the stream is intact.
    #[error("Unrecognized frame magic: {0:#010x}")]
    UnrecognizedFrame(u32),

    /// The next frame belongs to the other channel than the caller asked
    /// for. Nothing was consumed; retry with the matching receive call.
    #[error("Unexpected frame kind on this channel")]
    UnexpectedFrame,

    /// A caller bug: the operation is not legal in the current session
    /// state (e.g. requesting a task before logging in).
    #[error("Invalid session state: {0}")]
    InvalidState(&'static str),

    #[error("Send retries exhausted after {0} attempts")]
    RetriesExhausted(u32),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
