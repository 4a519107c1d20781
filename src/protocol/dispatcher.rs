//! Frame classification for the shared stream.
//!
//! One socket carries two framed protocols. Before committing to a full
//! read, the receiver peeks the first four bytes (the magic field) and
//! this module decides which codec owns the frame. Classification is pure;
//! the non-consuming peek itself lives in [`crate::transport`], so a
//! misclassified or foreign frame is never pulled off the stream.

use crate::core::control::CONTROL_MAGIC;
use crate::core::data::DATA_MAGIC;
use crate::error::{ProtocolError, Result};

/// Which protocol the next frame on the stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// PIAP control frame (fixed size).
    Control,
    /// TITP data frame (header-declared size).
    Data,
}

impl FrameKind {
    /// Classify a magic value. `None` means neither protocol claims it.
    pub fn classify(magic: u32) -> Option<Self> {
        match magic {
            CONTROL_MAGIC => Some(Self::Control),
            DATA_MAGIC => Some(Self::Data),
            _ => None,
        }
    }

    /// Classify the first four peeked bytes of a frame.
    ///
    /// Fewer than four bytes is an invalid-header condition; a full four
    /// bytes that match neither magic is [`ProtocolError::UnrecognizedFrame`],
    /// carrying the offending value so the caller can log it before
    /// deciding to retry, wait, or close.
    pub fn from_prefix(prefix: &[u8]) -> Result<Self> {
        if prefix.len() < 4 {
            return Err(ProtocolError::InvalidHeader);
        }

        let magic = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        Self::classify(magic).ok_or(ProtocolError::UnrecognizedFrame(magic))
    }
}
