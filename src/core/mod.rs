//! # Core Wire Components
//!
//! Low-level frame handling and binary layout for both BSTP channels.
//!
//! This module owns the byte-level contract: the shared frame header, the
//! fixed-width text fields, the closed status-code enums, and the two packet
//! kinds that share one TCP stream.
//!
//! ## Components
//! - **Header**: the 20-byte envelope both protocols open with
//! - **Bounded**: fixed-capacity, zero-padded text fields
//! - **Status**: format / authentication / resource status codes
//! - **Control**: PIAP packets (fixed 536-byte frames)
//! - **Data**: TITP packets (header plus variable payload)
//!
//! ## Wire Format
//! ```text
//! [Magic(4)] [Version(2)] [MsgType(2)] [PayloadLen(4)] [Timestamp(4)] [Reserved(4)] [Payload(N)]
//! ```
//! All header integers are big-endian. Payload bytes are copied verbatim.
//!
//! ## Safety
//! - Decoding never partially succeeds: a full packet or an error
//! - The magic field is validated before a frame is consumed from the stream
//! - Declared payload lengths are checked against the shapes the message
//!   type allows before any allocation

pub mod bounded;
pub mod control;
pub mod data;
pub mod header;
pub mod status;

pub use control::{ControlMsgType, ControlPacket};
pub use data::{DataMsgType, DataPacket, DataPayload, TaskResponse};
pub use header::{FrameHeader, HEADER_LEN};
pub use status::{AuthStatus, Difficulty, FormatStatus, ResourceStatus};
