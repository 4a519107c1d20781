//! PIAP, the control channel.
//!
//! The Player Identity Authorization Protocol carries authentication and
//! session-lifecycle messages in frames of a single, publicly-known size:
//! the 20-byte header plus a 516-byte payload. Receivers size their read
//! buffers with [`CONTROL_FRAME_LEN`] verbatim.
//!
//! Format validation ([`ControlPacket::valid_format_at`]) and business
//! validation ([`ControlPacket::valid_auth`]) are pure functions run by the
//! receiver, kept outside the codec so "is this decodable" and "is this
//! acceptable" stay distinct concerns.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::core::bounded::BoundedText;
use crate::core::header::{FrameHeader, HEADER_LEN};
use crate::core::status::{AuthStatus, FormatStatus};
use crate::error::{ProtocolError, Result};
use crate::utils::time;

/// "PIAP" in ASCII.
pub const CONTROL_MAGIC: u32 = 0x5049_4150;
/// Supported wire-format version.
pub const CONTROL_VERSION: u16 = 0x0100;
/// Maximum age of a timestamped control frame, in seconds.
pub const CONTROL_TTL_SECS: u32 = 60;

/// Wire widths of the payload text fields.
pub const USER_ID_LEN: usize = 64;
pub const PASSWORD_LEN: usize = 128;
pub const SESSION_LEN: usize = 64;
pub const STATUS_MSG_LEN: usize = 256;

/// Payload size: four text fields plus the two u16 status codes.
pub const CONTROL_PAYLOAD_LEN: usize =
    USER_ID_LEN + PASSWORD_LEN + SESSION_LEN + STATUS_MSG_LEN + 4;

/// Every control frame is exactly this many bytes.
pub const CONTROL_FRAME_LEN: usize = HEADER_LEN + CONTROL_PAYLOAD_LEN;

/// Control-channel message discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ControlMsgType {
    // Client -> server
    SignupRequest = 0x0001,
    LoginRequest = 0x0002,
    LogoutRequest = 0x0003,

    // Server -> client
    SignupResponse = 0x0004,
    LoginResponse = 0x0005,
    ForceLogout = 0x0006,
}

impl ControlMsgType {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0001 => Some(Self::SignupRequest),
            0x0002 => Some(Self::LoginRequest),
            0x0003 => Some(Self::LogoutRequest),
            0x0004 => Some(Self::SignupResponse),
            0x0005 => Some(Self::LoginResponse),
            0x0006 => Some(Self::ForceLogout),
            _ => None,
        }
    }
}

/// A PIAP frame: header plus the fixed authentication payload.
///
/// The `session` field is reserved wire space for a future session token.
/// It is carried and zero-filled but never set or checked, so no setter is
/// exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPacket {
    header: FrameHeader,
    user_id: BoundedText<USER_ID_LEN>,
    password: BoundedText<PASSWORD_LEN>,
    session: BoundedText<SESSION_LEN>,
    status_msg: BoundedText<STATUS_MSG_LEN>,
    msg_status: u16,
    auth_status: u16,
}

impl ControlPacket {
    pub fn new(msg_type: ControlMsgType) -> Self {
        Self {
            header: FrameHeader::new(
                CONTROL_MAGIC,
                CONTROL_VERSION,
                msg_type.code(),
                CONTROL_PAYLOAD_LEN as u32,
            ),
            user_id: BoundedText::default(),
            password: BoundedText::default(),
            session: BoundedText::default(),
            status_msg: BoundedText::default(),
            msg_status: 0,
            auth_status: 0,
        }
    }

    /// Stamp the header with an issue time, opting in to TTL enforcement
    /// on the receiving side.
    pub fn set_timestamp(&mut self, epoch_secs: u32) {
        self.header.timestamp = epoch_secs;
    }

    /// Fill in the credentials a client sends with a signup or login
    /// request. Overlong values are truncated to the wire field widths.
    pub fn set_credentials(&mut self, user_id: &str, password: &str) {
        self.user_id = BoundedText::new(user_id);
        self.password = BoundedText::new(password);
    }

    /// Record a format-validation outcome plus its descriptive text.
    pub fn set_format_status(&mut self, status: FormatStatus) {
        self.msg_status = status.code();
        self.status_msg = BoundedText::new(status.message());
    }

    /// Record an authentication outcome plus its descriptive text.
    pub fn set_auth_status(&mut self, status: AuthStatus) {
        self.auth_status = status.code();
        self.status_msg = BoundedText::new(status.message());
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn msg_type(&self) -> Option<ControlMsgType> {
        ControlMsgType::from_code(self.header.msg_type)
    }

    pub fn format_status(&self) -> Option<FormatStatus> {
        FormatStatus::from_code(self.msg_status)
    }

    pub fn auth_status(&self) -> Option<AuthStatus> {
        AuthStatus::from_code(self.auth_status)
    }

    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn status_msg(&self) -> &str {
        self.status_msg.as_str()
    }

    /// Total encoded size. Constant for control frames.
    pub const fn wire_size(&self) -> usize {
        CONTROL_FRAME_LEN
    }

    /// Serialize to exactly [`CONTROL_FRAME_LEN`] bytes.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(CONTROL_FRAME_LEN);
        self.header.encode_into(&mut buf);
        self.user_id.encode_into(&mut buf);
        self.password.encode_into(&mut buf);
        self.session.encode_into(&mut buf);
        self.status_msg.encode_into(&mut buf);
        buf.put_u16(self.msg_status);
        buf.put_u16(self.auth_status);

        debug_assert_eq!(buf.len(), CONTROL_FRAME_LEN);
        buf.freeze()
    }

    /// Deserialize a full control frame.
    ///
    /// Rejects short input, foreign magic, and unsupported versions before
    /// touching the payload. Never yields a partially-populated packet.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < CONTROL_FRAME_LEN {
            return Err(ProtocolError::TruncatedFrame {
                expected: CONTROL_FRAME_LEN,
                got: bytes.len(),
            });
        }

        let header = FrameHeader::decode(bytes)?;
        if header.magic != CONTROL_MAGIC {
            return Err(ProtocolError::MagicMismatch {
                expected: CONTROL_MAGIC,
                found: header.magic,
            });
        }
        if header.version != CONTROL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(header.version));
        }

        let mut cur = &bytes[HEADER_LEN..CONTROL_FRAME_LEN];
        let user_id = BoundedText::decode_from(&mut cur);
        let password = BoundedText::decode_from(&mut cur);
        let session = BoundedText::decode_from(&mut cur);
        let status_msg = BoundedText::decode_from(&mut cur);
        let msg_status = cur.get_u16();
        let auth_status = cur.get_u16();

        Ok(Self {
            header,
            user_id,
            password,
            session,
            status_msg,
            msg_status,
            auth_status,
        })
    }

    /// Format validation against the wall clock. See [`Self::valid_format_at`].
    pub fn valid_format(&self) -> FormatStatus {
        self.valid_format_at(time::unix_now())
    }

    /// Pure format validation, checked in order: magic, version, known
    /// message type, then TTL when the frame is timestamped. The first
    /// violated rule wins.
    pub fn valid_format_at(&self, now: u32) -> FormatStatus {
        if self.header.magic != CONTROL_MAGIC {
            return FormatStatus::MagicMismatch;
        }
        if self.header.version != CONTROL_VERSION {
            return FormatStatus::BadVersion;
        }
        if self.msg_type().is_none() {
            return FormatStatus::MsgTypeNotFound;
        }
        if self.header.timestamp != 0
            && (now < self.header.timestamp || now > self.header.timestamp + CONTROL_TTL_SECS)
        {
            return FormatStatus::TimestampErr;
        }
        FormatStatus::FormatOk
    }

    /// Credential check, run only by the side that owns credential state.
    ///
    /// The caller resolves this packet's `user_id` against its account
    /// registry and passes what it found; this function only decides. It
    /// never persists a new account.
    pub fn valid_auth(
        &self,
        expected_user: Option<&str>,
        expected_password: Option<&str>,
    ) -> AuthStatus {
        match self.msg_type() {
            Some(ControlMsgType::SignupRequest) => {
                if expected_user.is_some() {
                    AuthStatus::UserAlreadyExists
                } else {
                    AuthStatus::SignupSuccess
                }
            }
            Some(ControlMsgType::LoginRequest) => {
                match expected_user {
                    Some(user) if user == self.user_id.as_str() => {}
                    _ => return AuthStatus::UserNotFound,
                }
                match expected_password {
                    Some(password) if password == self.password.as_str() => {
                        AuthStatus::LoginSuccess
                    }
                    _ => AuthStatus::WrongPassword,
                }
            }
            _ => AuthStatus::BadRequest,
        }
    }
}
