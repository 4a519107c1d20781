//! Status codes carried inside packet payloads.
//!
//! Two result families exist per protocol: a *format* result (is this frame
//! well formed) and a *business* result (did the request succeed). Both are
//! closed enums with fixed u16 wire codes. The code is authoritative; the
//! descriptive text looked up through `message()` travels alongside it in
//! the `status_msg` payload field.

/// Format-validation result, shared by both protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FormatStatus {
    FormatOk = 50,
    MagicMismatch = 300,
    BadVersion = 301,
    MsgTypeNotFound = 302,
    TimestampErr = 303,
}

impl FormatStatus {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            50 => Some(Self::FormatOk),
            300 => Some(Self::MagicMismatch),
            301 => Some(Self::BadVersion),
            302 => Some(Self::MsgTypeNotFound),
            303 => Some(Self::TimestampErr),
            _ => None,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::FormatOk => "Format validation passed.",
            Self::MagicMismatch => "Error: Protocol magic number mismatch.",
            Self::BadVersion => "Error: Unsupported protocol version.",
            Self::MsgTypeNotFound => "Error: Unknown message type.",
            Self::TimestampErr => "Error: Request timestamp expired or invalid.",
        }
    }
}

/// Authentication outcome (PIAP business result).
///
/// `SignupSuccess` and `LoginSuccess` are the only codes that establish the
/// control channel; everything else keeps the session in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum AuthStatus {
    SignupSuccess = 100,
    LoginSuccess = 200,

    BadRequest = 400,
    UserAlreadyExists = 401,
    UserNotFound = 402,
    WrongPassword = 403,
    UserBanned = 404,

    ServerErrResponse = 500,
    ServerUnavailable = 503,
}

impl AuthStatus {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            100 => Some(Self::SignupSuccess),
            200 => Some(Self::LoginSuccess),
            400 => Some(Self::BadRequest),
            401 => Some(Self::UserAlreadyExists),
            402 => Some(Self::UserNotFound),
            403 => Some(Self::WrongPassword),
            404 => Some(Self::UserBanned),
            500 => Some(Self::ServerErrResponse),
            503 => Some(Self::ServerUnavailable),
            _ => None,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::SignupSuccess => "Registration successful!",
            Self::LoginSuccess => "Authentication successful!",
            Self::BadRequest => "Error: Invalid request format or missing required fields",
            Self::UserAlreadyExists => "Error: Username already exists.",
            Self::UserNotFound => "Error: Invalid account.",
            Self::WrongPassword => "Error: Invalid password.",
            Self::UserBanned => "Permission denied: Account has been banned!",
            Self::ServerErrResponse => "Error: Internal server error.",
            Self::ServerUnavailable => "Error: Service temporarily unavailable.",
        }
    }
}

/// Resource-transfer outcome (TITP business result).
///
/// Codes in the 2000 range describe the resource itself (retrying soon will
/// not help); the 3000 range describes a transfer fault the client may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ResourceStatus {
    ResourceAck = 1000,

    ResourceNotFound = 2000,
    ResourceInfoMismatch = 2001,
    ResourceExpired = 2002,
    ResourceUnavailable = 2003,

    ServerTransferTimeout = 3000,
    ServerTransferBreakdown = 3001,
}

impl ResourceStatus {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1000 => Some(Self::ResourceAck),
            2000 => Some(Self::ResourceNotFound),
            2001 => Some(Self::ResourceInfoMismatch),
            2002 => Some(Self::ResourceExpired),
            2003 => Some(Self::ResourceUnavailable),
            3000 => Some(Self::ServerTransferTimeout),
            3001 => Some(Self::ServerTransferBreakdown),
            _ => None,
        }
    }
}

/// Task difficulty grade carried in TITP response metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Difficulty {
    #[default]
    Unknown = 0,
    QuiteEasy = 1,
    Easy = 2,
    Medium = 3,
    Hard = 4,
    ExtremelyHard = 5,
}

impl Difficulty {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Unknown codes decode to [`Difficulty::Unknown`] rather than failing;
    /// the field is advisory display metadata.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::QuiteEasy,
            2 => Self::Easy,
            3 => Self::Medium,
            4 => Self::Hard,
            5 => Self::ExtremelyHard,
            _ => Self::Unknown,
        }
    }
}
