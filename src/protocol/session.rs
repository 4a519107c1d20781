//! Per-connection session state machine.
//!
//! Both sides of a connection walk the same lifecycle:
//!
//! ```text
//! Connected -> Authenticating -> Authenticated -> Disconnected
//!                    |                 ^  |
//!                    +--(rejected)-----+  +--(request/response loop)
//! ```
//!
//! State is per-session and passed through the drivers in
//! [`crate::service`]; there are no globals. The transition function is
//! total: an event that is not legal in the current state leaves the state
//! unchanged, except for the transport events, which force `Disconnected`
//! from anywhere.

/// Lifecycle state of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// TCP established, nobody logged in yet.
    #[default]
    Connected,
    /// A LOGIN_REQUEST is in flight; waiting for the verdict.
    Authenticating,
    /// LOGIN_RESPONSE came back FORMAT_OK + LOGIN_SUCCESS; the data channel
    /// is open for request/response exchanges.
    Authenticated,
    /// Terminal. Reached by logout, peer close, or transport failure.
    Disconnected,
}

/// Observations that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Client sent a LOGIN_REQUEST control frame.
    LoginSent,
    /// LOGIN_RESPONSE carried format OK and LOGIN_SUCCESS.
    LoginAccepted,
    /// Any other login outcome; credentials may be retried.
    LoginRejected,
    /// One RESOURCE_REQUEST / RESOURCE_SENT exchange completed.
    ExchangeCompleted,
    /// Client sent (or server received) a LOGOUT_REQUEST.
    LogoutRequested,
    /// A zero-byte read: the peer closed the stream.
    PeerClosed,
    /// An unrecoverable transport failure.
    TransportFailed,
}

impl SessionState {
    /// Apply one event and return the resulting state.
    #[must_use]
    pub fn advance(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (_, PeerClosed) | (_, TransportFailed) => Disconnected,
            (Disconnected, _) => Disconnected,

            (Connected, LoginSent) => Authenticating,
            (Authenticating, LoginAccepted) => Authenticated,
            (Authenticating, LoginRejected) => Connected,
            (Authenticated, ExchangeCompleted) => Authenticated,
            (Authenticated, LogoutRequested) => Disconnected,

            // Event not legal here; hold position.
            (state, _) => state,
        }
    }

    /// Once disconnected, a session never comes back; reconnecting creates
    /// a fresh session.
    pub fn is_terminal(self) -> bool {
        self == Self::Disconnected
    }

    pub fn is_authenticated(self) -> bool {
        self == Self::Authenticated
    }
}
