//! Client session driver.
//!
//! Wraps a [`Channel`] with the authentication lifecycle: connect, log in
//! (or sign up), request tasks while authenticated, then log out. The
//! client owns one [`SessionState`] and refuses operations the state does
//! not permit, so protocol misuse surfaces as an error before any bytes
//! move.

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::core::control::{ControlMsgType, ControlPacket};
use crate::core::data::{DataPacket, TaskResponse};
use crate::core::status::{AuthStatus, FormatStatus};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::session::{SessionEvent, SessionState};
use crate::transport::tcp::Channel;
use crate::utils::time::unix_now;

/// Outcome of a login or signup exchange.
///
/// `format` reflects the response frame itself; `auth` is the server's
/// verdict, absent when the response carried an unknown code. `message`
/// is the server-filled status text, useful for display.
#[derive(Debug, Clone)]
pub struct AuthReply {
    pub format: FormatStatus,
    pub auth: Option<AuthStatus>,
    pub message: String,
}

impl AuthReply {
    pub fn is_login_success(&self) -> bool {
        self.format == FormatStatus::FormatOk && self.auth == Some(AuthStatus::LoginSuccess)
    }

    pub fn is_signup_success(&self) -> bool {
        self.format == FormatStatus::FormatOk && self.auth == Some(AuthStatus::SignupSuccess)
    }
}

/// The connecting side of the protocol.
pub struct Client {
    channel: Channel,
    config: ClientConfig,
    state: SessionState,
}

impl Client {
    /// Connect to the configured server address.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let channel = Channel::connect(
            &config.address,
            config.connect_timeout,
            config.read_timeout,
        )
        .await?;
        info!(address = %config.address, "connected");

        Ok(Self {
            channel,
            config,
            state: SessionState::Connected,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Authenticate with the server.
    ///
    /// On a rejected login the session stays usable; the caller may retry
    /// with different credentials. Transport failures are terminal.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<AuthReply> {
        if self.state.is_terminal() {
            return Err(ProtocolError::InvalidState(constants::ERR_SESSION_CLOSED));
        }

        let mut request = ControlPacket::new(ControlMsgType::LoginRequest);
        request.set_credentials(user, password);
        request.set_timestamp(unix_now());

        self.send_control_with_retry(&request).await?;
        self.state = self.state.advance(SessionEvent::LoginSent);

        let response = self.recv_control().await?;
        let reply = Self::read_auth_reply(&response);

        if reply.is_login_success() {
            info!(user, "login accepted");
            self.state = self.state.advance(SessionEvent::LoginAccepted);
        } else {
            debug!(user, message = %reply.message, "login rejected");
            self.state = self.state.advance(SessionEvent::LoginRejected);
        }

        Ok(reply)
    }

    /// Register a new account. Does not authenticate the session; follow
    /// up with [`Self::login`].
    pub async fn signup(&mut self, user: &str, password: &str) -> Result<AuthReply> {
        if self.state.is_terminal() {
            return Err(ProtocolError::InvalidState(constants::ERR_SESSION_CLOSED));
        }

        let mut request = ControlPacket::new(ControlMsgType::SignupRequest);
        request.set_credentials(user, password);
        request.set_timestamp(unix_now());

        self.send_control_with_retry(&request).await?;
        let response = self.recv_control().await?;
        Ok(Self::read_auth_reply(&response))
    }

    /// Fetch one task record by id. Requires an authenticated session.
    pub async fn request_task(&mut self, task_id: u64) -> Result<TaskResponse> {
        if !self.state.is_authenticated() {
            return Err(ProtocolError::InvalidState(constants::ERR_NOT_AUTHENTICATED));
        }

        let mut request = DataPacket::request(task_id);
        request.set_timestamp(unix_now());
        self.send_data_with_retry(&request).await?;

        let response = match self.channel.recv_data().await {
            Ok(packet) => packet,
            Err(e) => return Err(self.fail_transport(e)),
        };

        let task = response
            .task_response()
            .cloned()
            .ok_or(ProtocolError::UnexpectedFrame)?;

        self.state = self.state.advance(SessionEvent::ExchangeCompleted);
        Ok(task)
    }

    /// End the session cleanly. The server closes its side on receipt;
    /// no response frame is expected.
    pub async fn logout(&mut self) -> Result<()> {
        if !self.state.is_authenticated() {
            return Err(ProtocolError::InvalidState(constants::ERR_NOT_AUTHENTICATED));
        }

        let mut request = ControlPacket::new(ControlMsgType::LogoutRequest);
        request.set_timestamp(unix_now());
        self.send_control_with_retry(&request).await?;

        self.state = self.state.advance(SessionEvent::LogoutRequested);
        self.channel.shutdown().await?;
        info!("logged out");
        Ok(())
    }

    /// Receive the next control frame, folding a server-pushed
    /// `FORCE_LOGOUT` and transport failures into the session state.
    async fn recv_control(&mut self) -> Result<ControlPacket> {
        match self.channel.recv_control().await {
            Ok(packet) => {
                if packet.msg_type() == Some(ControlMsgType::ForceLogout) {
                    warn!("server forced logout");
                    self.state = SessionState::Disconnected;
                    return Err(ProtocolError::ConnectionClosed);
                }
                Ok(packet)
            }
            Err(e) => Err(self.fail_transport(e)),
        }
    }

    fn read_auth_reply(response: &ControlPacket) -> AuthReply {
        AuthReply {
            format: response.valid_format(),
            auth: response.auth_status(),
            message: response.status_msg().to_string(),
        }
    }

    async fn send_control_with_retry(&mut self, packet: &ControlPacket) -> Result<()> {
        let bytes = packet.to_bytes();
        self.send_with_retry(&bytes).await
    }

    async fn send_data_with_retry(&mut self, packet: &DataPacket) -> Result<()> {
        let bytes = packet.to_bytes();
        self.send_with_retry(&bytes).await
    }

    /// Retry the whole write a bounded number of times. Retries are
    /// immediate; the frame is small enough that a failed write is a
    /// connection problem, not congestion.
    async fn send_with_retry(&mut self, bytes: &[u8]) -> Result<()> {
        let mut last_err = None;
        for attempt in 1..=self.config.send_retries {
            match self.channel.send_exact(bytes).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(attempt, error = %e, "send failed");
                    last_err = Some(e);
                }
            }
        }

        self.state = self.state.advance(SessionEvent::TransportFailed);
        match last_err {
            Some(e) => Err(e),
            None => Err(ProtocolError::RetriesExhausted(self.config.send_retries)),
        }
    }

    fn fail_transport(&mut self, e: ProtocolError) -> ProtocolError {
        self.state = self.state.advance(match e {
            ProtocolError::ConnectionClosed => SessionEvent::PeerClosed,
            _ => SessionEvent::TransportFailed,
        });
        e
    }
}
