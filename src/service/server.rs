//! Server session driver.
//!
//! The accept loop spawns one task per connection; each task walks its own
//! [`SessionState`] through the receive-and-classify loop until logout or
//! disconnect. Sessions run concurrently, which is why the account and
//! task repositories arrive as shared, synchronized trait objects.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::core::control::{ControlMsgType, ControlPacket};
use crate::core::data::{DataMsgType, DataPacket, TaskResponse};
use crate::core::status::{AuthStatus, FormatStatus, ResourceStatus};
use crate::error::{ProtocolError, Result};
use crate::protocol::session::{SessionEvent, SessionState};
use crate::service::store::{AccountStore, TaskStore};
use crate::transport::tcp::{Channel, Frame};
use crate::utils::time::unix_now;

/// The listening side of the protocol.
pub struct Server {
    config: ServerConfig,
    accounts: Arc<dyn AccountStore>,
    tasks: Arc<dyn TaskStore>,
}

impl Server {
    pub fn new(
        config: ServerConfig,
        accounts: Arc<dyn AccountStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        Self {
            config,
            accounts,
            tasks,
        }
    }

    /// Bind the configured address and serve until ctrl-c.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.address).await?;
        info!(address = %self.config.address, "listening");
        self.serve(listener).await
    }

    /// Serve on an already-bound listener (lets tests bind port 0).
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("received ctrl-c, shutting down");
                let _ = shutdown_tx.send(()).await;
            }
        });

        // Live session count, for the shutdown drain and the connection cap.
        let active_sessions = Arc::new(Mutex::new(0usize));

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("waiting for sessions to close");

                    let deadline = tokio::time::sleep(self.config.shutdown_timeout);
                    tokio::pin!(deadline);

                    loop {
                        tokio::select! {
                            _ = &mut deadline => {
                                warn!("shutdown timeout reached, forcing exit");
                                break;
                            }
                            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                                let sessions = *active_sessions.lock().await;
                                if sessions == 0 {
                                    info!("all sessions closed");
                                    break;
                                }
                                debug!(sessions, "sessions still open");
                            }
                        }
                    }

                    return Ok(());
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer)) => {
                            {
                                let mut sessions = active_sessions.lock().await;
                                if *sessions >= self.config.max_connections {
                                    warn!(%peer, "connection cap reached, refusing");
                                    drop(stream);
                                    continue;
                                }
                                *sessions += 1;
                            }
                            info!(%peer, "session opened");

                            let channel = Channel::new(stream, self.config.read_timeout);
                            let accounts = self.accounts.clone();
                            let tasks = self.tasks.clone();
                            let active_sessions = active_sessions.clone();

                            tokio::spawn(async move {
                                if let Err(e) = handle_session(channel, accounts, tasks).await {
                                    warn!(%peer, error = %e, "session ended with error");
                                } else {
                                    info!(%peer, "session closed");
                                }

                                let mut sessions = active_sessions.lock().await;
                                *sessions -= 1;
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "error accepting connection");
                        }
                    }
                }
            }
        }
    }
}

/// Drive one accepted connection to completion.
///
/// Each loop iteration peeks the next frame's magic and reads whichever
/// protocol it names. The read deadline doubles as the idle timeout: a
/// peer that goes silent mid-session is disconnected rather than parked
/// forever.
pub async fn handle_session(
    mut channel: Channel,
    accounts: Arc<dyn AccountStore>,
    tasks: Arc<dyn TaskStore>,
) -> Result<()> {
    let mut state = SessionState::Connected;

    while !state.is_terminal() {
        match channel.recv_frame().await {
            Ok(Frame::Control(packet)) => {
                state = handle_control(&mut channel, &packet, accounts.as_ref(), state).await?;
            }
            Ok(Frame::Data(packet)) => {
                state = handle_data(&mut channel, &packet, tasks.as_ref(), state).await?;
            }
            Err(ProtocolError::ConnectionClosed) => {
                debug!("peer closed the stream");
                state = state.advance(SessionEvent::PeerClosed);
            }
            Err(ProtocolError::Timeout) => {
                warn!("read deadline elapsed, closing session");
                state = state.advance(SessionEvent::TransportFailed);
            }
            Err(ProtocolError::UnrecognizedFrame(magic)) => {
                // Nothing was consumed; waiting would spin on the same
                // bytes, so the session is closed instead.
                warn!(magic = %format!("{magic:#010x}"), "unrecognized frame, closing session");
                state = state.advance(SessionEvent::TransportFailed);
            }
            Err(e) => {
                state = state.advance(SessionEvent::TransportFailed);
                let _ = channel.shutdown().await;
                return Err(e);
            }
        }
    }

    let _ = channel.shutdown().await;
    Ok(())
}

/// Control-channel handling: authentication lifecycle.
async fn handle_control(
    channel: &mut Channel,
    packet: &ControlPacket,
    accounts: &dyn AccountStore,
    state: SessionState,
) -> Result<SessionState> {
    let format = packet.valid_format();
    if format != FormatStatus::FormatOk {
        debug!(code = format.code(), "control frame failed format validation");
        let mut response = ControlPacket::new(ControlMsgType::LoginResponse);
        response.set_format_status(format);
        response.set_timestamp(unix_now());
        channel.send_control(&response).await?;
        return Ok(state);
    }

    match packet.msg_type() {
        Some(ControlMsgType::LoginRequest) => {
            let password = accounts.password_for(packet.user_id());
            let auth = packet.valid_auth(
                password.as_ref().map(|_| packet.user_id()),
                password.as_deref(),
            );

            let mut response = ControlPacket::new(ControlMsgType::LoginResponse);
            response.set_format_status(FormatStatus::FormatOk);
            response.set_auth_status(auth);
            response.set_timestamp(unix_now());
            channel.send_control(&response).await?;

            let state = state.advance(SessionEvent::LoginSent);
            if auth == AuthStatus::LoginSuccess {
                info!(user = packet.user_id(), "login accepted");
                Ok(state.advance(SessionEvent::LoginAccepted))
            } else {
                info!(user = packet.user_id(), code = auth.code(), "login rejected");
                Ok(state.advance(SessionEvent::LoginRejected))
            }
        }

        Some(ControlMsgType::SignupRequest) => {
            let existing = accounts.password_for(packet.user_id());
            let auth = packet.valid_auth(
                existing.as_ref().map(|_| packet.user_id()),
                existing.as_deref(),
            );
            if auth == AuthStatus::SignupSuccess {
                accounts.register(packet.user_id(), packet.password());
                info!(user = packet.user_id(), "account registered");
            }

            let mut response = ControlPacket::new(ControlMsgType::SignupResponse);
            response.set_format_status(FormatStatus::FormatOk);
            response.set_auth_status(auth);
            response.set_timestamp(unix_now());
            channel.send_control(&response).await?;
            Ok(state)
        }

        Some(ControlMsgType::LogoutRequest) => {
            info!("logout requested");
            Ok(SessionState::Disconnected)
        }

        // Server-to-client message types arriving at the server are a
        // client bug; answer with the bad-request code and carry on.
        _ => {
            let mut response = ControlPacket::new(ControlMsgType::LoginResponse);
            response.set_format_status(FormatStatus::FormatOk);
            response.set_auth_status(AuthStatus::BadRequest);
            response.set_timestamp(unix_now());
            channel.send_control(&response).await?;
            Ok(state)
        }
    }
}

/// Data-channel handling: the resource request/response loop.
async fn handle_data(
    channel: &mut Channel,
    packet: &DataPacket,
    tasks: &dyn TaskStore,
    state: SessionState,
) -> Result<SessionState> {
    let format = packet.valid_format();
    if format != FormatStatus::FormatOk {
        debug!(code = format.code(), "data frame failed format validation");
        let mut response = TaskResponse::new();
        response.set_format_status(format);
        send_task_response(channel, response).await?;
        return Ok(state);
    }

    if packet.msg_type() != Some(DataMsgType::ResourceRequest) {
        warn!("data frame was not a resource request");
        return Ok(state);
    }

    let task_id = packet.task_id();

    // Task data flows only inside an authenticated session.
    if !state.is_authenticated() {
        debug!(task_id, "resource request before authentication");
        let mut response = TaskResponse::new();
        response.set_task_id(task_id);
        response.set_format_status(FormatStatus::FormatOk);
        response.set_resource_status(ResourceStatus::ResourceExpired);
        send_task_response(channel, response).await?;
        return Ok(state);
    }

    let mut response = TaskResponse::new();
    response.set_task_id(task_id);
    response.set_format_status(FormatStatus::FormatOk);

    match tasks.find(task_id) {
        Some(record) => {
            response.set_task_name(&record.name);
            response.set_description(&record.description);
            response.set_difficulty(record.difficulty);
            response.set_resource_status(ResourceStatus::ResourceAck);
            debug!(task_id, name = %record.name, "serving task");
        }
        None => {
            response.set_resource_status(ResourceStatus::ResourceNotFound);
            debug!(task_id, "task not found");
        }
    }

    send_task_response(channel, response).await?;
    Ok(state.advance(SessionEvent::ExchangeCompleted))
}

async fn send_task_response(channel: &mut Channel, response: TaskResponse) -> Result<()> {
    let mut packet = DataPacket::response(response);
    packet.set_timestamp(unix_now());
    channel.send_data(&packet).await
}
