//! # BSTP Protocol
//!
//! A dual-protocol wire suite carried over a single TCP stream:
//!
//! - **PIAP** (control): fixed-size authentication frames covering signup,
//!   login, and logout.
//! - **TITP** (data): variable-size frames carrying task requests and the
//!   task records that answer them.
//!
//! Both protocols share one 20-byte big-endian header; the leading magic
//! number tells them apart, so a receiver can classify the next frame by
//! peeking four bytes without consuming anything from the stream.
//!
//! ## Architecture
//! - [`core`]: packet types, fixed-width text fields, status codes
//! - [`protocol`]: frame classification and the session state machine
//! - [`transport`]: exact-byte TCP channel with peek-based dispatch
//! - [`service`]: client and server session drivers, pluggable stores
//! - [`config`]: TOML and environment configuration
//! - [`error`]: the crate-wide error type
//!
//! ## Example Usage
//! ```rust,no_run
//! use bstp_protocol::config::ClientConfig;
//! use bstp_protocol::service::Client;
//!
//! #[tokio::main]
//! async fn main() -> bstp_protocol::error::Result<()> {
//!     let mut client = Client::connect(ClientConfig::default()).await?;
//!
//!     let reply = client.login("user1", "password1").await?;
//!     if reply.is_login_success() {
//!         let task = client.request_task(1).await?;
//!         println!("{}: {}", task.task_name(), task.description());
//!         client.logout().await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::config::{ClientConfig, NetworkConfig, ServerConfig};
    pub use crate::core::{
        AuthStatus, ControlMsgType, ControlPacket, DataMsgType, DataPacket, Difficulty,
        FormatStatus, ResourceStatus, TaskResponse,
    };
    pub use crate::error::{ProtocolError, Result};
    pub use crate::protocol::{FrameKind, SessionEvent, SessionState};
    pub use crate::service::{AuthReply, Client, Server};
    pub use crate::transport::{Channel, Frame};
}
