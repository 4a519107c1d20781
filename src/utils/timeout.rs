//! Shared deadline constants.
//!
//! Every read in this crate carries a deadline; a silent peer gets its
//! session closed, never a blocked server. Values are overridable
//! through [`crate::config`].

use std::time::Duration;

/// Deadline for establishing a TCP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for a single exact-byte read to complete.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a shutting-down server waits for live sessions to drain.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
