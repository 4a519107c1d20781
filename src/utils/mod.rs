//! # Utility Modules
//!
//! Supporting utilities for timekeeping, deadlines, and logging.
//!
//! ## Components
//! - **Time**: epoch-second timestamps for frame TTL checks
//! - **Timeout**: shared deadline constants for transport reads and connects
//! - **Logging**: structured logging setup driven by [`crate::config::LoggingConfig`]

pub mod logging;
pub mod time;
pub mod timeout;
