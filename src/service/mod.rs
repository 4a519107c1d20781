//! # Services
//!
//! Session drivers built on the core codecs and the TCP channel: the
//! accept-and-serve server, the connect-login-request client, and the
//! repository traits both consult.

pub mod client;
pub mod server;
pub mod store;

pub use client::{AuthReply, Client};
pub use server::Server;
pub use store::{AccountStore, MemoryAccounts, MemoryTasks, TaskRecord, TaskStore};
