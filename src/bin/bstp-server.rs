//! Demo server binary.
//!
//! Serves the demo account and task sets on the configured address.
//! Configuration comes from a TOML file named on the command line, or
//! the environment, or the built-in defaults.
//!
//! Run with: `cargo run --bin bstp-server -- [config.toml]`

use std::sync::Arc;

use tracing::info;

use bstp_protocol::config::NetworkConfig;
use bstp_protocol::error::Result;
use bstp_protocol::service::{MemoryAccounts, MemoryTasks, Server};
use bstp_protocol::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => NetworkConfig::from_file(&path)?,
        None => NetworkConfig::from_env()?,
    };
    config.validate_strict()?;

    logging::init(&config.logging)?;
    info!(address = %config.server.address, "starting server");

    let accounts = Arc::new(MemoryAccounts::demo());
    let tasks = Arc::new(MemoryTasks::demo());

    let server = Server::new(config.server, accounts, tasks);
    server.run().await
}
