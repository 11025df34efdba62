use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Runtime configuration, from flags or environment
#[derive(Debug, Clone, Parser)]
#[command(name = "chess-server", about = "Two-player chess game server")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CHESS_SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// SQLite file holding game sessions
    #[arg(long, env = "CHESS_SERVER_DB", default_value = "chess_server.db")]
    pub database: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "CHESS_SERVER_LOG", default_value = "info")]
    pub log: String,

    /// Events a slow WebSocket client may lag behind before it skips ahead
    #[arg(long, env = "CHESS_SERVER_EVENT_CAPACITY", default_value_t = 256)]
    pub event_capacity: usize,
}
