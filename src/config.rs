//! Server configuration.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags
//! 2. Environment variables (MAGPIE_*)
//! 3. Defaults
//!
//! There is deliberately no config file: the store is volatile and the
//! server carries no persistent state beyond the uploads directory.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// magpie - ownership-scoped content vault server
#[derive(Parser, Debug, Clone)]
#[command(name = "magpie")]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "MAGPIE_BIND", default_value = "127.0.0.1:4000")]
    pub bind: SocketAddr,

    /// Directory for uploaded file blobs
    #[arg(long, env = "MAGPIE_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Timeout for outbound page fetches, in seconds
    #[arg(long, env = "MAGPIE_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,
}
