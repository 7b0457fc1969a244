//! Command-line argument parsing

use clap::Parser;
use relay_common::DEFAULT_PORT;
use std::net::IpAddr;

/// Relay Chat Server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IP address to bind to (IPv4 or IPv6)
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable debug logging (shows register/route/disconnect events)
    #[arg(long, default_value = "false")]
    pub debug: bool,
}
