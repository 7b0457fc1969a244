//! Relay chat server

mod args;
mod connection;
mod constants;
mod fanout;
mod history;
mod registry;
mod router;

use std::io;
use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;

use args::Args;
use constants::*;
use router::MessageRouter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Print banner first
    println!("{}{}", MSG_BANNER, env!("CARGO_PKG_VERSION"));

    let listener = setup_listener(args.bind, args.port).await;

    let router = MessageRouter::new(args.debug);

    // Setup graceful shutdown handling
    let shutdown_signal = setup_shutdown_signal();

    let debug = args.debug;
    tokio::select! {
        _ = shutdown_signal => {
            println!("{}", MSG_SHUTDOWN_RECEIVED);
        }
        // Accept loop
        _ = async {
            loop {
                match listener.accept().await {
                    Ok((socket, peer_addr)) => {
                        let router = router.clone();

                        // Each connection runs in its own task
                        tokio::spawn(async move {
                            if let Err(e) =
                                connection::handle_connection(socket, peer_addr, router, debug).await
                            {
                                log_connection_error(&e, peer_addr, debug);
                            }
                        });
                    }
                    Err(e) => {
                        eprintln!("{}{}", ERR_ACCEPT, e);
                    }
                }
            }
        } => {}
    }
}

/// Bind the listening socket, exiting on failure
async fn setup_listener(bind: std::net::IpAddr, port: u16) -> TcpListener {
    let addr = SocketAddr::new(bind, port);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("{}{}: {}", ERR_BIND_FAILED, addr, e);
            std::process::exit(1);
        }
    };
    println!("{}{}", MSG_LISTENING, addr);
    listener
}

/// Log connection errors, filtering noise from scanners
///
/// Handshake failures are debug-only (port scanners, plain-HTTP probes).
fn log_connection_error(error: &io::Error, peer_addr: SocketAddr, debug: bool) {
    let error_msg = error.to_string();

    if error_msg.contains(ERR_WS_HANDSHAKE) {
        if debug {
            eprintln!("{}{}: {}", ERR_CONNECTION, peer_addr, error);
        }
        return;
    }

    eprintln!("{}{}: {}", ERR_CONNECTION, peer_addr, error);
}

/// Setup graceful shutdown signal handling (Ctrl+C)
async fn setup_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect(ERR_SIGNAL_SIGTERM);
        let mut sigint = signal(SignalKind::interrupt()).expect(ERR_SIGNAL_SIGINT);

        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect(ERR_SIGNAL_CTRLC);
    }
}
