//! Log message constants for the relay server

pub const MSG_BANNER: &str = "Relay Chat Server v";
pub const MSG_LISTENING: &str = "Listening on: ws://";
pub const MSG_SHUTDOWN_RECEIVED: &str = "Shutdown signal received, exiting";

pub const ERR_BIND_FAILED: &str = "Failed to bind ";
pub const ERR_ACCEPT: &str = "Failed to accept connection: ";
pub const ERR_CONNECTION: &str = "Connection error from ";
pub const ERR_WS_HANDSHAKE: &str = "WebSocket handshake failed: ";
pub const ERR_PARSE_ENVELOPE: &str = "Dropped unparseable envelope from ";
pub const ERR_DELIVERY: &str = "Failed to deliver to session ";

pub const ERR_SIGNAL_SIGTERM: &str = "Failed to install SIGTERM handler";
pub const ERR_SIGNAL_SIGINT: &str = "Failed to install SIGINT handler";
pub const ERR_SIGNAL_CTRLC: &str = "Failed to install Ctrl+C handler";
