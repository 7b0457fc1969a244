//! Client connection handling

use std::io;
use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use relay_common::MAX_ENVELOPE_BYTES;
use relay_common::protocol::{ClientEnvelope, ServerEnvelope};

use crate::constants::*;
use crate::router::MessageRouter;

/// Handle one client connection from WebSocket handshake to disconnect
///
/// Runs a select loop over inbound frames and the session's outbound
/// envelope queue, so the socket is read and written concurrently. The
/// socket is only ever written from this task; other connections reach it
/// through the queue. Disconnect cleanup runs once the loop exits, for any
/// reason.
pub async fn handle_connection(
    socket: TcpStream,
    peer_addr: SocketAddr,
    router: MessageRouter,
    debug: bool,
) -> io::Result<()> {
    let ws_stream = accept_async(socket)
        .await
        .map_err(|e| io::Error::other(format!("{}{}", ERR_WS_HANDSHAKE, e)))?;

    let session_id = router.allocate_session_id();
    if debug {
        println!("Accepted {} (session {})", peer_addr, session_id);
    }

    let (mut ws_sink, mut ws_source) = ws_stream.split();

    // Channel feeding envelopes from the router into this client's socket
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEnvelope>();

    loop {
        tokio::select! {
            incoming = ws_source.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        route_envelope(text.as_str(), session_id, &tx, &router, peer_addr).await;
                    }
                    Some(Ok(Message::Binary(data))) => {
                        // Some client libraries put JSON in binary frames
                        match std::str::from_utf8(&data) {
                            Ok(text) => {
                                route_envelope(text, session_id, &tx, &router, peer_addr).await;
                            }
                            Err(_) => {
                                eprintln!("{}{}: non-UTF-8 binary frame", ERR_PARSE_ENVELOPE, peer_addr);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                        // Pings are answered by tungstenite itself
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(e)) => {
                        // Abrupt closures are common; only log in debug mode
                        if debug {
                            eprintln!("{}{}: {}", ERR_CONNECTION, peer_addr, e);
                        }
                        break;
                    }
                }
            }

            envelope = rx.recv() => {
                match envelope {
                    Some(envelope) => {
                        let json = match serde_json::to_string(&envelope) {
                            Ok(json) => json,
                            Err(e) => {
                                eprintln!("{}{}: {}", ERR_DELIVERY, session_id, e);
                                continue;
                            }
                        };
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    let _ = ws_sink.close().await;

    // Unregister and notify remaining clients; no-op if never registered
    router.handle_disconnect(session_id).await;

    if debug {
        println!("Closed {} (session {})", peer_addr, session_id);
    }

    Ok(())
}

/// Parse one text frame and hand it to the router
///
/// Malformed or oversized frames are dropped and logged; the connection
/// stays open either way.
async fn route_envelope(
    text: &str,
    session_id: u32,
    tx: &mpsc::UnboundedSender<ServerEnvelope>,
    router: &MessageRouter,
    peer_addr: SocketAddr,
) {
    if text.len() > MAX_ENVELOPE_BYTES {
        eprintln!(
            "{}{}: {} byte frame exceeds limit",
            ERR_PARSE_ENVELOPE,
            peer_addr,
            text.len()
        );
        return;
    }

    match serde_json::from_str::<ClientEnvelope>(text) {
        Ok(ClientEnvelope::Register { pseudo }) => {
            router.handle_register(session_id, pseudo, tx).await;
        }
        Ok(ClientEnvelope::Message {
            message,
            is_private,
            target_user,
        }) => {
            router
                .handle_chat_message(session_id, message, is_private, target_user)
                .await;
        }
        Err(e) => {
            eprintln!("{}{}: {}", ERR_PARSE_ENVELOPE, peer_addr, e);
        }
    }
}
