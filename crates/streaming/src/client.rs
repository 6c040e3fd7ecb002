//! WebSocket client for the marker feed.
//!
//! One long-lived task owns the socket. It never touches scene state: every
//! state change and decoded message is posted to the owner's event bus.

use std::fmt;

use futures_util::StreamExt;
use runtime::EventSender;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

use crate::connection::{ConnectionState, ReconnectPolicy};
use crate::protocol::ServerMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    State(ConnectionState),
    Message(ServerMessage),
}

#[derive(Debug)]
pub enum SocketError {
    Connect(tungstenite::Error),
    Read(tungstenite::Error),
    Decode(serde_json::Error),
}

impl fmt::Display for SocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketError::Connect(e) => write!(f, "connect failed: {e}"),
            SocketError::Read(e) => write!(f, "read failed: {e}"),
            SocketError::Decode(e) => write!(f, "bad marker message: {e}"),
        }
    }
}

impl std::error::Error for SocketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SocketError::Connect(e) | SocketError::Read(e) => Some(e),
            SocketError::Decode(e) => Some(e),
        }
    }
}

/// How a single connected session ended.
enum SessionEnd {
    Dropped,
    OwnerGone,
}

/// Keeps a marker socket open for as long as `events` has a receiver.
///
/// Each attempt posts `Connecting`, then `Connected` on success. When the
/// connection fails or drops, `Disconnected` is posted and the next attempt
/// starts after the policy delay. Frames that do not decode are skipped.
pub async fn run_marker_socket<E>(url: String, policy: ReconnectPolicy, events: EventSender<E>)
where
    E: From<SocketEvent>,
{
    loop {
        if !emit(&events, SocketEvent::State(ConnectionState::Connecting)) {
            break;
        }
        match connect_async(url.as_str()).await {
            Ok((mut stream, _response)) => {
                info!(%url, "marker socket connected");
                if !emit(&events, SocketEvent::State(ConnectionState::Connected)) {
                    break;
                }
                let end = loop {
                    tokio::select! {
                        _ = events.closed() => break SessionEnd::OwnerGone,
                        frame = stream.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                match decode(&text) {
                                    Ok(msg) => {
                                        debug!(kind = msg.kind(), "marker message");
                                        if !emit(&events, SocketEvent::Message(msg)) {
                                            break SessionEnd::OwnerGone;
                                        }
                                    }
                                    Err(err) => warn!(%err, "skipping marker frame"),
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => break SessionEnd::Dropped,
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                warn!(err = %SocketError::Read(err), "marker socket dropped");
                                break SessionEnd::Dropped;
                            }
                        },
                    }
                };
                if let SessionEnd::OwnerGone = end {
                    break;
                }
            }
            Err(err) => {
                warn!(%url, err = %SocketError::Connect(err), "marker socket connect failed");
            }
        }
        if !emit(&events, SocketEvent::State(ConnectionState::Disconnected)) {
            break;
        }
        debug!(delay = ?policy.delay, "reconnecting marker socket");
        tokio::select! {
            _ = events.closed() => break,
            _ = tokio::time::sleep(policy.delay) => {}
        }
    }
    debug!(%url, "marker socket task exiting");
}

fn decode(text: &str) -> Result<ServerMessage, SocketError> {
    ServerMessage::from_json(text).map_err(SocketError::Decode)
}

fn emit<E: From<SocketEvent>>(events: &EventSender<E>, event: SocketEvent) -> bool {
    events.emit(E::from(event))
}
