//! The session channel: a persistent connection over which the backend assigns the session
//! identifier and pushes progress events.
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::message::{decode_frame, ChannelEvent};

pub mod memory;
pub mod websocket;

pub use websocket::WebSocketTransport;

/// A connection that yields text frames.
///
/// Implementations must be cancel safe in [FrameTransport::next_text]: dropping the returned
/// future before it completes must not lose a frame.
#[async_trait]
pub trait FrameTransport: Send {
    /// Wait for the next text frame.
    ///
    /// ## Returns
    /// `None` once the peer has closed the connection.
    async fn next_text(&mut self) -> Option<Result<String>>;

    /// Close the connection.
    async fn close(&mut self) -> Result<()>;
}

/// Decodes the frames of a [FrameTransport] into [ChannelEvents](ChannelEvent).
///
/// The event sequence is single-consumer and ends for good once the channel is closed, by either
/// side.
#[derive(Debug)]
pub struct SessionChannel<T = WebSocketTransport> {
    transport: T,
    closed: bool,
}

impl SessionChannel<WebSocketTransport> {
    /// Open the channel at `url`.
    pub async fn connect(url: &Url) -> Result<Self> {
        let transport = WebSocketTransport::connect(url).await?;
        info!(%url, "connected to session channel");
        Ok(Self::new(transport))
    }
}

impl<T: FrameTransport> SessionChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Wait for the next event.
    ///
    /// Malformed frames and frames of an unknown type are dropped. A transport error ends the
    /// sequence.
    ///
    /// ## Returns
    /// `None` once the channel is closed.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        while !self.closed {
            let text = match self.transport.next_text().await {
                Some(Ok(text)) => text,
                Some(Err(e)) => {
                    warn!("session channel failed: {e:#}");
                    self.closed = true;
                    break;
                }
                None => {
                    info!("session channel closed by peer");
                    self.closed = true;
                    break;
                }
            };

            match decode_frame(&text) {
                Ok(Some(event)) => return Some(event),
                Ok(None) => debug!(frame = %text, "ignoring frame of unknown type"),
                Err(e) => warn!(frame = %text, "dropping malformed frame: {e:#}"),
            }
        }
        None
    }

    /// Close the channel. Closing an already closed channel does nothing.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        match self.transport.close().await {
            Ok(()) => info!("session channel closed"),
            Err(e) => debug!("session channel did not close cleanly: {e:#}"),
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::{memory, *};
    use crate::core::message::{EventStatus, OriginFunction};

    #[tokio::test]
    async fn decodes_in_arrival_order() {
        let (transport, backend) = memory::pair();
        let mut channel = SessionChannel::new(transport);

        backend.send(json!({"type": "id", "id": "S1"}));
        backend.send_text("{not json");
        backend.send(json!({"type": "heartbeat"}));
        backend.send(json!({"type": "event", "event": {"fn": "getAuthQr", "status": "DONE"}}));

        assert_eq!(
            channel.next_event().await,
            Some(ChannelEvent::SessionAssigned("S1".try_into().unwrap()))
        );
        let Some(ChannelEvent::Session(event)) = channel.next_event().await else {
            panic!("expected a session event")
        };
        assert_eq!(event.origin, OriginFunction::Other("getAuthQr".into()));
        assert_eq!(event.status, EventStatus::Done);
        assert!(!channel.is_closed());
    }

    #[tokio::test]
    async fn peer_hang_up_ends_sequence() {
        let (transport, backend) = memory::pair();
        let mut channel = SessionChannel::new(transport);

        backend.send(json!({"type": "id", "id": "S1"}));
        backend.hang_up();

        assert!(channel.next_event().await.is_some());
        assert_eq!(channel.next_event().await, None);
        assert!(channel.is_closed());
        assert_eq!(channel.next_event().await, None);
    }

    #[tokio::test]
    async fn transport_error_ends_sequence() {
        let (transport, backend) = memory::pair();
        let mut channel = SessionChannel::new(transport);

        backend.fail("connection reset");
        backend.send(json!({"type": "id", "id": "S1"}));

        assert_eq!(channel.next_event().await, None);
        assert!(channel.is_closed());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (transport, backend) = memory::pair();
        let mut channel = SessionChannel::new(transport);

        channel.close().await;
        channel.close().await;
        channel.close().await;

        assert!(channel.is_closed());
        assert_eq!(backend.close_count(), 1);
        backend.send(json!({"type": "id", "id": "S1"}));
        assert_eq!(channel.next_event().await, None);
    }
}
