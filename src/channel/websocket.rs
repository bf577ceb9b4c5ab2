use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;
use url::Url;

use super::FrameTransport;

/// A [FrameTransport] over a WebSocket connection.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    pub async fn connect(url: &Url) -> Result<Self> {
        let (stream, _response) = connect_async(url.as_str())
            .await
            .with_context(|| format!("failed to connect to session channel at {url}"))?;
        Ok(Self { stream })
    }
}

#[async_trait]
impl FrameTransport for WebSocketTransport {
    async fn next_text(&mut self) -> Option<Result<String>> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "received close frame");
                    return None;
                }
                Ok(Message::Binary(_)) => debug!("ignoring binary frame"),
                // Pings are answered by tungstenite.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(tungstenite::Error::ConnectionClosed) => return None,
                Err(e) => return Some(Err(e).context("failed to read from session channel")),
            }
        }
        None
    }

    async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(e).context("failed to close session channel"),
        }
    }
}
