//! An in-process [FrameTransport], for tests and for embedding the session in an application that
//! already owns the connection to the backend.
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value as Json;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::FrameTransport;

#[derive(Debug)]
enum Inbound {
    Text(String),
    Error(String),
    HangUp,
}

/// Receiving half, owned by the [SessionChannel](super::SessionChannel).
#[derive(Debug)]
pub struct MemoryTransport {
    inbound: UnboundedReceiver<Inbound>,
    closes: Arc<AtomicUsize>,
    done: bool,
}

/// Sending half, standing in for the backend.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    outbound: UnboundedSender<Inbound>,
    closes: Arc<AtomicUsize>,
}

/// Create a connected transport and backend.
pub fn pair() -> (MemoryTransport, MemoryBackend) {
    let (outbound, inbound) = unbounded_channel();
    let closes = Arc::new(AtomicUsize::new(0));
    (
        MemoryTransport {
            inbound,
            closes: closes.clone(),
            done: false,
        },
        MemoryBackend { outbound, closes },
    )
}

impl MemoryBackend {
    /// Push a JSON frame.
    pub fn send(&self, frame: Json) {
        self.send_text(frame.to_string())
    }

    /// Push a raw text frame.
    pub fn send_text(&self, text: impl Into<String>) {
        // The transport may already be gone, like a real socket after close.
        let _ = self.outbound.send(Inbound::Text(text.into()));
    }

    /// Make the transport fail with `reason`.
    pub fn fail(&self, reason: impl Into<String>) {
        let _ = self.outbound.send(Inbound::Error(reason.into()));
    }

    /// Close the connection from the backend side.
    pub fn hang_up(&self) {
        let _ = self.outbound.send(Inbound::HangUp);
    }

    /// How many times the transport was closed by its owner.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameTransport for MemoryTransport {
    async fn next_text(&mut self) -> Option<Result<String>> {
        if self.done {
            return None;
        }
        match self.inbound.recv().await {
            Some(Inbound::Text(text)) => Some(Ok(text)),
            Some(Inbound::Error(reason)) => {
                self.done = true;
                Some(Err(anyhow!(reason)))
            }
            Some(Inbound::HangUp) | None => {
                self.done = true;
                None
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.done = true;
        self.inbound.close();
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
