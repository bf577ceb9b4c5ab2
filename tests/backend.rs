#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use http::{Request, Response};
use serde_json::{json, Value as Json};
use tokio::sync::oneshot;
use wallet_verifier::{
    channel::memory::{self, MemoryBackend, MemoryTransport},
    config::{BaseUrl, Config},
    core::util::AsyncHttpClient,
    verifier::VerificationSession,
};

/// Serves QR payloads and records every request.
pub struct MockHttpClient {
    requests: Mutex<Vec<String>>,
    status: u16,
    body: String,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MockHttpClient {
    pub fn ok(body: Json) -> Arc<Self> {
        Arc::new(Self::new(200, body.to_string()))
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self::new(status, "session not found".into()))
    }

    /// Responds only once the returned sender fires or is dropped.
    pub fn gated(body: Json) -> (Arc<Self>, oneshot::Sender<()>) {
        Self::new(200, body.to_string()).with_gate()
    }

    /// Like [MockHttpClient::gated], but the held response is an error.
    pub fn gated_failing(status: u16) -> (Arc<Self>, oneshot::Sender<()>) {
        Self::new(status, "session not found".into()).with_gate()
    }

    fn with_gate(self) -> (Arc<Self>, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(gate);
        (Arc::new(self), release)
    }

    fn new(status: u16, body: String) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            status,
            body,
            gate: Mutex::new(None),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AsyncHttpClient for MockHttpClient {
    async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        self.requests.lock().unwrap().push(request.uri().to_string());

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        Response::builder()
            .status(self.status)
            .body(self.body.clone().into_bytes())
            .context("failed to build response")
    }
}

pub fn age_request() -> Json {
    json!({"body": {"message": "please prove age"}})
}

pub fn config() -> Config {
    Config::new(
        BaseUrl::try_from("http://localhost:8080").unwrap(),
        "ws://localhost:8080/ws".parse().unwrap(),
    )
}

/// Results delivered to the application callback.
pub type Results = Arc<Mutex<Vec<bool>>>;

pub fn session(
    credential_type: &str,
    http_client: Arc<MockHttpClient>,
) -> (VerificationSession<MemoryTransport>, MemoryBackend, Results) {
    let (transport, backend) = memory::pair();
    let results = Results::default();
    let session = VerificationSession::builder()
        .with_config(config())
        .with_credential_type(credential_type)
        .with_issuer_or_how_to_link("https://issuer.example/kyc")
        .with_http_client(http_client)
        .on_verification_result({
            let results = results.clone();
            move |verified| results.lock().unwrap().push(verified)
        })
        .build(transport)
        .unwrap();
    (session, backend, results)
}

pub fn id_frame(id: &str) -> Json {
    json!({"type": "id", "id": id})
}

pub fn event_frame(origin: &str, status: &str) -> Json {
    json!({"type": "event", "event": {"fn": origin, "status": status}})
}
