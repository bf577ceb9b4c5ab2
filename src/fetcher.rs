use std::{fmt::Debug, sync::Arc};

use anyhow::{bail, Context, Result};
use tracing::debug;
use url::Url;

use crate::{
    config::BaseUrl,
    core::{
        message::SessionId,
        mode::ProofMode,
        payload::QrPayload,
        util::{base_request, AsyncHttpClient},
    },
};

/// Retrieves the QR payload for a session from the verification backend.
#[derive(Clone)]
pub struct PayloadFetcher {
    base: BaseUrl,
    client: Arc<dyn AsyncHttpClient + Send + Sync>,
}

impl Debug for PayloadFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadFetcher")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl PayloadFetcher {
    pub fn new(base: BaseUrl, client: Arc<dyn AsyncHttpClient + Send + Sync>) -> Self {
        Self { base, client }
    }

    /// The endpoint serving the QR payload for `session_id` in the given mode.
    pub fn endpoint(&self, mode: &ProofMode, session_id: &SessionId) -> Result<Url> {
        let mut url = self
            .base
            .join(mode.qr_endpoint())
            .context("failed to construct QR endpoint")?;
        url.query_pairs_mut()
            .append_pair("sessionId", session_id.as_str());
        Ok(url)
    }

    /// Fetch the QR payload with a single request. Failures are not retried.
    pub async fn fetch_payload(
        &self,
        mode: &ProofMode,
        session_id: &SessionId,
    ) -> Result<QrPayload> {
        let url = self.endpoint(mode, session_id)?;
        debug!(%url, "fetching QR payload");

        let request = base_request()
            .method("GET")
            .uri(url.as_str())
            .body(Vec::new())
            .context("failed to construct QR payload request")?;
        let response = self
            .client
            .execute(request)
            .await
            .context("failed to make QR payload request")?;

        let status = response.status();
        let Ok(body) = String::from_utf8(response.into_body()) else {
            bail!("failed to parse QR payload response as UTF-8 (status: {status})")
        };

        if !status.is_success() {
            bail!("QR payload request was unsuccessful (status: {status}): {body}")
        }

        QrPayload::from_json_str(&body)
    }
}
