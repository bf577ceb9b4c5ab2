use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use tokio::{
    sync::watch,
    time::{sleep, Sleep},
};
use tracing::{info, warn};
use wallet_verifier_frontend::Snapshot;

use crate::{
    channel::{FrameTransport, SessionChannel, WebSocketTransport},
    config::Config,
    core::{
        message::ChannelEvent,
        mode::ProofMode,
        payload::QrPayload,
        util::{AsyncHttpClient, ReqwestClient},
    },
    fetcher::PayloadFetcher,
};

use machine::{Effect, Input, Machine};
use reporter::ResultReporter;
use session::{AbortReason, State};

pub mod machine;
pub mod reporter;
pub mod session;

type PendingFetch = Pin<Box<dyn Future<Output = Result<QrPayload>> + Send>>;

/// Why a session ended without a verification result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The QR payload could not be retrieved. The session cannot continue.
    #[error("failed to fetch the QR payload: {0:#}")]
    Fetch(anyhow::Error),
    /// The session channel ended before the backend reported a result.
    #[error("session channel closed before a verification result was received")]
    ChannelClosed,
}

/// One verification attempt.
///
/// Owns the session channel for its whole life. A new attempt needs a new session.
pub struct VerificationSession<T = WebSocketTransport> {
    channel: SessionChannel<T>,
    fetcher: PayloadFetcher,
    machine: Machine,
    reporter: ResultReporter,
    issuer_or_how_to_link: Option<String>,
    snapshot: watch::Sender<Snapshot>,
}

impl VerificationSession {
    /// Build a new verification session.
    pub fn builder() -> VerificationSessionBuilder {
        VerificationSessionBuilder::default()
    }
}

impl<T: FrameTransport> VerificationSession<T> {
    /// Observe the session, e.g. to draw the QR code.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub fn state(&self) -> State {
        self.machine.state()
    }

    /// Drive the session until the backend reports the verification result.
    ///
    /// The callback given to [VerificationSessionBuilder::on_verification_result] is invoked
    /// exactly once before this returns `Ok`. A successful result is reported after the configured
    /// delay, so the user can see the confirmation.
    ///
    /// ## Returns
    /// The reported result.
    ///
    /// # Errors
    /// Returns an error, without invoking the callback, if the QR payload could not be fetched or
    /// the channel ended first.
    pub async fn run(mut self) -> Result<bool, Error> {
        let mut fetch: Option<PendingFetch> = None;
        let mut report_timer: Option<Pin<Box<Sleep>>> = None;
        let mut fetch_error = None;

        loop {
            let input = tokio::select! {
                event = self.channel.next_event(), if !self.channel.is_closed() => match event {
                    Some(ChannelEvent::SessionAssigned(id)) => Input::SessionAssigned(id),
                    Some(ChannelEvent::Session(event)) => Input::Channel(event),
                    None => Input::ChannelClosed,
                },
                result = pending_or(fetch.as_mut()), if fetch.is_some() => {
                    fetch = None;
                    match result {
                        Ok(payload) => Input::PayloadReady(payload),
                        Err(e) => {
                            warn!("failed to fetch QR payload: {e:#}");
                            fetch_error = Some(e);
                            Input::PayloadFailed
                        }
                    }
                }
                () = pending_or(report_timer.as_mut()), if report_timer.is_some() => {
                    report_timer = None;
                    Input::TimerFired
                }
                else => Input::ChannelClosed,
            };

            for effect in self.machine.apply(input) {
                match effect {
                    Effect::FetchPayload { mode, session_id } => {
                        info!(%session_id, %mode, "session assigned");
                        let fetcher = self.fetcher.clone();
                        fetch = Some(Box::pin(async move {
                            fetcher.fetch_payload(&mode, &session_id).await
                        }));
                    }
                    Effect::CloseChannel => self.channel.close().await,
                    Effect::ScheduleReport(delay) => report_timer = Some(Box::pin(sleep(delay))),
                    Effect::Report(verified) => {
                        self.reporter.report(verified);
                    }
                }
            }
            self.publish();

            match self.machine.state() {
                State::Terminal(outcome) if self.reporter.has_reported() => {
                    self.channel.close().await;
                    return Ok(outcome.verified());
                }
                State::Aborted(AbortReason::FetchFailed) => {
                    self.channel.close().await;
                    let cause = fetch_error
                        .take()
                        .unwrap_or_else(|| anyhow!("QR payload request failed"));
                    return Err(Error::Fetch(cause));
                }
                State::Aborted(AbortReason::ChannelLost) => {
                    return Err(Error::ChannelClosed);
                }
                _ => {}
            }
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(snapshot(
            &self.machine,
            self.issuer_or_how_to_link.as_deref(),
        ));
    }
}

/// Await `future`, or never complete if there is none.
async fn pending_or<F: Future + Unpin>(future: Option<&mut F>) -> F::Output {
    match future {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

fn snapshot(machine: &Machine, issuer_or_how_to_link: Option<&str>) -> Snapshot {
    let qr_code = machine.displayable_payload().and_then(|payload| {
        payload
            .to_qr_string()
            .map_err(|e| warn!("failed to render QR payload: {e:#}"))
            .ok()
    });

    Snapshot {
        phase: machine.state().into(),
        session_id: machine.session_id().map(ToString::to_string),
        message: machine.message().map(ToOwned::to_owned),
        qr_code,
        payload: machine.payload().map(QrPayload::summary),
        credential_type: machine.mode().to_string(),
        issuer_or_how_to_link: issuer_or_how_to_link.map(ToOwned::to_owned),
    }
}

/// Builder struct for [VerificationSession].
#[derive(Default)]
pub struct VerificationSessionBuilder {
    config: Option<Config>,
    secure: bool,
    mode: Option<ProofMode>,
    issuer_or_how_to_link: Option<String>,
    http_client: Option<Arc<dyn AsyncHttpClient + Send + Sync>>,
    reporter: Option<ResultReporter>,
}

struct Parts {
    config: Config,
    fetcher: PayloadFetcher,
    machine: Machine,
    reporter: ResultReporter,
    issuer_or_how_to_link: Option<String>,
}

impl VerificationSessionBuilder {
    /// Connect to the session channel named in the [Config] and build the session.
    pub async fn connect(self) -> Result<VerificationSession<WebSocketTransport>> {
        let parts = self.into_parts()?;
        let channel = SessionChannel::connect(&parts.config.channel)
            .await
            .context("failed to open session channel")?;
        Ok(parts.into_session(channel))
    }

    /// Build the session over an already established transport.
    pub fn build<T: FrameTransport>(self, transport: T) -> Result<VerificationSession<T>> {
        Ok(self.into_parts()?.into_session(SessionChannel::new(transport)))
    }

    fn into_parts(self) -> Result<Parts> {
        let Self {
            config,
            secure,
            mode,
            issuer_or_how_to_link,
            http_client,
            reporter,
        } = self;

        let Some(config) = config else {
            bail!("config is required, see `with_config`")
        };

        let Some(mode) = mode else {
            bail!("credential type is required, see `with_credential_type`")
        };

        let Some(reporter) = reporter else {
            bail!("result callback is required, see `on_verification_result`")
        };

        let http_client = match http_client {
            Some(http_client) => http_client,
            None => Arc::new(ReqwestClient::new()?),
        };

        Ok(Parts {
            fetcher: PayloadFetcher::new(config.base(secure).clone(), http_client),
            machine: Machine::new(mode, config.success_delay()),
            config,
            reporter,
            issuer_or_how_to_link,
        })
    }

    /// Set the backend addresses and timings.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Whether the application is served over TLS, selecting the public backend.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set what the wallet is asked to prove, `Authorization` for a login.
    pub fn with_credential_type(mut self, mode: impl Into<ProofMode>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Set a link where the user can obtain the requested credential. Only surfaced in the
    /// session [Snapshot].
    pub fn with_issuer_or_how_to_link(mut self, link: impl Into<String>) -> Self {
        self.issuer_or_how_to_link = Some(link.into());
        self
    }

    /// Override the HTTP client used to fetch the QR payload.
    pub fn with_http_client(
        mut self,
        http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
    ) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Set the callback receiving the verification result.
    pub fn on_verification_result(
        mut self,
        callback: impl FnOnce(bool) + Send + 'static,
    ) -> Self {
        self.reporter = Some(ResultReporter::new(callback));
        self
    }
}

impl Parts {
    fn into_session<T: FrameTransport>(
        self,
        channel: SessionChannel<T>,
    ) -> VerificationSession<T> {
        let Self {
            config: _,
            fetcher,
            machine,
            reporter,
            issuer_or_how_to_link,
        } = self;

        let (snapshot, _) = watch::channel(snapshot(&machine, issuer_or_how_to_link.as_deref()));
        VerificationSession {
            channel,
            fetcher,
            machine,
            reporter,
            issuer_or_how_to_link,
            snapshot,
        }
    }
}
