use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// How long the success message is shown before the result is reported.
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_secs(2);

/// Where the verification backend lives.
///
/// ```json
/// {
///   "public_base": "https://verifier.example.com",
///   "local_base": "http://localhost:8080",
///   "channel": "ws://localhost:8080/ws"
/// }
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Backend used when the application itself is served over TLS.
    pub public_base: BaseUrl,
    /// Backend used during local development.
    pub local_base: BaseUrl,
    /// Address of the session channel.
    pub channel: Url,
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,
}

fn default_success_delay_ms() -> u64 {
    DEFAULT_SUCCESS_DELAY.as_millis() as u64
}

impl Config {
    /// A configuration that uses the same backend in every environment.
    pub fn new(base: BaseUrl, channel: Url) -> Self {
        Self {
            public_base: base.clone(),
            local_base: base,
            channel,
            success_delay_ms: default_success_delay_ms(),
        }
    }

    /// Select the backend for the environment the application is served from.
    pub fn base(&self, secure: bool) -> &BaseUrl {
        if secure {
            &self.public_base
        } else {
            &self.local_base
        }
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }
}

/// A url that is always a base (can be safely join()'ed with further path elements without
/// mangling).
#[derive(Deserialize, Debug, Clone, Hash, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct BaseUrl(Url);

impl std::ops::Deref for BaseUrl {
    type Target = Url;

    fn deref(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = url::ParseError;

    fn try_from(mut url: String) -> Result<Self, Self::Error> {
        // Make URL a base.
        if !url.ends_with('/') {
            url += "/"
        }
        url.parse().map(Self)
    }
}

impl TryFrom<&str> for BaseUrl {
    type Error = url::ParseError;

    fn try_from(url: &str) -> Result<Self, Self::Error> {
        url.to_owned().try_into()
    }
}
