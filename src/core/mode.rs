use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const AUTHORIZATION: &str = "Authorization";

const LOGIN_QR_ENDPOINT: &str = "api/get-login-qr";
const PROOF_QR_ENDPOINT: &str = "api/get-auth-qr";

/// What the application asks the wallet to prove.
///
/// Parsed from the credential type configured by the application: `Authorization` requests a
/// login, any other value names the credential to be proven.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(into = "String", from = "String")]
pub enum ProofMode {
    Authorization,
    Credential(String),
}

impl ProofMode {
    /// Path of the QR endpoint relative to the backend base URL.
    pub fn qr_endpoint(&self) -> &'static str {
        match self {
            ProofMode::Authorization => LOGIN_QR_ENDPOINT,
            ProofMode::Credential(_) => PROOF_QR_ENDPOINT,
        }
    }
}

impl From<String> for ProofMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            AUTHORIZATION => ProofMode::Authorization,
            _ => ProofMode::Credential(s),
        }
    }
}

impl From<&str> for ProofMode {
    fn from(s: &str) -> Self {
        s.to_owned().into()
    }
}

impl FromStr for ProofMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl From<ProofMode> for String {
    fn from(mode: ProofMode) -> Self {
        match mode {
            ProofMode::Authorization => AUTHORIZATION.into(),
            ProofMode::Credential(c) => c,
        }
    }
}

impl fmt::Display for ProofMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofMode::Authorization => AUTHORIZATION,
            ProofMode::Credential(c) => c,
        }
        .fmt(f)
    }
}
