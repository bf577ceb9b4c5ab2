use anyhow::{Context, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use wallet_verifier_frontend::PayloadSummary;

use super::object::{ParsingErrorContext, TypedParameter, UntypedObject};

/// The proof request returned by the backend for a session, encoded verbatim into the QR code
/// scanned by the wallet.
///
/// Only the members needed for display are typed; everything else is carried untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrPayload(UntypedObject);

impl QrPayload {
    /// Parse the payload from the body of a QR endpoint response.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let object: UntypedObject =
            serde_json::from_str(text).context("QR payload is not a JSON object")?;
        Ok(Self(object))
    }

    /// The serialized form that is rendered into the QR code.
    pub fn to_qr_string(&self) -> Result<String> {
        serde_json::to_string(&self.0).context("failed to serialize QR payload")
    }

    /// Message identifier, set by the backend to the session identifier.
    pub fn id(&self) -> Option<Result<MessageId>> {
        self.0.get()
    }

    pub fn thread_id(&self) -> Option<Result<ThreadId>> {
        self.0.get()
    }

    pub fn body(&self) -> Result<Body> {
        self.0.get::<Body>().parsing_error()
    }

    /// Summary of the payload for display next to the QR code.
    ///
    /// A payload without a readable `body` yields an empty summary.
    pub fn summary(&self) -> PayloadSummary {
        let Ok(body) = self.body() else {
            return PayloadSummary::default();
        };
        PayloadSummary {
            credential_type: body.credential_type().map(ToOwned::to_owned),
            message: body.message,
            reason: body.reason,
        }
    }
}

impl From<QrPayload> for Json {
    fn from(value: QrPayload) -> Self {
        value.0.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl TypedParameter for MessageId {
    const KEY: &'static str = "id";
}

impl TryFrom<Json> for MessageId {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<MessageId> for Json {
    fn from(value: MessageId) -> Self {
        value.0.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadId(pub String);

impl TypedParameter for ThreadId {
    const KEY: &'static str = "thid";
}

impl TryFrom<Json> for ThreadId {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<ThreadId> for Json {
    fn from(value: ThreadId) -> Self {
        value.0.into()
    }
}

/// The `body` of a QR payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Where the wallet submits its proof.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<Scope>,
    #[serde(flatten)]
    pub other: Map<String, Json>,
}

impl Body {
    /// Credential type requested by the first proof scope.
    pub fn credential_type(&self) -> Option<&str> {
        self.scope
            .first()?
            .query
            .as_ref()?
            .credential_type
            .as_deref()
    }
}

impl TypedParameter for Body {
    const KEY: &'static str = "body";
}

impl TryFrom<Json> for Body {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        serde_json::from_value(value).map_err(Into::into)
    }
}

impl TryFrom<Body> for Json {
    type Error = Error;

    fn try_from(value: Body) -> Result<Self, Self::Error> {
        serde_json::to_value(value).map_err(Into::into)
    }
}

/// A single proof request descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Json>,
}
