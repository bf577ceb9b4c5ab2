//! Frames pushed by the backend over the session channel.
//!
//! Every frame is a JSON object discriminated by its `type` member:
//!
//! ```json
//! {"type": "id", "id": "6f1c..."}
//! {"type": "event", "event": {"fn": "handleVerification", "status": "IN_PROGRESS"}}
//! ```
//!
//! Frames of any other type are valid but carry nothing for the verification session.
use std::fmt;

use anyhow::{bail, Context, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

const ID: &str = "id";
const EVENT: &str = "event";

const HANDLE_VERIFICATION: &str = "handleVerification";
const HANDLE_LOGIN: &str = "handleLogin";

const IN_PROGRESS: &str = "IN_PROGRESS";
const DONE: &str = "DONE";
const ERROR: &str = "ERROR";

/// Backend-assigned identifier of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = Error;

    fn try_from(id: String) -> Result<Self> {
        if id.is_empty() {
            bail!("session id must not be empty")
        }
        Ok(Self(id))
    }
}

impl TryFrom<&str> for SessionId {
    type Error = Error;

    fn try_from(id: &str) -> Result<Self> {
        id.to_owned().try_into()
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The backend handler that emitted a [SessionEvent].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(into = "String", from = "String")]
pub enum OriginFunction {
    /// Proof verification callback for credential requests.
    HandleVerification,
    /// Proof verification callback for authorization (login) requests.
    HandleLogin,
    /// Any other backend handler, e.g. the QR code endpoints.
    Other(String),
}

impl OriginFunction {
    /// Whether events from this handler drive the verification outcome.
    pub fn is_relevant(&self) -> bool {
        matches!(
            self,
            OriginFunction::HandleVerification | OriginFunction::HandleLogin
        )
    }
}

impl From<String> for OriginFunction {
    fn from(s: String) -> Self {
        match s.as_str() {
            HANDLE_VERIFICATION => OriginFunction::HandleVerification,
            HANDLE_LOGIN => OriginFunction::HandleLogin,
            _ => OriginFunction::Other(s),
        }
    }
}

impl From<OriginFunction> for String {
    fn from(f: OriginFunction) -> Self {
        match f {
            OriginFunction::HandleVerification => HANDLE_VERIFICATION.into(),
            OriginFunction::HandleLogin => HANDLE_LOGIN.into(),
            OriginFunction::Other(s) => s,
        }
    }
}

impl fmt::Display for OriginFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginFunction::HandleVerification => HANDLE_VERIFICATION,
            OriginFunction::HandleLogin => HANDLE_LOGIN,
            OriginFunction::Other(s) => s,
        }
        .fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(into = "String", from = "String")]
pub enum EventStatus {
    InProgress,
    Done,
    Error,
    /// A status this library does not know. Treated as a failure when terminal.
    Other(String),
}

impl From<String> for EventStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            IN_PROGRESS => EventStatus::InProgress,
            DONE => EventStatus::Done,
            ERROR => EventStatus::Error,
            _ => EventStatus::Other(s),
        }
    }
}

impl From<EventStatus> for String {
    fn from(s: EventStatus) -> Self {
        match s {
            EventStatus::InProgress => IN_PROGRESS.into(),
            EventStatus::Done => DONE.into(),
            EventStatus::Error => ERROR.into(),
            EventStatus::Other(s) => s,
        }
    }
}

/// A progress notification for the session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionEvent {
    #[serde(rename = "fn")]
    pub origin: OriginFunction,
    pub status: EventStatus,
    /// Handler specific payload, e.g. the verified authorization response.
    #[serde(default, skip_serializing_if = "Json::is_null")]
    pub data: Json,
}

impl SessionEvent {
    pub fn new(origin: OriginFunction, status: EventStatus) -> Self {
        Self {
            origin,
            status,
            data: Json::Null,
        }
    }
}

/// A decoded channel frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The backend assigned this connection its session identifier.
    SessionAssigned(SessionId),
    /// The backend reported progress on the session.
    Session(SessionEvent),
}

#[derive(Deserialize)]
struct IdFrame {
    id: SessionId,
}

#[derive(Deserialize)]
struct EventFrame {
    event: SessionEvent,
}

/// Decode a text frame.
///
/// ## Returns
/// - `Ok(Some(_))` for `id` and `event` frames.
/// - `Ok(None)` for well-formed frames of any other type.
///
/// # Errors
/// Returns an error if the frame is not a JSON object with a string `type`, or if an `id` or
/// `event` frame is missing its members.
pub fn decode_frame(text: &str) -> Result<Option<ChannelEvent>> {
    let frame: Json = serde_json::from_str(text).context("frame is not valid JSON")?;
    let kind = frame
        .get("type")
        .and_then(Json::as_str)
        .context("frame has no 'type'")?;

    match kind {
        ID => {
            let IdFrame { id } =
                serde_json::from_value(frame).context("malformed 'id' frame")?;
            Ok(Some(ChannelEvent::SessionAssigned(id)))
        }
        EVENT => {
            let EventFrame { event } =
                serde_json::from_value(frame).context("malformed 'event' frame")?;
            Ok(Some(ChannelEvent::Session(event)))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn id_frame() {
        let event = decode_frame(r#"{"type":"id","id":"S1"}"#).unwrap();
        assert_eq!(
            event,
            Some(ChannelEvent::SessionAssigned("S1".try_into().unwrap()))
        );
    }

    #[test]
    fn event_frame() {
        let frame = json!({
            "type": "event",
            "event": {"fn": "handleLogin", "status": "DONE", "data": {"from": "did:example:1"}}
        });
        let Some(ChannelEvent::Session(event)) = decode_frame(&frame.to_string()).unwrap() else {
            panic!("expected a session event")
        };
        assert_eq!(event.origin, OriginFunction::HandleLogin);
        assert_eq!(event.status, EventStatus::Done);
        assert_eq!(event.data["from"], "did:example:1");
    }

    #[test]
    fn id_frame_with_empty_event() {
        // The backend serializes an empty event alongside the id.
        let frame = r#"{"type":"id","id":"S2","event":{"fn":"","status":"","data":null}}"#;
        assert!(matches!(
            decode_frame(frame).unwrap(),
            Some(ChannelEvent::SessionAssigned(_))
        ));
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        assert_eq!(decode_frame(r#"{"type":"ping"}"#).unwrap(), None);
    }

    #[test]
    fn malformed_frames() {
        assert!(decode_frame("not json").is_err());
        assert!(decode_frame(r#"{"id":"S1"}"#).is_err());
        assert!(decode_frame(r#"{"type":"id"}"#).is_err());
        assert!(decode_frame(r#"{"type":"id","id":""}"#).is_err());
        assert!(decode_frame(r#"{"type":"event","event":{"fn":"handleLogin"}}"#).is_err());
    }

    #[test]
    fn relevance_and_status() {
        assert!(OriginFunction::from("handleVerification".to_owned()).is_relevant());
        assert!(!OriginFunction::from("getAuthQr".to_owned()).is_relevant());
        assert_eq!(
            EventStatus::from("REVOKED".to_owned()),
            EventStatus::Other("REVOKED".into())
        );
        assert_eq!(
            serde_json::to_value(SessionEvent::new(
                OriginFunction::HandleVerification,
                EventStatus::InProgress
            ))
            .unwrap(),
            json!({"fn": "handleVerification", "status": "IN_PROGRESS"})
        );
    }
}
