//! Verification session data structures that are needed on the frontend, without the network
//! stack that can cause compilation issues with web targets.
use serde::{Deserialize, Serialize};

/// Phase of a verification session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the backend to assign a session identifier.
    #[default]
    Idle,
    /// Session identifier assigned, the QR payload is being fetched.
    AwaitingPayload,
    /// QR payload available, waiting for the wallet to submit a proof.
    AwaitingProof,
    /// The backend is verifying a submitted proof.
    Proving,
    /// The backend has finished verifying the proof.
    Complete(Outcome),
    /// The session ended without a verification result.
    Aborted { reason: String },
}

impl Phase {
    /// Whether a progress indicator should replace the QR code.
    pub fn in_progress(&self) -> bool {
        matches!(self, Phase::Proving)
    }

    /// Whether no further updates will be published for this session.
    pub fn is_final(&self) -> bool {
        matches!(self, Phase::Complete(_) | Phase::Aborted { .. })
    }
}

/// Outcome of a verification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The proof was rejected or could not be verified.
    Failure,
    /// The proof is verified.
    Success,
}

impl Outcome {
    /// The boolean reported to the embedding application.
    pub fn verified(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl From<bool> for Outcome {
    fn from(verified: bool) -> Self {
        if verified {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// The human readable parts of a QR payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSummary {
    /// Credential type named by the first proof scope, if any.
    pub credential_type: Option<String>,
    pub message: Option<String>,
    pub reason: Option<String>,
}

/// Everything a presentation layer needs to draw the current state of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub session_id: Option<String>,
    /// Status line shown in place of the QR code once a result is known.
    pub message: Option<String>,
    /// Serialized QR payload. Only present while the wallet is expected to scan it.
    pub qr_code: Option<String>,
    pub payload: Option<PayloadSummary>,
    /// The credential type (or `Authorization`) requested by the application.
    pub credential_type: String,
    /// Opaque link where the user can obtain the requested credential.
    pub issuer_or_how_to_link: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn phase_flags() {
        assert!(Phase::Proving.in_progress());
        assert!(!Phase::AwaitingProof.in_progress());
        assert!(Phase::Complete(Outcome::Failure).is_final());
        assert!(Phase::Aborted {
            reason: "lost".into()
        }
        .is_final());
        assert!(!Phase::Idle.is_final());
    }

    #[test]
    fn outcome_from_bool() {
        assert_eq!(Outcome::from(true), Outcome::Success);
        assert!(!Outcome::from(false).verified());
    }
}
