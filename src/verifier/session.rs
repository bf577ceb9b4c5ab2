use wallet_verifier_frontend::Phase;

pub use wallet_verifier_frontend::Outcome;

pub(crate) const SUCCESS_MESSAGE: &str = "✅ Verified proof";
pub(crate) const FAILURE_MESSAGE: &str = "❌ Error verifying VC";
pub(crate) const FETCH_FAILED_MESSAGE: &str = "❌ Error fetching QR code";
pub(crate) const CHANNEL_LOST_MESSAGE: &str = "❌ Connection to verifier lost";

/// State of a verification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the backend to assign a session identifier.
    Idle,
    /// Session identifier assigned, QR payload requested.
    AwaitingPayload,
    /// QR payload available, waiting for the wallet.
    AwaitingProof,
    /// The backend is verifying a proof.
    Proving,
    /// The backend reported the result of the verification.
    Terminal(Outcome),
    /// The session ended without a result.
    Aborted(AbortReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The QR payload could not be retrieved.
    FetchFailed,
    /// The session channel ended before a result was reported.
    ChannelLost,
}

impl State {
    /// No input can change the state any more.
    pub fn is_final(&self) -> bool {
        matches!(self, State::Terminal(_) | State::Aborted(_))
    }
}

impl AbortReason {
    pub(crate) fn message(self) -> &'static str {
        match self {
            AbortReason::FetchFailed => FETCH_FAILED_MESSAGE,
            AbortReason::ChannelLost => CHANNEL_LOST_MESSAGE,
        }
    }
}

impl From<State> for Phase {
    fn from(state: State) -> Self {
        match state {
            State::Idle => Phase::Idle,
            State::AwaitingPayload => Phase::AwaitingPayload,
            State::AwaitingProof => Phase::AwaitingProof,
            State::Proving => Phase::Proving,
            State::Terminal(outcome) => Phase::Complete(outcome),
            State::Aborted(reason) => Phase::Aborted {
                reason: reason.message().to_owned(),
            },
        }
    }
}
