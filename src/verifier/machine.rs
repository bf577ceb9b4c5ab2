use std::time::Duration;

use tracing::debug;

use crate::core::{
    message::{EventStatus, SessionEvent, SessionId},
    mode::ProofMode,
    payload::QrPayload,
};

use super::session::{AbortReason, Outcome, State, FAILURE_MESSAGE, SUCCESS_MESSAGE};

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// The channel assigned the session identifier.
    SessionAssigned(SessionId),
    /// The QR payload request succeeded.
    PayloadReady(QrPayload),
    /// The QR payload request failed.
    PayloadFailed,
    /// The channel delivered a progress event.
    Channel(SessionEvent),
    /// The channel ended.
    ChannelClosed,
    /// The delay before reporting success elapsed.
    TimerFired,
}

/// Work requested by the state machine, carried out by whoever drives it.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPayload {
        mode: ProofMode,
        session_id: SessionId,
    },
    CloseChannel,
    /// Feed [Input::TimerFired] back after the delay.
    ScheduleReport(Duration),
    Report(bool),
}

/// The verification session state machine.
///
/// Pure: it performs no I/O and never blocks, so every transition completes before the next
/// input is applied.
#[derive(Debug, Clone)]
pub struct Machine {
    mode: ProofMode,
    success_delay: Duration,
    state: State,
    session_id: Option<SessionId>,
    payload: Option<QrPayload>,
    message: Option<&'static str>,
}

impl Machine {
    pub fn new(mode: ProofMode, success_delay: Duration) -> Self {
        Self {
            mode,
            success_delay,
            state: State::Idle,
            session_id: None,
            payload: None,
            message: None,
        }
    }

    pub fn mode(&self) -> &ProofMode {
        &self.mode
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn payload(&self) -> Option<&QrPayload> {
        self.payload.as_ref()
    }

    /// Status line replacing the QR code once the session has ended.
    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            State::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// The QR payload, only while the wallet is expected to scan it.
    pub fn displayable_payload(&self) -> Option<&QrPayload> {
        match self.state {
            State::AwaitingProof => self.payload.as_ref(),
            _ => None,
        }
    }

    /// Apply an input and return the effects it requires.
    pub fn apply(&mut self, input: Input) -> Vec<Effect> {
        let before = self.state;
        let effects = match input {
            Input::SessionAssigned(session_id) => self.session_assigned(session_id),
            Input::PayloadReady(payload) => self.payload_ready(payload),
            Input::PayloadFailed => self.payload_failed(),
            Input::Channel(event) => self.session_event(event),
            Input::ChannelClosed => self.abort(AbortReason::ChannelLost),
            Input::TimerFired => self.timer_fired(),
        };
        if before != self.state {
            debug!(from = ?before, to = ?self.state, "session transition");
        }
        effects
    }

    fn session_assigned(&mut self, session_id: SessionId) -> Vec<Effect> {
        if self.state != State::Idle {
            debug!(%session_id, "ignoring session id, a session is already active");
            return vec![];
        }
        self.session_id = Some(session_id.clone());
        self.state = State::AwaitingPayload;
        vec![Effect::FetchPayload {
            mode: self.mode.clone(),
            session_id,
        }]
    }

    fn payload_ready(&mut self, payload: QrPayload) -> Vec<Effect> {
        if self.state == State::Idle || self.payload.is_some() {
            debug!("ignoring unrequested QR payload");
            return vec![];
        }
        self.payload = Some(payload);
        if self.state == State::AwaitingPayload {
            self.state = State::AwaitingProof;
        }
        vec![]
    }

    /// Only fatal while the payload is still needed to start the proof.
    fn payload_failed(&mut self) -> Vec<Effect> {
        if self.state != State::AwaitingPayload {
            debug!(state = ?self.state, "ignoring QR payload failure");
            return vec![];
        }
        self.abort(AbortReason::FetchFailed)
    }

    fn session_event(&mut self, event: SessionEvent) -> Vec<Effect> {
        if self.state.is_final() || self.state == State::Idle || !event.origin.is_relevant() {
            debug!(origin = %event.origin, state = ?self.state, "ignoring event");
            return vec![];
        }

        match event.status {
            EventStatus::InProgress => {
                self.state = State::Proving;
                vec![]
            }
            EventStatus::Done => {
                self.state = State::Terminal(Outcome::Success);
                self.message = Some(SUCCESS_MESSAGE);
                vec![
                    Effect::CloseChannel,
                    Effect::ScheduleReport(self.success_delay),
                ]
            }
            EventStatus::Error | EventStatus::Other(_) => {
                self.state = State::Terminal(Outcome::Failure);
                self.message = Some(FAILURE_MESSAGE);
                vec![Effect::Report(false), Effect::CloseChannel]
            }
        }
    }

    fn abort(&mut self, reason: AbortReason) -> Vec<Effect> {
        if self.state.is_final() {
            return vec![];
        }
        self.state = State::Aborted(reason);
        self.message = Some(reason.message());
        vec![Effect::CloseChannel]
    }

    fn timer_fired(&mut self) -> Vec<Effect> {
        if self.state != State::Terminal(Outcome::Success) {
            return vec![];
        }
        vec![Effect::Report(true)]
    }
}
