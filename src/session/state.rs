use serde::{Deserialize, Serialize};

use crate::types::{DialogueTurn, Feedback, FocusArea, Language, Scenario};

/// Dialogue evaluation needs the opening statement plus at least one reply.
pub const MIN_SUPERVISION_TURNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    SelectFocus,
    Practice,
    Results,
}

/// Identity of one issued gateway request. Completions carrying any other
/// ticket are stale and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Scenario,
    ClientTurn,
    Evaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub kind: RequestKind,
    pub ticket: RequestTicket,
}

/// What happens to the counselor's turn when the simulated reply fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedTurnPolicy {
    /// Leave the counselor turn in the transcript.
    #[default]
    Keep,
    /// Remove it and put its text back into the draft.
    RollBack,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub min_audio_bytes: usize,
    pub failed_turn_policy: FailedTurnPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            min_audio_bytes: 1000,
            failed_turn_policy: FailedTurnPolicy::Keep,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub screen: Screen,
    pub language: Language,
    pub focus: Option<FocusArea>,
    pub scenario: Option<Scenario>,
    pub transcript: Vec<DialogueTurn>,
    /// Pending counselor input, typed or transcribed.
    pub draft: String,
    pub feedback: Option<Feedback>,
    /// The single outstanding scenario, client-turn or evaluation request.
    pub in_flight: Option<InFlight>,
    pub recording: bool,
    pub transcribing: Option<RequestTicket>,
    pub settings: SessionSettings,
    next_ticket: u64,
}

impl SessionState {
    pub fn new(language: Language, settings: SessionSettings) -> Self {
        Self {
            screen: Screen::Home,
            language,
            focus: None,
            scenario: None,
            transcript: Vec::new(),
            draft: String::new(),
            feedback: None,
            in_flight: None,
            recording: false,
            transcribing: None,
            settings,
            next_ticket: 1,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn awaiting_reply(&self) -> bool {
        matches!(
            self.in_flight,
            Some(InFlight {
                kind: RequestKind::ClientTurn,
                ..
            })
        )
    }

    pub fn can_request_supervision(&self) -> bool {
        self.screen == Screen::Practice
            && self.scenario.is_some()
            && self.transcript.len() >= MIN_SUPERVISION_TURNS
            && self.in_flight.is_none()
    }

    pub(super) fn issue_ticket(&mut self) -> RequestTicket {
        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    pub(super) fn begin(&mut self, kind: RequestKind) -> RequestTicket {
        let ticket = self.issue_ticket();
        self.in_flight = Some(InFlight { kind, ticket });
        ticket
    }

    pub(super) fn accepts(&self, kind: RequestKind, ticket: RequestTicket) -> bool {
        self.in_flight == Some(InFlight { kind, ticket })
    }

    /// Drop everything tied to the current scenario.
    pub(super) fn clear_practice(&mut self) {
        self.scenario = None;
        self.transcript.clear();
        self.draft.clear();
        self.feedback = None;
        self.in_flight = None;
        self.recording = false;
        self.transcribing = None;
    }
}
