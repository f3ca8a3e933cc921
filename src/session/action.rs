use crate::types::{
    ClientReply, DialogueTurn, EvaluationSubject, Feedback, FocusArea, Language, Scenario,
};

use super::state::RequestTicket;

/// How to continue after viewing results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextScenario {
    /// Return to focus selection and wait.
    Choose,
    /// Start a new scenario for the current focus area.
    Same,
    Focus(FocusArea),
}

/// Inputs to the session state machine: user intents and gateway completions.
///
/// Completion errors are carried as strings; they have already been logged
/// where they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    StartPractice,
    ChooseFocus(FocusArea),
    ScenarioReady {
        ticket: RequestTicket,
        result: Result<Scenario, String>,
    },
    SetDraft(String),
    AppendDraft(String),
    ClearDraft,
    SubmitTurn(String),
    ClientTurnReady {
        ticket: RequestTicket,
        result: Result<ClientReply, String>,
    },
    RequestSupervision,
    /// Evaluate the current draft alone against the opening statement.
    RequestReview,
    FeedbackReady {
        ticket: RequestTicket,
        result: Result<Feedback, String>,
    },
    Retry,
    Next(NextScenario),
    Back,
    ToggleLanguage,
    SetLanguage(Language),
    RecordingStarted,
    RecordingFailed(String),
    RecordingStopped {
        audio: Vec<u8>,
    },
    TranscriptionReady {
        ticket: RequestTicket,
        result: Result<String, String>,
    },
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    GenerateScenario {
        ticket: RequestTicket,
        focus: FocusArea,
        language: Language,
    },
    RequestClientTurn {
        ticket: RequestTicket,
        scenario: Scenario,
        transcript: Vec<DialogueTurn>,
        language: Language,
    },
    Evaluate {
        ticket: RequestTicket,
        scenario: Scenario,
        subject: EvaluationSubject,
        language: Language,
    },
    Transcribe {
        ticket: RequestTicket,
        audio: Vec<u8>,
        mime_type: &'static str,
        language: Language,
    },
    /// User-facing message that needs acknowledging.
    Alert(String),
}
