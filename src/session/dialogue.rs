use crate::types::{ClientReply, DialogueTurn, EvaluationSubject, Feedback, Role};

use super::action::Effect;
use super::state::{FailedTurnPolicy, RequestKind, RequestTicket, Screen, SessionState};
use super::transition::Applied;

const RECORDING_MIME_TYPE: &str = "audio/wav";

pub(super) fn set_draft(s: &mut SessionState, text: String) -> Applied {
    if s.screen != Screen::Practice {
        return Err("no response area outside practice");
    }
    s.draft = text;
    Ok(Vec::new())
}

/// Append with a single separating space, the way dictated text is added.
pub(super) fn append_draft(s: &mut SessionState, text: &str) -> Applied {
    if s.screen != Screen::Practice {
        return Err("no response area outside practice");
    }
    if text.trim().is_empty() {
        return Err("nothing to append");
    }
    push_draft(s, text);
    Ok(Vec::new())
}

pub(super) fn submit_turn(s: &mut SessionState, text: &str) -> Applied {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty turn");
    }
    if s.screen != Screen::Practice {
        return Err("turns can only be submitted during practice");
    }
    let Some(scenario) = s.scenario.clone() else {
        return Err("no active scenario");
    };
    if s.in_flight.is_some() {
        return Err("a request is already in flight");
    }

    s.transcript.push(DialogueTurn::counselor(text, s.language));
    s.draft.clear();
    let ticket = s.begin(RequestKind::ClientTurn);
    Ok(vec![Effect::RequestClientTurn {
        ticket,
        scenario,
        transcript: s.transcript.clone(),
        language: s.language,
    }])
}

pub(super) fn client_turn_ready(
    s: &mut SessionState,
    ticket: RequestTicket,
    result: Result<ClientReply, String>,
) -> Applied {
    if !s.accepts(RequestKind::ClientTurn, ticket) {
        return Err("stale client turn");
    }
    s.in_flight = None;

    match result {
        Ok(reply) if !reply.text.trim().is_empty() => {
            s.transcript.push(DialogueTurn::client(
                reply.text.trim(),
                reply.non_verbal,
                s.language,
            ));
        }
        _ => roll_back_if_configured(s),
    }
    Ok(Vec::new())
}

fn roll_back_if_configured(s: &mut SessionState) {
    if s.settings.failed_turn_policy != FailedTurnPolicy::RollBack {
        return;
    }
    let last_is_counselor = s
        .transcript
        .last()
        .is_some_and(|turn| turn.role == Role::Counselor);
    if !last_is_counselor {
        return;
    }
    if let Some(turn) = s.transcript.pop() {
        s.draft = if s.draft.trim().is_empty() {
            turn.text
        } else {
            format!("{} {}", turn.text, s.draft)
        };
    }
}

pub(super) fn request_supervision(s: &mut SessionState) -> Applied {
    if !s.can_request_supervision() {
        return Err("supervision needs an idle practice session with at least two turns");
    }
    let Some(scenario) = s.scenario.clone() else {
        return Err("no active scenario");
    };
    let ticket = s.begin(RequestKind::Evaluation);
    Ok(vec![Effect::Evaluate {
        ticket,
        scenario,
        subject: EvaluationSubject::Dialogue(s.transcript.clone()),
        language: s.language,
    }])
}

pub(super) fn request_review(s: &mut SessionState) -> Applied {
    if s.screen != Screen::Practice || s.in_flight.is_some() {
        return Err("review needs an idle practice session");
    }
    let Some(scenario) = s.scenario.clone() else {
        return Err("no active scenario");
    };
    let response = s.draft.trim().to_string();
    if response.is_empty() {
        return Err("nothing to review");
    }
    let ticket = s.begin(RequestKind::Evaluation);
    Ok(vec![Effect::Evaluate {
        ticket,
        scenario,
        subject: EvaluationSubject::Response(response),
        language: s.language,
    }])
}

pub(super) fn feedback_ready(
    s: &mut SessionState,
    ticket: RequestTicket,
    result: Result<Feedback, String>,
) -> Applied {
    if !s.accepts(RequestKind::Evaluation, ticket) || s.screen != Screen::Practice {
        return Err("stale feedback");
    }
    s.in_flight = None;
    if let Ok(feedback) = result {
        s.feedback = Some(feedback);
        s.screen = Screen::Results;
    }
    Ok(Vec::new())
}

pub(super) fn recording_started(s: &mut SessionState) -> Applied {
    if s.screen != Screen::Practice {
        return Err("recording is only available during practice");
    }
    if s.recording {
        return Err("already recording");
    }
    if s.transcribing.is_some() {
        return Err("the previous recording is still being transcribed");
    }
    s.recording = true;
    Ok(Vec::new())
}

pub(super) fn recording_stopped(s: &mut SessionState, audio: Vec<u8>) -> Applied {
    if !s.recording {
        return Err("not recording");
    }
    s.recording = false;
    if audio.len() <= s.settings.min_audio_bytes {
        return Ok(Vec::new());
    }
    if s.transcribing.is_some() {
        return Ok(vec![Effect::Alert(
            "Recording discarded: the previous one is still being transcribed.".into(),
        )]);
    }
    let ticket = s.issue_ticket();
    s.transcribing = Some(ticket);
    Ok(vec![Effect::Transcribe {
        ticket,
        audio,
        mime_type: RECORDING_MIME_TYPE,
        language: s.language,
    }])
}

pub(super) fn transcription_ready(
    s: &mut SessionState,
    ticket: RequestTicket,
    result: Result<String, String>,
) -> Applied {
    if s.transcribing != Some(ticket) {
        return Err("stale transcription");
    }
    s.transcribing = None;
    if let Ok(text) = result {
        // Results keeps the draft for `Retry`, so dictation finished there survives.
        if matches!(s.screen, Screen::Practice | Screen::Results) {
            push_draft(s, &text);
        }
    }
    Ok(Vec::new())
}

fn push_draft(s: &mut SessionState, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !s.draft.is_empty() {
        s.draft.push(' ');
    }
    s.draft.push_str(text);
}
