use crate::types::{DialogueTurn, FocusArea, Scenario};

use super::action::{Action, Effect, NextScenario};
use super::dialogue;
use super::state::{RequestKind, RequestTicket, Screen, SessionState};

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
    /// Why the action was a no-op, when it was.
    pub ignored: Option<&'static str>,
}

/// Apply `action` to `state`. A rejected action returns the state unchanged
/// with no effects.
pub fn transition(state: &SessionState, action: Action) -> Transition {
    let mut next = state.clone();
    match apply(&mut next, action) {
        Ok(effects) => Transition {
            state: next,
            effects,
            ignored: None,
        },
        Err(reason) => Transition {
            state: state.clone(),
            effects: Vec::new(),
            ignored: Some(reason),
        },
    }
}

pub(super) type Applied = Result<Vec<Effect>, &'static str>;

fn apply(s: &mut SessionState, action: Action) -> Applied {
    match action {
        Action::StartPractice => start_practice(s),
        Action::ChooseFocus(focus) => choose_focus(s, focus),
        Action::ScenarioReady { ticket, result } => scenario_ready(s, ticket, result),
        Action::SetDraft(text) => dialogue::set_draft(s, text),
        Action::AppendDraft(text) => dialogue::append_draft(s, &text),
        Action::ClearDraft => dialogue::set_draft(s, String::new()),
        Action::SubmitTurn(text) => dialogue::submit_turn(s, &text),
        Action::ClientTurnReady { ticket, result } => dialogue::client_turn_ready(s, ticket, result),
        Action::RequestSupervision => dialogue::request_supervision(s),
        Action::RequestReview => dialogue::request_review(s),
        Action::FeedbackReady { ticket, result } => dialogue::feedback_ready(s, ticket, result),
        Action::Retry => retry(s),
        Action::Next(next) => next_scenario(s, next),
        Action::Back => back(s),
        Action::ToggleLanguage => {
            s.language = s.language.toggled();
            Ok(Vec::new())
        }
        Action::SetLanguage(language) => {
            s.language = language;
            Ok(Vec::new())
        }
        Action::RecordingStarted => dialogue::recording_started(s),
        Action::RecordingFailed(message) => {
            s.recording = false;
            Ok(vec![Effect::Alert(message)])
        }
        Action::RecordingStopped { audio } => dialogue::recording_stopped(s, audio),
        Action::TranscriptionReady { ticket, result } => {
            dialogue::transcription_ready(s, ticket, result)
        }
    }
}

fn start_practice(s: &mut SessionState) -> Applied {
    if s.screen != Screen::Home {
        return Err("not on the home screen");
    }
    s.screen = Screen::SelectFocus;
    Ok(Vec::new())
}

fn choose_focus(s: &mut SessionState, focus: FocusArea) -> Applied {
    if s.screen != Screen::SelectFocus {
        return Err("focus can only be chosen on the selection screen");
    }
    if s.in_flight.is_some() {
        return Err("a scenario is already being prepared");
    }
    Ok(vec![begin_scenario(s, focus)])
}

fn begin_scenario(s: &mut SessionState, focus: FocusArea) -> Effect {
    s.focus = Some(focus);
    let ticket = s.begin(RequestKind::Scenario);
    Effect::GenerateScenario {
        ticket,
        focus,
        language: s.language,
    }
}

fn scenario_ready(
    s: &mut SessionState,
    ticket: RequestTicket,
    result: Result<Scenario, String>,
) -> Applied {
    if !s.accepts(RequestKind::Scenario, ticket) || s.screen != Screen::SelectFocus {
        return Err("stale scenario");
    }
    s.in_flight = None;
    if let Ok(scenario) = result {
        s.clear_practice();
        s.transcript.push(DialogueTurn::client(
            scenario.statement.clone(),
            Some(scenario.non_verbal_cues.clone()),
            scenario.language,
        ));
        s.scenario = Some(scenario);
        s.screen = Screen::Practice;
    }
    Ok(Vec::new())
}

fn retry(s: &mut SessionState) -> Applied {
    if s.screen != Screen::Results {
        return Err("no results to retry from");
    }
    s.feedback = None;
    s.screen = Screen::Practice;
    Ok(Vec::new())
}

fn next_scenario(s: &mut SessionState, next: NextScenario) -> Applied {
    if s.screen != Screen::Results {
        return Err("no results to move on from");
    }
    s.clear_practice();
    s.screen = Screen::SelectFocus;
    let focus = match next {
        NextScenario::Choose => return Ok(Vec::new()),
        NextScenario::Same => s.focus.unwrap_or(FocusArea::Empathy),
        NextScenario::Focus(focus) => focus,
    };
    Ok(vec![begin_scenario(s, focus)])
}

fn back(s: &mut SessionState) -> Applied {
    match s.screen {
        Screen::Home => Err("already home"),
        Screen::SelectFocus => {
            if s.in_flight.is_some() {
                return Err("a scenario is being prepared");
            }
            s.screen = Screen::Home;
            Ok(Vec::new())
        }
        Screen::Practice => {
            s.clear_practice();
            s.screen = Screen::SelectFocus;
            Ok(Vec::new())
        }
        Screen::Results => {
            s.feedback = None;
            s.screen = Screen::Practice;
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::gateway::scripted::sample_scenario;
    use crate::session::state::SessionSettings;
    use crate::types::{Feedback, Language, Role};

    pub fn fresh() -> SessionState {
        SessionState::new(Language::En, SessionSettings::default())
    }

    pub fn apply_ok(state: &SessionState, action: Action) -> Transition {
        let t = transition(state, action);
        assert_eq!(t.ignored, None, "action unexpectedly ignored");
        t
    }

    pub fn scenario_ticket(effects: &[Effect]) -> RequestTicket {
        match effects {
            [Effect::GenerateScenario { ticket, .. }] => *ticket,
            other => panic!("expected a scenario request, got {other:?}"),
        }
    }

    /// A state on the practice screen with the opening turn seeded.
    pub fn practicing(focus: FocusArea) -> SessionState {
        let s = apply_ok(&fresh(), Action::StartPractice).state;
        let t = apply_ok(&s, Action::ChooseFocus(focus));
        let ticket = scenario_ticket(&t.effects);
        apply_ok(
            &t.state,
            Action::ScenarioReady {
                ticket,
                result: Ok(sample_scenario(focus, Language::En)),
            },
        )
        .state
    }

    pub fn with_results(focus: FocusArea) -> SessionState {
        let mut s = practicing(focus);
        s.screen = Screen::Results;
        s.feedback = Some(Feedback::default());
        s
    }

    #[test]
    fn home_to_select_focus_has_no_effects() {
        let t = apply_ok(&fresh(), Action::StartPractice);
        assert_eq!(t.state.screen, Screen::SelectFocus);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn choosing_focus_requests_a_scenario_and_waits() {
        let s = apply_ok(&fresh(), Action::StartPractice).state;
        let t = apply_ok(&s, Action::ChooseFocus(FocusArea::Summarizing));
        assert_eq!(t.state.screen, Screen::SelectFocus);
        assert!(t.state.is_loading());
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::GenerateScenario {
                focus: FocusArea::Summarizing,
                language: Language::En,
                ..
            }]
        ));

        let again = transition(&t.state, Action::ChooseFocus(FocusArea::Empathy));
        assert!(again.ignored.is_some());
        assert!(again.effects.is_empty());
    }

    #[test]
    fn every_focus_area_seeds_transcript_with_client_statement() {
        for focus in FocusArea::ALL {
            let s = practicing(focus);
            let scenario = s.scenario.as_ref().unwrap();
            assert_eq!(s.screen, Screen::Practice);
            assert_eq!(s.transcript.len(), 1);
            let first = &s.transcript[0];
            assert_eq!(first.role, Role::Client);
            assert_eq!(first.text, scenario.statement);
            assert_eq!(first.non_verbal.as_deref(), Some(scenario.non_verbal_cues.as_str()));
            assert!(s.in_flight.is_none());
        }
    }

    #[test]
    fn failed_scenario_stays_on_selection() {
        let s = apply_ok(&fresh(), Action::StartPractice).state;
        let t = apply_ok(&s, Action::ChooseFocus(FocusArea::Empathy));
        let ticket = scenario_ticket(&t.effects);
        let t = apply_ok(
            &t.state,
            Action::ScenarioReady {
                ticket,
                result: Err("boom".into()),
            },
        );
        assert_eq!(t.state.screen, Screen::SelectFocus);
        assert!(t.state.scenario.is_none());
        assert!(t.state.transcript.is_empty());
        assert!(!t.state.is_loading());
        assert!(t.effects.is_empty());
    }

    #[test]
    fn scenario_with_wrong_ticket_is_discarded() {
        let s = apply_ok(&fresh(), Action::StartPractice).state;
        let t = apply_ok(&s, Action::ChooseFocus(FocusArea::Empathy));
        let stale = transition(
            &t.state,
            Action::ScenarioReady {
                ticket: RequestTicket(999),
                result: Ok(sample_scenario(FocusArea::Empathy, Language::En)),
            },
        );
        assert_eq!(stale.ignored, Some("stale scenario"));
        assert_eq!(stale.state, t.state);
    }

    #[test]
    fn retry_keeps_scenario_and_transcript() {
        let s = with_results(FocusArea::Empathy);
        let transcript = s.transcript.clone();
        let t = apply_ok(&s, Action::Retry);
        assert_eq!(t.state.screen, Screen::Practice);
        assert!(t.state.feedback.is_none());
        assert!(t.state.scenario.is_some());
        assert_eq!(t.state.transcript, transcript);
    }

    #[test]
    fn next_clears_and_optionally_restarts() {
        let s = with_results(FocusArea::Genuineness);

        let t = apply_ok(&s, Action::Next(NextScenario::Choose));
        assert_eq!(t.state.screen, Screen::SelectFocus);
        assert!(t.state.scenario.is_none());
        assert!(t.state.transcript.is_empty());
        assert!(t.state.feedback.is_none());
        assert!(t.effects.is_empty());

        let t = apply_ok(&s, Action::Next(NextScenario::Same));
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::GenerateScenario {
                focus: FocusArea::Genuineness,
                ..
            }]
        ));
        assert!(t.state.is_loading());

        let t = apply_ok(&s, Action::Next(NextScenario::Focus(FocusArea::GoalSetting)));
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::GenerateScenario {
                focus: FocusArea::GoalSetting,
                ..
            }]
        ));
        assert_eq!(t.state.focus, Some(FocusArea::GoalSetting));
    }

    #[test]
    fn back_navigation() {
        let results = with_results(FocusArea::Empathy);
        let t = apply_ok(&results, Action::Back);
        assert_eq!(t.state.screen, Screen::Practice);
        assert!(t.state.feedback.is_none());

        let t = apply_ok(&t.state, Action::Back);
        assert_eq!(t.state.screen, Screen::SelectFocus);
        assert!(t.state.scenario.is_none());
        assert!(t.state.transcript.is_empty());

        let t = apply_ok(&t.state, Action::Back);
        assert_eq!(t.state.screen, Screen::Home);
        assert!(transition(&t.state, Action::Back).ignored.is_some());
    }

    #[test]
    fn back_from_practice_abandons_in_flight_reply() {
        let s = practicing(FocusArea::Empathy);
        let t = apply_ok(&s, Action::SubmitTurn("How are you feeling?".into()));
        let ticket = t.state.in_flight.unwrap().ticket;
        let t = apply_ok(&t.state, Action::Back);
        assert!(t.state.in_flight.is_none());

        let late = transition(
            &t.state,
            Action::ClientTurnReady {
                ticket,
                result: Ok(Default::default()),
            },
        );
        assert!(late.ignored.is_some());
        assert!(late.state.transcript.is_empty());
    }

    #[test]
    fn language_toggle_never_moves_screens() {
        for s in [fresh(), practicing(FocusArea::Empathy), with_results(FocusArea::Empathy)] {
            let t = apply_ok(&s, Action::ToggleLanguage);
            assert_eq!(t.state.screen, s.screen);
            assert_eq!(t.state.language, Language::Zh);
            assert_eq!(t.state.transcript, s.transcript);
            let t = apply_ok(&t.state, Action::SetLanguage(Language::En));
            assert_eq!(t.state.language, Language::En);
        }
    }

    #[test]
    fn microphone_failure_raises_alert() {
        let s = practicing(FocusArea::Empathy);
        let t = apply_ok(&s, Action::RecordingFailed("Mic error: denied".into()));
        assert!(!t.state.recording);
        assert_eq!(t.effects, vec![Effect::Alert("Mic error: denied".into())]);
    }
}
