use super::pipeline::dispatch;
use super::recording::{reconcile, toggle_recording};
use super::state::{AppState, BackendEvent, Flow};
use crate::session::{transition, Action, Screen, Transition};
use crate::ui::input::{self, Command};
use crate::ui::{self, render};

/// Handle one loop event. This is where user intents and gateway
/// completions enter the session state machine.
pub fn handle_backend_event(state: &mut AppState, event: BackendEvent) -> Flow {
    match event {
        BackendEvent::Input(line) => return handle_input(state, &line),
        BackendEvent::InputClosed => {
            log::info!("Input closed");
            return Flow::Quit;
        }
        BackendEvent::ScenarioGenerated { ticket, result } => {
            let error = result.as_ref().err().cloned();
            complete(state, Action::ScenarioReady { ticket, result }, error);
        }
        BackendEvent::ClientTurnGenerated { ticket, result } => {
            let error = result.as_ref().err().cloned();
            complete(state, Action::ClientTurnReady { ticket, result }, error);
        }
        BackendEvent::FeedbackGenerated { ticket, result } => {
            let error = result.as_ref().err().cloned();
            complete(state, Action::FeedbackReady { ticket, result }, error);
        }
        BackendEvent::TranscriptionComplete { ticket, result } => {
            let error = result.as_ref().err().cloned();
            complete(state, Action::TranscriptionReady { ticket, result }, error);
        }
    }
    Flow::Continue
}

fn handle_input(state: &mut AppState, line: &str) -> Flow {
    match input::parse(line, &state.session) {
        Command::Act(action) => {
            if let Some(reason) = apply(state, action) {
                ui::notice(reason);
            }
        }
        Command::ToggleRecording => toggle_recording(state),
        Command::Help => ui::help(),
        Command::Quit => return Flow::Quit,
        Command::Empty => {}
        Command::Unknown(text) => {
            ui::notice(&format!("Unknown command `{text}`. Type :help for commands."))
        }
    }
    Flow::Continue
}

fn complete(state: &mut AppState, action: Action, error: Option<String>) {
    match apply(state, action) {
        Some(reason) => log::info!("Discarding completion: {reason}"),
        None => {
            if let Some(error) = error {
                ui::alert(&error);
            }
        }
    }
}

/// Run `action` through the session, then sync resources, print what
/// changed and start any requested work. Returns the rejection reason when
/// the action was ignored.
pub(crate) fn apply(state: &mut AppState, action: Action) -> Option<&'static str> {
    let Transition {
        state: next,
        effects,
        ignored,
    } = transition(&state.session, action);
    if let Some(reason) = ignored {
        log::debug!("Ignored action: {reason}");
        return Some(reason);
    }

    let prev = std::mem::replace(&mut state.session, next);
    if prev.screen != Screen::Results && state.session.screen == Screen::Results {
        record_stats(state);
    }
    reconcile(state);

    if let Some(update) = render::render_update(&prev, &state.session, &state.stats) {
        ui::print(&update);
    }
    for effect in effects {
        dispatch(state, effect);
    }
    None
}

fn record_stats(state: &mut AppState) {
    let session = &state.session;
    if let (Some(focus), Some(feedback)) = (session.focus, &session.feedback) {
        log::info!("Session on {} scored {:.0}", focus.name(), feedback.score);
        state
            .stats
            .record_feedback(focus, session.transcript.len(), feedback);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::gateway::scripted::ScriptedGateway;
    use crate::types::{EvaluationSubject, Feedback, FocusArea, Language, Role};

    const CRISIS_LINE: &str = "I hear that you're in a lot of pain right now.";

    fn harness(
        gateway: ScriptedGateway,
    ) -> (AppState, async_channel::Receiver<BackendEvent>, Arc<ScriptedGateway>) {
        let (tx, rx) = async_channel::unbounded();
        let gateway = Arc::new(gateway);
        let state = AppState::new(Config::default(), gateway.clone(), tx);
        (state, rx, gateway)
    }

    fn type_line(state: &mut AppState, line: &str) -> Flow {
        handle_backend_event(state, BackendEvent::Input(line.into()))
    }

    async fn next_completion(state: &mut AppState, rx: &async_channel::Receiver<BackendEvent>) {
        let event = rx.recv().await.unwrap();
        assert_eq!(handle_backend_event(state, event), Flow::Continue);
    }

    async fn practicing(
        state: &mut AppState,
        rx: &async_channel::Receiver<BackendEvent>,
        focus_number: &str,
    ) {
        type_line(state, "start");
        type_line(state, focus_number);
        assert!(state.session.is_loading());
        next_completion(state, rx).await;
        assert_eq!(state.session.screen, Screen::Practice);
    }

    #[tokio::test]
    async fn crisis_intervention_dialogue_end_to_end() {
        let (mut app, rx, gateway) = harness(ScriptedGateway::default());
        practicing(&mut app, &rx, "13").await;

        let scenario = app.session.scenario.clone().unwrap();
        assert_eq!(scenario.focus_area, FocusArea::CrisisIntervention);
        assert!(!scenario.statement.is_empty());
        assert!(!scenario.non_verbal_cues.is_empty());

        gateway.push_reply("I just don't see a way out.", Some("Tears up"));
        type_line(&mut app, CRISIS_LINE);
        assert_eq!(app.session.transcript.len(), 2);
        assert!(app.session.awaiting_reply());

        next_completion(&mut app, &rx).await;
        let transcript = &app.session.transcript;
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].role, Role::Counselor);
        assert_eq!(transcript[1].text, CRISIS_LINE);
        assert_eq!(transcript[2].role, Role::Client);
        assert_eq!(transcript[2].non_verbal.as_deref(), Some("Tears up"));
        assert!(!app.session.is_loading());

        assert_eq!(
            gateway.calls().scenarios,
            vec![(FocusArea::CrisisIntervention, Language::En)]
        );
        assert_eq!(gateway.calls().client_turns, vec![(2, Language::En)]);
    }

    #[tokio::test]
    async fn reply_arriving_after_back_is_discarded() {
        let (mut app, rx, _gateway) = harness(ScriptedGateway::default());
        practicing(&mut app, &rx, "6").await;

        type_line(&mut app, "Tell me more about that.");
        type_line(&mut app, ":back");
        assert_eq!(app.session.screen, Screen::SelectFocus);

        next_completion(&mut app, &rx).await;
        assert_eq!(app.session.screen, Screen::SelectFocus);
        assert!(app.session.transcript.is_empty());
        assert!(app.session.scenario.is_none());
    }

    #[tokio::test]
    async fn supervision_records_stats_and_shows_results() {
        let (mut app, rx, gateway) = harness(ScriptedGateway::default());
        practicing(&mut app, &rx, "6").await;

        type_line(&mut app, "That sounds really heavy.");
        next_completion(&mut app, &rx).await;

        gateway.push_feedback(Feedback {
            score: 82.0,
            ..Default::default()
        });
        type_line(&mut app, ":supervise");
        next_completion(&mut app, &rx).await;

        assert_eq!(app.session.screen, Screen::Results);
        assert_eq!(app.stats.total_sessions(), 1);
        assert_eq!(app.stats.history[0].focus, FocusArea::Empathy);
        assert_eq!(app.stats.history[0].turns, 3);
        assert_eq!(app.stats.average_score(), Some(82.0));
        assert!(matches!(
            gateway.calls().evaluations.as_slice(),
            [(EvaluationSubject::Dialogue(turns), Language::En)] if turns.len() == 3
        ));

        type_line(&mut app, "retry");
        assert_eq!(app.session.screen, Screen::Practice);
        assert_eq!(app.session.transcript.len(), 3);
    }

    #[tokio::test]
    async fn failed_scenario_stays_on_selection() {
        let (mut app, rx, _gateway) = harness(ScriptedGateway {
            fail_scenarios: true,
            ..Default::default()
        });
        type_line(&mut app, "start");
        type_line(&mut app, "1");
        next_completion(&mut app, &rx).await;

        assert_eq!(app.session.screen, Screen::SelectFocus);
        assert!(app.session.scenario.is_none());
        assert!(!app.session.is_loading());
    }

    #[tokio::test]
    async fn language_toggle_while_awaiting_reply() {
        let (mut app, rx, gateway) = harness(ScriptedGateway::default());
        practicing(&mut app, &rx, "6").await;

        type_line(&mut app, "You seem tired today.");
        type_line(&mut app, ":lang");
        assert_eq!(app.session.language, Language::Zh);
        assert!(app.session.awaiting_reply());

        next_completion(&mut app, &rx).await;
        let transcript = &app.session.transcript;
        assert_eq!(transcript[1].language, Language::En);
        assert_eq!(transcript[2].language, Language::Zh);
        assert_eq!(gateway.calls().client_turns, vec![(2, Language::En)]);
    }

    #[tokio::test]
    async fn rejected_commands_leave_state_alone() {
        let (mut app, rx, gateway) = harness(ScriptedGateway::default());
        practicing(&mut app, &rx, "6").await;

        let before = app.session.clone();
        type_line(&mut app, ":supervise");
        type_line(&mut app, ":send");
        type_line(&mut app, ":nonsense");
        assert_eq!(app.session, before);
        assert!(gateway.calls().evaluations.is_empty());
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn quit_and_closed_input_stop_the_loop() {
        let (mut app, _rx, _gateway) = harness(ScriptedGateway::default());
        assert_eq!(type_line(&mut app, ":quit"), Flow::Quit);
        assert_eq!(
            handle_backend_event(&mut app, BackendEvent::InputClosed),
            Flow::Quit
        );
        assert_eq!(type_line(&mut app, ":help"), Flow::Continue);
    }
}
