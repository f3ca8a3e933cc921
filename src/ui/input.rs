use crate::session::{Action, NextScenario, Screen, SessionState};
use crate::types::{FocusArea, Language};

/// A parsed line of terminal input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Act(Action),
    ToggleRecording,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub const HELP: &str = "\
Anywhere:   :lang [en|zh]   :help   :quit
Home:       start
Select:     <number> | <focus name>   back
Practice:   <text> submits a turn   :send   :draft <text>   :clear
            :rec (start/stop voice)   :review   :supervise   :back
Results:    retry   next [same|<number>|<name>]   back";

/// Interpret `line` for the current screen.
pub fn parse(line: &str, session: &SessionState) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let is_command = line.starts_with(':');
    let body = line.trim_start_matches(':').trim();
    let (word, rest) = match body.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_ascii_lowercase(), rest.trim()),
        None => (body.to_ascii_lowercase(), ""),
    };

    // Free text during practice is dialogue, never a command.
    if session.screen == Screen::Practice && !is_command {
        return Command::Act(Action::SubmitTurn(line.to_string()));
    }

    match word.as_str() {
        "q" | "quit" | "exit" => return Command::Quit,
        "h" | "help" | "?" => return Command::Help,
        "lang" => {
            return match rest {
                "" => Command::Act(Action::ToggleLanguage),
                code => Language::parse(code)
                    .map(|language| Command::Act(Action::SetLanguage(language)))
                    .unwrap_or_else(|| Command::Unknown(line.to_string())),
            }
        }
        "back" => return Command::Act(Action::Back),
        _ => {}
    }

    let action = match session.screen {
        Screen::Home => match word.as_str() {
            "start" | "s" => Some(Action::StartPractice),
            _ => None,
        },
        Screen::SelectFocus => focus_choice(body).map(Action::ChooseFocus),
        Screen::Practice => match word.as_str() {
            "send" => Some(Action::SubmitTurn(session.draft.clone())),
            "draft" => Some(Action::SetDraft(rest.to_string())),
            "clear" => Some(Action::ClearDraft),
            "rec" | "record" => return Command::ToggleRecording,
            "review" => Some(Action::RequestReview),
            "supervise" | "sup" | "done" => Some(Action::RequestSupervision),
            _ => None,
        },
        Screen::Results => match word.as_str() {
            "retry" | "again" => Some(Action::Retry),
            "next" => match rest.to_ascii_lowercase().as_str() {
                "" => Some(Action::Next(NextScenario::Choose)),
                "same" => Some(Action::Next(NextScenario::Same)),
                other => focus_choice(other).map(|focus| Action::Next(NextScenario::Focus(focus))),
            },
            _ => None,
        },
    };

    action
        .map(Command::Act)
        .unwrap_or_else(|| Command::Unknown(line.to_string()))
}

/// A 1-based catalog number or a focus area name.
fn focus_choice(text: &str) -> Option<FocusArea> {
    match text.trim().parse::<usize>() {
        Ok(n) => n.checked_sub(1).and_then(|i| FocusArea::ALL.get(i).copied()),
        Err(_) => FocusArea::from_name(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionSettings;

    fn on(screen: Screen) -> SessionState {
        let mut s = SessionState::new(Language::En, SessionSettings::default());
        s.screen = screen;
        s
    }

    #[test]
    fn practice_text_is_dialogue() {
        let s = on(Screen::Practice);
        assert_eq!(
            parse("  back to what you said  ", &s),
            Command::Act(Action::SubmitTurn("back to what you said".into()))
        );
        assert_eq!(parse(":back", &s), Command::Act(Action::Back));
        assert_eq!(parse(":rec", &s), Command::ToggleRecording);
        assert_eq!(parse(":supervise", &s), Command::Act(Action::RequestSupervision));
        assert_eq!(
            parse(":draft It sounds like", &s),
            Command::Act(Action::SetDraft("It sounds like".into()))
        );
    }

    #[test]
    fn send_submits_current_draft() {
        let mut s = on(Screen::Practice);
        s.draft = "dictated words".into();
        assert_eq!(
            parse(":send", &s),
            Command::Act(Action::SubmitTurn("dictated words".into()))
        );
    }

    #[test]
    fn focus_by_number_or_name() {
        let s = on(Screen::SelectFocus);
        assert_eq!(
            parse("13", &s),
            Command::Act(Action::ChooseFocus(FocusArea::CrisisIntervention))
        );
        assert_eq!(
            parse("Crisis Intervention", &s),
            Command::Act(Action::ChooseFocus(FocusArea::CrisisIntervention))
        );
        assert!(matches!(parse("0", &s), Command::Unknown(_)));
        assert!(matches!(parse("99", &s), Command::Unknown(_)));
    }

    #[test]
    fn results_commands() {
        let s = on(Screen::Results);
        assert_eq!(parse("retry", &s), Command::Act(Action::Retry));
        assert_eq!(parse(":next", &s), Command::Act(Action::Next(NextScenario::Choose)));
        assert_eq!(parse("next same", &s), Command::Act(Action::Next(NextScenario::Same)));
        assert_eq!(
            parse("next 6", &s),
            Command::Act(Action::Next(NextScenario::Focus(FocusArea::Empathy)))
        );
    }

    #[test]
    fn global_commands() {
        let s = on(Screen::Home);
        assert_eq!(parse("start", &s), Command::Act(Action::StartPractice));
        assert_eq!(parse(":lang", &s), Command::Act(Action::ToggleLanguage));
        assert_eq!(parse(":lang zh", &s), Command::Act(Action::SetLanguage(Language::Zh)));
        assert!(matches!(parse(":lang fr", &s), Command::Unknown(_)));
        assert_eq!(parse(":quit", &s), Command::Quit);
        assert_eq!(parse("   ", &s), Command::Empty);
    }
}
