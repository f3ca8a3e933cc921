//! Plain-text rendering of each screen. Every function here is a pure
//! function of the state it is given.

use std::fmt::Write;

use crate::session::{RequestKind, Screen, SessionState};
use crate::stats::Stats;
use crate::types::{DialogueTurn, Feedback, FocusArea, FocusCategory, Language, Role, Scenario};

use super::labels::{labels, Labels};

const BAR_WIDTH: usize = 20;
const LIST_LIMIT: usize = 3;

pub fn render_screen(session: &SessionState, stats: &Stats) -> String {
    let l = labels(session.language);
    match session.screen {
        Screen::Home => home(l, session.language, stats),
        Screen::SelectFocus => focus_menu(l, session.language, session.is_loading()),
        Screen::Practice => practice(session, l),
        Screen::Results => match &session.feedback {
            Some(feedback) => feedback_panel(feedback, l),
            None => String::new(),
        },
    }
}

fn header(title: &str, language: Language) -> String {
    let toggle = match language {
        Language::En => "中文",
        Language::Zh => "EN",
    };
    format!("==== {title} ====  [:lang {toggle}]\n")
}

fn home(l: &Labels, language: Language, stats: &Stats) -> String {
    let mut out = format!("\n{}\n{}\n\n", l.hero_title, l.hero_desc);
    if stats.total_sessions() > 0 {
        let _ = write!(out, "{}: {}", l.sessions, stats.total_sessions());
        if let Some(avg) = stats.average_score() {
            let _ = write!(out, "  (avg {avg:.0})");
        }
        out.push('\n');
    }
    if let Some(last) = stats.history.last() {
        let _ = writeln!(
            out,
            "{}: {}, {} {}, {:.0} {} ({})",
            l.last_session,
            last.focus.label(language).0,
            last.turns,
            l.turns,
            last.score,
            l.points,
            last.finished_at.format("%H:%M")
        );
    }
    out.push_str(l.start_hint);
    out.push('\n');
    out
}

fn focus_menu(l: &Labels, language: Language, loading: bool) -> String {
    let mut out = header(l.select_title, language);
    for category in FocusCategory::ALL {
        let _ = writeln!(out, "\n{}", category.title(language).to_uppercase());
        for (index, focus) in FocusArea::ALL.iter().enumerate() {
            if focus.category() != category {
                continue;
            }
            let (title, desc) = focus.label(language);
            let _ = writeln!(out, "  {:>2}. {title} - {desc}", index + 1);
        }
    }
    out.push('\n');
    out.push_str(if loading { l.preparing } else { l.select_hint });
    out.push('\n');
    out
}

fn practice(session: &SessionState, l: &Labels) -> String {
    let title = session
        .focus
        .map(|focus| focus.label(session.language).0)
        .unwrap_or("Practice");
    let mut out = header(&format!("{} {title}", l.focus_on), session.language);
    if let Some(scenario) = &session.scenario {
        out.push_str(&scenario_card(scenario));
    }
    out.push('\n');
    // The opening statement is already shown on the card.
    for turn in session.transcript.iter().skip(1) {
        out.push_str(&turn_line(turn, l));
        out.push('\n');
    }
    if !session.draft.is_empty() {
        let _ = writeln!(out, "[{}] {}", l.draft, session.draft);
    }
    if let Some(status) = status_line(session) {
        out.push_str(status);
    } else {
        out.push_str(l.placeholder);
    }
    out.push('\n');
    out
}

/// Case file with labels in the scenario's own language.
pub fn scenario_card(scenario: &Scenario) -> String {
    let l = labels(scenario.language);
    format!(
        "{name}, {age}{yo}\n{problem}: {presenting}\n{background}: {history}\n{cues}: {non_verbal}\n\n  \"{statement}\"\n",
        name = scenario.name,
        age = scenario.age,
        yo = l.years_old,
        problem = l.problem,
        presenting = scenario.presenting_problem,
        background = l.background,
        history = scenario.background,
        cues = l.cues,
        non_verbal = scenario.non_verbal_cues,
        statement = scenario.statement,
    )
}

pub fn turn_line(turn: &DialogueTurn, l: &Labels) -> String {
    let speaker = match turn.role {
        Role::Client => l.client,
        Role::Counselor => l.counselor,
    };
    match &turn.non_verbal {
        Some(cue) => format!("{speaker}: {}  ({cue})", turn.text),
        None => format!("{speaker}: {}", turn.text),
    }
}

/// What the session is waiting on, if anything.
pub fn status_line(session: &SessionState) -> Option<&'static str> {
    let l = labels(session.language);
    if session.recording {
        return Some(l.recording);
    }
    if session.transcribing.is_some() {
        return Some(l.transcribing);
    }
    if session.awaiting_reply() {
        return Some(l.responding);
    }
    match session.in_flight.map(|f| f.kind) {
        Some(RequestKind::Scenario) => Some(l.preparing),
        Some(RequestKind::Evaluation) => Some(l.analyzing),
        _ => None,
    }
}

fn score_bar(value: f32) -> String {
    let value = value.clamp(0.0, 100.0);
    let filled = ((value / 100.0) * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn feedback_panel(feedback: &Feedback, l: &Labels) -> String {
    let metrics = &feedback.competency_analysis;
    let values = [
        metrics.empathy,
        metrics.reflective_listening,
        metrics.micro_skills,
        metrics.professionalism,
    ];

    let mut out = format!(
        "==== {} ====  {:.0} {}\n\n",
        l.feedback_title,
        feedback.score.clamp(0.0, 100.0),
        l.points
    );
    for (label, value) in l.metrics.iter().zip(values) {
        let _ = writeln!(
            out,
            "  {label:<16} {} {:>3.0}%",
            score_bar(value),
            value.clamp(0.0, 100.0)
        );
    }

    let revised = if feedback.revised_response.trim().is_empty() {
        "..."
    } else {
        feedback.revised_response.as_str()
    };
    let _ = writeln!(out, "\n{}:\n  \"{revised}\"", l.refined_response);
    if !feedback.explanation.trim().is_empty() {
        let _ = writeln!(out, "  {}", feedback.explanation);
    }

    for (title, items) in [(l.strengths, &feedback.strengths), (l.growth_areas, &feedback.growth_areas)] {
        let _ = writeln!(out, "\n{title}:");
        for item in items.iter().take(LIST_LIMIT) {
            let _ = writeln!(out, "  - {item}");
        }
    }

    if let Some(analysis) = feedback
        .interaction_analysis
        .as_deref()
        .filter(|a| !a.trim().is_empty())
    {
        let _ = writeln!(out, "\n{}:\n  {analysis}", l.interaction);
    }

    out.push('\n');
    out.push_str(l.results_hint);
    out.push('\n');
    out
}

/// Text to print after a state change, or `None` when nothing visible changed.
pub fn render_update(prev: &SessionState, next: &SessionState, stats: &Stats) -> Option<String> {
    if prev.screen != next.screen || prev.language != next.language {
        return Some(render_screen(next, stats));
    }

    let l = labels(next.language);
    let mut out = String::new();
    if next.screen == Screen::SelectFocus && prev.is_loading() && !next.is_loading() {
        // Scenario request failed; show the menu again.
        return Some(render_screen(next, stats));
    }
    if next.transcript.len() > prev.transcript.len()
        && next.transcript.starts_with(&prev.transcript)
    {
        for turn in &next.transcript[prev.transcript.len()..] {
            out.push_str(&turn_line(turn, l));
            out.push('\n');
        }
    }
    if next.draft != prev.draft && !next.draft.is_empty() {
        let _ = writeln!(out, "[{}] {}", l.draft, next.draft);
    }
    let status = status_line(next);
    if status != status_line(prev) {
        if let Some(status) = status {
            out.push_str(status);
            out.push('\n');
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
