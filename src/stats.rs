use chrono::{DateTime, Local};

use crate::types::{Feedback, FocusArea};

/// One completed supervision.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub focus: FocusArea,
    pub score: f32,
    pub turns: usize,
    pub finished_at: DateTime<Local>,
}

/// Practice history for the running process. Never written to disk.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub history: Vec<SessionRecord>,
}

impl Stats {
    pub fn total_sessions(&self) -> usize {
        self.history.len()
    }

    pub fn average_score(&self) -> Option<f32> {
        if self.history.is_empty() {
            return None;
        }
        let sum: f32 = self.history.iter().map(|r| r.score).sum();
        Some(sum / self.history.len() as f32)
    }

    /// Record feedback received for a session on `focus`.
    pub fn record_feedback(&mut self, focus: FocusArea, turns: usize, feedback: &Feedback) {
        self.history.push(SessionRecord {
            focus,
            score: feedback.score.clamp(0.0, 100.0),
            turns,
            finished_at: Local::now(),
        });
    }
}
