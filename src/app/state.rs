use std::sync::Arc;

use crate::config::Config;
use crate::gateway::AiGateway;
use crate::recorder::Capture;
use crate::session::{RequestTicket, SessionSettings, SessionState};
use crate::stats::Stats;
use crate::types::{ClientReply, Feedback, Scenario};

/// Events delivered to the main loop: typed input and gateway completions.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    Input(String),
    InputClosed,
    ScenarioGenerated {
        ticket: RequestTicket,
        result: Result<Scenario, String>,
    },
    ClientTurnGenerated {
        ticket: RequestTicket,
        result: Result<ClientReply, String>,
    },
    FeedbackGenerated {
        ticket: RequestTicket,
        result: Result<Feedback, String>,
    },
    TranscriptionComplete {
        ticket: RequestTicket,
        result: Result<String, String>,
    },
}

/// Whether the loop keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Central application state, owned by the main loop.
pub struct AppState {
    pub session: SessionState,
    pub config: Config,
    pub stats: Stats,
    pub gateway: Arc<dyn AiGateway>,
    pub backend_sender: async_channel::Sender<BackendEvent>,
    /// Open microphone while recording.
    pub capture: Option<Capture>,
}

impl AppState {
    pub fn new(
        config: Config,
        gateway: Arc<dyn AiGateway>,
        sender: async_channel::Sender<BackendEvent>,
    ) -> Self {
        let settings = SessionSettings {
            min_audio_bytes: config.min_audio_bytes,
            failed_turn_policy: config.failed_turn_policy,
        };
        Self {
            session: SessionState::new(config.language, settings),
            config,
            stats: Stats::default(),
            gateway,
            backend_sender: sender,
            capture: None,
        }
    }
}
