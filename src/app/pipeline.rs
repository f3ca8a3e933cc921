use super::state::{AppState, BackendEvent};
use crate::session::Effect;

/// Run one effect. Gateway calls are spawned on the runtime and report back
/// through the backend channel.
pub fn dispatch(state: &AppState, effect: Effect) {
    let gateway = state.gateway.clone();
    let sender = state.backend_sender.clone();

    match effect {
        Effect::GenerateScenario {
            ticket,
            focus,
            language,
        } => {
            log::info!("Generating {} scenario ({})", focus.name(), language.code());
            tokio::spawn(async move {
                let result = gateway
                    .generate_scenario(focus, language)
                    .await
                    .map_err(|e| {
                        log::error!("Scenario generation failed: {e}");
                        e.to_string()
                    });
                let _ = sender
                    .send(BackendEvent::ScenarioGenerated { ticket, result })
                    .await;
            });
        }
        Effect::RequestClientTurn {
            ticket,
            scenario,
            transcript,
            language,
        } => {
            log::info!("Requesting client turn after {} turns", transcript.len());
            tokio::spawn(async move {
                let result = gateway
                    .next_client_turn(&scenario, &transcript, language)
                    .await
                    .map_err(|e| {
                        log::error!("Client simulation failed: {e}");
                        e.to_string()
                    });
                let _ = sender
                    .send(BackendEvent::ClientTurnGenerated { ticket, result })
                    .await;
            });
        }
        Effect::Evaluate {
            ticket,
            scenario,
            subject,
            language,
        } => {
            log::info!("Requesting evaluation for {}", scenario.id);
            tokio::spawn(async move {
                let result = gateway
                    .evaluate(&scenario, &subject, language)
                    .await
                    .map_err(|e| {
                        log::error!("Evaluation failed: {e}");
                        e.to_string()
                    });
                let _ = sender
                    .send(BackendEvent::FeedbackGenerated { ticket, result })
                    .await;
            });
        }
        Effect::Transcribe {
            ticket,
            audio,
            mime_type,
            language,
        } => {
            log::info!("Transcribing {} bytes of {mime_type}", audio.len());
            tokio::spawn(async move {
                let result = gateway
                    .transcribe(&audio, mime_type, language)
                    .await
                    .map_err(|e| {
                        log::warn!("Transcription failed: {e}");
                        e.to_string()
                    });
                let _ = sender
                    .send(BackendEvent::TranscriptionComplete { ticket, result })
                    .await;
            });
        }
        Effect::Alert(message) => crate::ui::alert(&message),
    }
}
