use super::event_handler::apply;
use super::state::AppState;
use crate::recorder::Capture;
use crate::session::{transition, Action};

/// Start recording when idle, stop and transcribe when recording.
pub fn toggle_recording(state: &mut AppState) {
    if state.session.recording {
        stop_recording(state);
    } else {
        start_recording(state);
    }
}

/// Open the microphone, but only if the session would accept it.
pub fn start_recording(state: &mut AppState) {
    if let Some(reason) = transition(&state.session, Action::RecordingStarted).ignored {
        log::info!("Not recording: {reason}");
        crate::ui::notice(reason);
        return;
    }

    log::info!("Starting recording");
    match Capture::start() {
        Ok(capture) => {
            state.capture = Some(capture);
            apply(state, Action::RecordingStarted);
        }
        Err(e) => {
            log::error!("Failed to start recording: {e}");
            apply(state, Action::RecordingFailed(format!("Mic error: {e}")));
        }
    }
}

/// Close the microphone and hand the captured WAV to the session.
pub fn stop_recording(state: &mut AppState) {
    log::info!("Stopping recording");
    let audio = match state.capture.take() {
        Some(capture) => capture.finish().unwrap_or_else(|e| {
            log::error!("Failed to encode recording: {e}");
            Vec::new()
        }),
        None => Vec::new(),
    };
    apply(state, Action::RecordingStopped { audio });
}

/// Release the microphone if the session no longer records.
pub fn reconcile(state: &mut AppState) {
    if !state.session.recording && state.capture.is_some() {
        release_microphone(state);
    }
}

pub fn release_microphone(state: &mut AppState) {
    if let Some(capture) = state.capture.take() {
        drop(capture);
        log::info!("Microphone released");
    }
}
