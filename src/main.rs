mod app;
mod config;
mod error;
mod gateway;
mod gemini;
mod prompts;
mod recorder;
mod session;
mod stats;
mod types;
mod ui;

use std::sync::Arc;

use app::{AppState, BackendEvent, Flow};
use config::Config;
use gemini::GeminiGateway;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    log::info!("Counsel Practice starting");

    if let Err(e) = Config::ensure_file() {
        log::warn!("Failed to write default config: {e}");
    }
    let config = Config::load();
    if config.gemini_api_key.is_empty() {
        log::warn!(
            "No Gemini API key; set GEMINI_API_KEY or edit {}",
            Config::path().display()
        );
    }

    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();
    let gateway = Arc::new(GeminiGateway::from_config(&config));
    let mut state = AppState::new(config, gateway, backend_tx.clone());

    ui::start_input_listener(backend_tx);

    ui::print(&ui::render::render_screen(&state.session, &state.stats));

    while let Ok(event) = backend_rx.recv().await {
        if app::handle_backend_event(&mut state, event) == Flow::Quit {
            break;
        }
    }

    app::release_microphone(&mut state);
    log::info!("Counsel Practice exiting");
}
