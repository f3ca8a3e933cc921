use thiserror::Error;

/// Failures at the AI gateway boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no Gemini API key configured (set GEMINI_API_KEY or edit the config file)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("response did not match the expected shape: {0}")]
    Schema(String),

    #[error("response was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
