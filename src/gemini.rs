use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{Config, ModelConfig};
use crate::error::GatewayError;
use crate::gateway::AiGateway;
use crate::prompts::{self, PromptPayload};
use crate::types::{
    ClientReply, DialogueTurn, EvaluationSubject, Feedback, FocusArea, Language, Scenario,
    ScenarioPayload,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini request types
#[derive(Serialize)]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

/// Gemini response types
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Gateway backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    models: ModelConfig,
    rng: Mutex<StdRng>,
}

impl GeminiGateway {
    pub fn from_config(config: &Config) -> Self {
        let rng = match config.diversity_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            client: reqwest::Client::new(),
            api_key: config.gemini_api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            models: config.models.clone(),
            rng: Mutex::new(rng),
        }
    }

    async fn generate(
        &self,
        model: &str,
        payload: &PromptPayload,
        audio: Option<InlineData>,
    ) -> Result<String, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let url = format!("{}/{model}:generateContent?key={}", self.base_url, self.api_key);
        let body = build_request(payload, audio);

        log::debug!("Gemini request to {model} ({} prompt chars)", payload.prompt.len());
        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status,
                message: api_error_message(&text),
            });
        }

        let gemini_resp: GeminiResponse = resp.json().await?;
        extract_text(gemini_resp)
    }
}

fn build_request(payload: &PromptPayload, audio: Option<InlineData>) -> GeminiRequest {
    let mut parts = Vec::new();
    if let Some(inline_data) = audio {
        parts.push(Part::InlineData { inline_data });
    }
    parts.push(Part::Text {
        text: payload.prompt.clone(),
    });

    GeminiRequest {
        system_instruction: payload.system_instruction.as_ref().map(|text| SystemInstruction {
            parts: vec![Part::Text { text: text.clone() }],
        }),
        contents: vec![Content { role: "user", parts }],
        generation_config: GenerationConfig {
            temperature: payload.temperature,
            response_mime_type: payload
                .response_schema
                .as_ref()
                .map(|_| "application/json"),
            response_schema: payload.response_schema.clone(),
        },
    }
}

fn extract_text(response: GeminiResponse) -> Result<String, GatewayError> {
    let text = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Ok(text.to_string())
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| {
            let message = wrapper.error.message?;
            Some(match wrapper.error.status {
                Some(status) if !status.is_empty() => format!("{status}: {message}"),
                _ => message,
            })
        })
        .unwrap_or_else(|| body.to_string())
}

/// Strip a Markdown code fence the model sometimes wraps JSON in.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn parse_json<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T, GatewayError> {
    Ok(serde_json::from_str(strip_code_fence(text))?)
}

const FILLER_PREFIXES: &[&str] = &[
    "sure, here is the transcription:",
    "sure, here's the transcription:",
    "here is the transcription:",
    "here's the transcription:",
    "here is the transcript:",
    "here's the transcript:",
    "transcription:",
    "transcript:",
    "以下是转录内容：",
    "以下是转录内容:",
    "以下是转录：",
    "转录：",
];

/// Trim the conversational lead-ins and wrapping quotes a model may add
/// around a verbatim transcription.
pub fn clean_transcript(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some((first, rest)) = text.split_once('\n') {
        let first = first.trim().to_ascii_lowercase();
        let chatty = ["here", "sure", "okay", "ok,"]
            .iter()
            .any(|lead| first.starts_with(lead));
        if chatty && (first.ends_with(':') || first.ends_with('：')) {
            text = rest.trim();
        }
    }

    for prefix in FILLER_PREFIXES {
        let matches = text
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches {
            text = text[prefix.len()..].trim();
            break;
        }
    }

    for (open, close) in [("\"", "\""), ("“", "”"), ("「", "」")] {
        if text.len() > open.len() + close.len() && text.starts_with(open) && text.ends_with(close) {
            text = text[open.len()..text.len() - close.len()].trim();
            break;
        }
    }

    text.to_string()
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn generate_scenario(
        &self,
        focus: FocusArea,
        language: Language,
    ) -> Result<Scenario, GatewayError> {
        let payload = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            prompts::scenario_prompt(focus, language, &mut *rng)
        };
        let text = self.generate(&self.models.scenario, &payload, None).await?;
        let scenario = parse_json::<ScenarioPayload>(&text)?.into_scenario(focus, language)?;
        log::info!("Generated scenario {} for {}", scenario.id, focus.name());
        Ok(scenario)
    }

    async fn next_client_turn(
        &self,
        scenario: &Scenario,
        transcript: &[DialogueTurn],
        language: Language,
    ) -> Result<ClientReply, GatewayError> {
        let payload = prompts::client_turn_prompt(scenario, transcript, language);
        let text = self.generate(&self.models.dialogue, &payload, None).await?;
        let mut reply: ClientReply = parse_json(&text)?;
        reply.text = reply.text.trim().to_string();
        if reply.text.is_empty() {
            return Err(GatewayError::Schema("client turn is missing `text`".into()));
        }
        reply.non_verbal = reply
            .non_verbal
            .map(|cue| cue.trim().to_string())
            .filter(|cue| !cue.is_empty());
        Ok(reply)
    }

    async fn evaluate(
        &self,
        scenario: &Scenario,
        subject: &EvaluationSubject,
        language: Language,
    ) -> Result<Feedback, GatewayError> {
        let payload = prompts::evaluation_prompt(scenario, subject, language);
        let text = self.generate(&self.models.evaluation, &payload, None).await?;
        let mut feedback: Feedback = parse_json(&text)?;
        if !matches!(subject, EvaluationSubject::Dialogue(_)) {
            feedback.interaction_analysis = None;
        }
        Ok(feedback)
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        language: Language,
    ) -> Result<String, GatewayError> {
        let payload = prompts::transcription_prompt(language);
        let inline = InlineData {
            mime_type: mime_type.to_string(),
            data: BASE64_STANDARD.encode(audio),
        };
        let text = match self
            .generate(&self.models.transcription, &payload, Some(inline))
            .await
        {
            Ok(text) => text,
            // Silence legitimately yields no text.
            Err(GatewayError::EmptyResponse) => return Ok(String::new()),
            Err(e) => return Err(e),
        };
        Ok(clean_transcript(&text))
    }
}
