use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{ClientReply, DialogueTurn, EvaluationSubject, Feedback, FocusArea, Language, Scenario};

/// The generative-AI service the practice session talks to.
#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn generate_scenario(
        &self,
        focus: FocusArea,
        language: Language,
    ) -> Result<Scenario, GatewayError>;

    /// Simulate the client's reaction to the latest counselor turn.
    async fn next_client_turn(
        &self,
        scenario: &Scenario,
        transcript: &[DialogueTurn],
        language: Language,
    ) -> Result<ClientReply, GatewayError>;

    async fn evaluate(
        &self,
        scenario: &Scenario,
        subject: &EvaluationSubject,
        language: Language,
    ) -> Result<Feedback, GatewayError>;

    /// Verbatim speech-to-text.
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        language: Language,
    ) -> Result<String, GatewayError>;
}
