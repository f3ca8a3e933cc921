//! Prompt and response-schema construction for the gateway.
//!
//! Everything here is a pure function of its inputs. Scenario prompts draw
//! from the diversity pools through the caller's random source, so a seeded
//! `StdRng` yields reproducible prompts.

use rand::Rng;
use serde_json::{json, Value};

use crate::types::{DialogueTurn, EvaluationSubject, FocusArea, Language, Role, Scenario};

/// Parameters for one `generateContent` call, independent of wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPayload {
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub response_schema: Option<Value>,
    pub temperature: f32,
}

const PRESENTING_ISSUES: &[&str] = &[
    "prolonged grief after the death of a parent",
    "panic attacks before work presentations",
    "conflict with a partner over household responsibilities",
    "burnout and emotional exhaustion in a caregiving job",
    "social withdrawal after moving to a new city",
    "academic failure and fear of disappointing family",
    "suspected infidelity and loss of trust",
    "persistent insomnia and rumination",
    "anger outbursts toward their children",
    "identity confusion after a career change",
    "harmful drinking to cope with loneliness",
    "intrusive memories after a traffic accident",
];

const PERSONALITY_ORGANIZATION: &[&str] = &[
    "well-integrated personality organization with flexible defenses",
    "neurotic-level organization with rigid, self-critical defenses",
    "borderline-level organization with unstable self-image and intense affect",
    "narcissistic features with fragile self-esteem under a confident surface",
    "dependent style with difficulty making decisions alone",
];

const SOCIOECONOMIC_CONTEXTS: &[&str] = &[
    "working-class family, recently laid off",
    "first-generation university student on a scholarship",
    "middle-class professional with heavy mortgage debt",
    "affluent family with high achievement expectations",
    "rural background, migrated to a large city for work",
    "single parent juggling two part-time jobs",
    "retired on a fixed pension, living alone",
    "small business owner facing bankruptcy",
];

/// Short clinical definition used to ground generated content.
pub fn competency_definition(focus: FocusArea) -> &'static str {
    match focus {
        FocusArea::Empathy => "Empathy (共情): Experiencing the client's inner world, understanding the link between experience and personality, and communicating this back.",
        FocusArea::EmotionalReflection => "Emotional Reflection (情感反映): Accurately identifying and reflecting the client's emotional state to help them feel understood and validated.",
        FocusArea::ContentReflection => "Content Reflection (内容反映): Paraphrasing and restating the client's core message to ensure mutual understanding.",
        FocusArea::Confrontation => "Confrontation (面质): Highlighting inconsistencies in the client's speech or behavior to foster insight.",
        FocusArea::UnconditionalPositiveRegard => "Unconditional Positive Regard (无条件积极关注): Accepting the client as a whole without judgment, regardless of behavior.",
        FocusArea::Genuineness => "Genuineness (真诚一致): Being real and authentic without a professional mask.",
        FocusArea::SelfAwareness => "Self-Awareness (自我觉察): Constantly evaluating one's own motivations, values, and traits during the session.",
        FocusArea::QuestioningSkills => "Questioning Skills (提问技术): Balancing open and closed questions effectively.",
        FocusArea::Summarizing => "Summarizing (总结技术): Synthesizing content, feelings, and future plans.",
        FocusArea::CrisisIntervention => "Crisis Intervention (危机干预): Identifying and managing acute distress or high-risk situations professionally.",
        FocusArea::WorkingWithResistance => "Working with Resistance (处理阻抗): Navigating pushback or lack of engagement with empathy and control.",
        FocusArea::CaseConceptualization => "Case Conceptualization (个案概念化): Integrating theory, assessment, and information into a clear clinical picture.",
        FocusArea::GoalSetting => "Goal Setting (目标设定): Collaboratively turning vague wishes into concrete, achievable therapeutic goals.",
        FocusArea::EmotionalValidation => "Emotional Validation (情绪确认): Communicating that the client's emotional experience is understandable and legitimate.",
        FocusArea::DeepeningEmotion => "Deepening Emotion (情绪深化): Helping the client move past secondary reactions to contact and stay with primary emotion.",
    }
}

/// The auxiliary dimensions drawn for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiversityPicks {
    pub presenting_issue: &'static str,
    pub personality_organization: &'static str,
    pub socioeconomic_context: &'static str,
}

impl DiversityPicks {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            presenting_issue: pick(PRESENTING_ISSUES, rng),
            personality_organization: pick(PERSONALITY_ORGANIZATION, rng),
            socioeconomic_context: pick(SOCIOECONOMIC_CONTEXTS, rng),
        }
    }
}

fn pick<R: Rng + ?Sized>(pool: &'static [&'static str], rng: &mut R) -> &'static str {
    pool[rng.gen_range(0..pool.len())]
}

fn cultural_context(language: Language) -> &'static str {
    match language {
        Language::Zh => "The scenario must reflect a Chinese cultural background (e.g., family-centric values, academic pressure like Gaokao, or high-intensity workplace social norms). The output must be in Chinese.",
        Language::En => "The scenario must reflect a Western/English-speaking cultural background (e.g., individualism, direct communication styles). The output must be in English.",
    }
}

fn output_language(language: Language) -> &'static str {
    match language {
        Language::Zh => "Chinese (Simplified)",
        Language::En => "English",
    }
}

pub fn scenario_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "name": { "type": "STRING" },
            "age": { "type": "NUMBER" },
            "background": { "type": "STRING" },
            "presentingProblem": { "type": "STRING" },
            "nonVerbalCues": { "type": "STRING" },
            "statement": { "type": "STRING" },
            "theoreticalOrientation": { "type": "STRING" }
        },
        "required": [
            "id", "name", "age", "background", "presentingProblem",
            "nonVerbalCues", "statement", "theoreticalOrientation"
        ]
    })
}

pub fn client_turn_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "text": { "type": "STRING" },
            "nonVerbal": { "type": "STRING" }
        },
        "required": ["text"]
    })
}

pub fn feedback_schema(include_interaction: bool) -> Value {
    let mut schema = json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER" },
            "strengths": { "type": "ARRAY", "items": { "type": "STRING" } },
            "growthAreas": { "type": "ARRAY", "items": { "type": "STRING" } },
            "competencyAnalysis": {
                "type": "OBJECT",
                "properties": {
                    "empathy": { "type": "NUMBER" },
                    "reflectiveListening": { "type": "NUMBER" },
                    "microSkills": { "type": "NUMBER" },
                    "professionalism": { "type": "NUMBER" }
                }
            },
            "revisedResponse": { "type": "STRING" },
            "explanation": { "type": "STRING" }
        },
        "required": [
            "score", "strengths", "growthAreas", "competencyAnalysis",
            "revisedResponse", "explanation"
        ]
    });
    if include_interaction {
        schema["properties"]["interactionAnalysis"] = json!({ "type": "STRING" });
        if let Some(required) = schema["required"].as_array_mut() {
            required.push(json!("interactionAnalysis"));
        }
    }
    schema
}

pub fn scenario_prompt<R: Rng + ?Sized>(
    focus: FocusArea,
    language: Language,
    rng: &mut R,
) -> PromptPayload {
    let picks = DiversityPicks::draw(rng);
    let prompt = format!(
        "Generate a realistic psychological counseling client scenario for deliberate practice.\n\
         The focus of this practice session is: \"{focus}\".\n\
         Definition Context: {definition}\n\
         {culture}\n\
         To keep scenarios varied, build the client around these dimensions:\n\
         - Presenting issue: {issue}\n\
         - Personality organization: {personality}\n\
         - Socio-economic context: {context}\n\
         The scenario should include a specific verbal statement from the client that tests the counselor's ability in this specific area.\n\
         Ensure the non-verbal cues (body posture, tone, etc.) provide depth to the emotional state.",
        focus = focus.name(),
        definition = competency_definition(focus),
        culture = cultural_context(language),
        issue = picks.presenting_issue,
        personality = picks.personality_organization,
        context = picks.socioeconomic_context,
    );

    PromptPayload {
        system_instruction: None,
        prompt,
        response_schema: Some(scenario_schema()),
        temperature: 0.9,
    }
}

/// Render a transcript as labelled lines for prompting.
pub fn render_transcript(transcript: &[DialogueTurn]) -> String {
    transcript
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::Client => "Client",
                Role::Counselor => "Counselor",
            };
            match &turn.non_verbal {
                Some(cue) => format!("{speaker}: {} [non-verbal: {cue}]", turn.text),
                None => format!("{speaker}: {}", turn.text),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn scenario_brief(scenario: &Scenario) -> String {
    format!(
        "- Name: {} ({} years old)\n\
         - Background: {}\n\
         - Presenting problem: {}\n\
         - Non-verbal cues: {}\n\
         - Theoretical orientation: {}",
        scenario.name,
        scenario.age,
        scenario.background,
        scenario.presenting_problem,
        scenario.non_verbal_cues,
        scenario.theoretical_orientation,
    )
}

pub fn client_turn_prompt(
    scenario: &Scenario,
    transcript: &[DialogueTurn],
    language: Language,
) -> PromptPayload {
    let system_instruction = format!(
        "You are role-playing a counseling client named {name} in a training simulation. \
         Stay fully in character. Never give advice, never break the fourth wall, never mention \
         that you are simulated. React realistically to the counselor's last message: open up \
         when you feel understood, become guarded or resistant when you feel judged or rushed. \
         Reply in {lang}.",
        name = scenario.name,
        lang = output_language(language),
    );
    let prompt = format!(
        "CLIENT CASE FILE:\n{brief}\n\n\
         The practice focus is \"{focus}\": {definition}\n\n\
         CONVERSATION SO FAR:\n{transcript}\n\n\
         Write the client's next utterance in response to the counselor's latest turn. \
         Keep it to one to four sentences. Put body language, tone and silences in `nonVerbal`, \
         not in `text`.",
        brief = scenario_brief(scenario),
        focus = scenario.focus_area.name(),
        definition = competency_definition(scenario.focus_area),
        transcript = render_transcript(transcript),
    );

    PromptPayload {
        system_instruction: Some(system_instruction),
        prompt,
        response_schema: Some(client_turn_schema()),
        temperature: 0.8,
    }
}

pub fn evaluation_prompt(
    scenario: &Scenario,
    subject: &EvaluationSubject,
    language: Language,
) -> PromptPayload {
    let focus = scenario.focus_area;
    let culture = match language {
        Language::Zh => "Chinese",
        Language::En => "Western",
    };
    let material = match subject {
        EvaluationSubject::Response(response) => format!(
            "CLIENT SCENARIO:\n{brief}\n- Client said: \"{statement}\"\n\n\
             COUNSELOR'S RESPONSE:\n\"{response}\"",
            brief = scenario_brief(scenario),
            statement = scenario.statement,
        ),
        EvaluationSubject::Dialogue(transcript) => format!(
            "CLIENT SCENARIO:\n{brief}\n\n\
             FULL SESSION TRANSCRIPT:\n{transcript}\n\n\
             Evaluate the counselor across the whole interaction, not only the last turn. \
             In `interactionAnalysis`, describe how the relationship and the client's openness \
             developed turn by turn and which counselor moves changed its direction.",
            brief = scenario_brief(scenario),
            transcript = render_transcript(transcript),
        ),
    };

    let prompt = format!(
        "ACT AS AN EXPERT CLINICAL SUPERVISOR.\n\
         Evaluate the counselor based on professional clinical competency standards and cultural sensitivity for a {culture} context.\n\n\
         SPECIFIC COMPETENCY FOCUS:\n\
         The focus of this exercise is: {focus}. Definition: {definition}\n\n\
         Return the feedback, strengths, growth areas, and revised response in {lang}.\n\n\
         {material}\n\n\
         Evaluation Criteria (Scores 0-100):\n\
         1. Empathy (共情): Depth of emotional understanding.\n\
         2. Reflection (反应): Accuracy of content/feeling reflection.\n\
         3. Micro-skills (微技能): Technical execution (questioning, silence, etc).\n\
         4. Professionalism (专业性): Ethical stance and professional tone.\n\n\
         Provide a gold-standard revised response that demonstrates excellence in {focus}.",
        focus = focus.name(),
        definition = competency_definition(focus),
        lang = output_language(language),
    );

    PromptPayload {
        system_instruction: None,
        prompt,
        response_schema: Some(feedback_schema(matches!(
            subject,
            EvaluationSubject::Dialogue(_)
        ))),
        temperature: 0.3,
    }
}

pub fn transcription_prompt(language: Language) -> PromptPayload {
    let prompt = match language {
        Language::Zh => "Transcription task: Convert the provided Chinese audio to Chinese Simplified text. Provide a verbatim transcription. Do not summarize or add notes. Output only the text spoken.",
        Language::En => "Transcription task: Convert the provided English audio to English text. Provide a verbatim transcription. Do not summarize or add notes. Output only the text spoken.",
    };
    PromptPayload {
        system_instruction: None,
        prompt: prompt.to_string(),
        response_schema: None,
        temperature: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scenario() -> Scenario {
        Scenario {
            id: "s1".into(),
            name: "Lena".into(),
            age: 29,
            background: "Nurse on night shifts".into(),
            presenting_problem: "Exhaustion".into(),
            non_verbal_cues: "Slumped, speaks quietly".into(),
            statement: "I don't think I can keep doing this.".into(),
            theoretical_orientation: "Person-centered".into(),
            focus_area: FocusArea::CrisisIntervention,
            language: Language::En,
        }
    }

    #[test]
    fn every_focus_area_has_a_definition_naming_it() {
        for focus in FocusArea::ALL {
            assert!(
                competency_definition(focus).starts_with(focus.name()),
                "definition for {focus:?}"
            );
        }
    }

    #[test]
    fn seeded_rng_gives_identical_scenario_prompts() {
        let a = scenario_prompt(FocusArea::Empathy, Language::En, &mut StdRng::seed_from_u64(7));
        let b = scenario_prompt(FocusArea::Empathy, Language::En, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn diversity_picks_come_from_pools() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let picks = DiversityPicks::draw(&mut rng);
            assert!(PRESENTING_ISSUES.contains(&picks.presenting_issue));
            assert!(PERSONALITY_ORGANIZATION.contains(&picks.personality_organization));
            assert!(SOCIOECONOMIC_CONTEXTS.contains(&picks.socioeconomic_context));
        }
    }

    #[test]
    fn scenario_prompt_carries_focus_and_culture() {
        let payload = scenario_prompt(
            FocusArea::CrisisIntervention,
            Language::Zh,
            &mut StdRng::seed_from_u64(1),
        );
        assert!(payload.prompt.contains("\"Crisis Intervention\""));
        assert!(payload.prompt.contains("Chinese cultural background"));
        assert!(payload.response_schema.is_some());
    }

    #[test]
    fn transcript_renders_roles_and_cues() {
        let transcript = vec![
            DialogueTurn::client("Hello.", Some("avoids eye contact".into()), Language::En),
            DialogueTurn::counselor("Welcome.", Language::En),
        ];
        assert_eq!(
            render_transcript(&transcript),
            "Client: Hello. [non-verbal: avoids eye contact]\nCounselor: Welcome."
        );
    }

    #[test]
    fn client_turn_prompt_includes_transcript_and_language() {
        let s = scenario();
        let transcript = vec![
            DialogueTurn::client(&s.statement, None, Language::En),
            DialogueTurn::counselor("I hear how tired you are.", Language::En),
        ];
        let payload = client_turn_prompt(&s, &transcript, Language::Zh);
        assert!(payload.prompt.contains("Counselor: I hear how tired you are."));
        assert!(payload
            .system_instruction
            .as_deref()
            .unwrap_or_default()
            .contains("Chinese"));
    }

    #[test]
    fn dialogue_evaluation_requests_interaction_analysis() {
        let s = scenario();
        let dialogue = EvaluationSubject::Dialogue(vec![
            DialogueTurn::client(&s.statement, None, Language::En),
            DialogueTurn::counselor("Tell me more.", Language::En),
        ]);
        let payload = evaluation_prompt(&s, &dialogue, Language::En);
        let schema = payload.response_schema.unwrap();
        assert!(schema["properties"]["interactionAnalysis"].is_object());
        assert!(payload.prompt.contains("FULL SESSION TRANSCRIPT"));

        let single = EvaluationSubject::Response("Tell me more.".into());
        let payload = evaluation_prompt(&s, &single, Language::En);
        let schema = payload.response_schema.unwrap();
        assert!(schema["properties"]["interactionAnalysis"].is_null());
        assert!(payload.prompt.contains("\"Tell me more.\""));
    }
}
