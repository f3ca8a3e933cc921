use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GatewayError;

/// Language used for generated content and UI labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Zh,
            Language::Zh => Language::En,
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::En),
            "zh" | "cn" | "chinese" | "中文" => Some(Language::Zh),
            _ => None,
        }
    }
}

/// Grouping used when listing focus areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCategory {
    Microskills,
    Relationship,
    Process,
    Situational,
    EmotionFocused,
}

impl FocusCategory {
    pub const ALL: [FocusCategory; 5] = [
        FocusCategory::Microskills,
        FocusCategory::Relationship,
        FocusCategory::Process,
        FocusCategory::Situational,
        FocusCategory::EmotionFocused,
    ];

    pub fn title(self, language: Language) -> &'static str {
        match (self, language) {
            (FocusCategory::Microskills, Language::En) => "Microskills",
            (FocusCategory::Microskills, Language::Zh) => "临床微技能",
            (FocusCategory::Relationship, Language::En) => "Relationship",
            (FocusCategory::Relationship, Language::Zh) => "咨访关系",
            (FocusCategory::Process, Language::En) => "Process",
            (FocusCategory::Process, Language::Zh) => "咨询过程",
            (FocusCategory::Situational, Language::En) => "Situational",
            (FocusCategory::Situational, Language::Zh) => "特殊情境",
            (FocusCategory::EmotionFocused, Language::En) => "Emotion-Focused",
            (FocusCategory::EmotionFocused, Language::Zh) => "情绪聚焦",
        }
    }
}

/// The clinical competency a practice scenario is built to exercise.
///
/// Serialized as its canonical English name, which is also the tag sent to
/// the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FocusArea {
    #[serde(rename = "Emotional Reflection")]
    EmotionalReflection,
    #[serde(rename = "Content Reflection")]
    ContentReflection,
    #[serde(rename = "Questioning Skills")]
    QuestioningSkills,
    #[serde(rename = "Summarizing")]
    Summarizing,
    #[serde(rename = "Confrontation")]
    Confrontation,
    #[serde(rename = "Empathy")]
    Empathy,
    #[serde(rename = "Unconditional Positive Regard")]
    UnconditionalPositiveRegard,
    #[serde(rename = "Genuineness")]
    Genuineness,
    #[serde(rename = "Self-Awareness")]
    SelfAwareness,
    #[serde(rename = "Case Conceptualization")]
    CaseConceptualization,
    #[serde(rename = "Goal Setting")]
    GoalSetting,
    #[serde(rename = "Working with Resistance")]
    WorkingWithResistance,
    #[serde(rename = "Crisis Intervention")]
    CrisisIntervention,
    #[serde(rename = "Emotional Validation")]
    EmotionalValidation,
    #[serde(rename = "Deepening Emotion")]
    DeepeningEmotion,
}

impl FocusArea {
    /// Catalog order, grouped by category.
    pub const ALL: [FocusArea; 15] = [
        FocusArea::EmotionalReflection,
        FocusArea::ContentReflection,
        FocusArea::QuestioningSkills,
        FocusArea::Summarizing,
        FocusArea::Confrontation,
        FocusArea::Empathy,
        FocusArea::UnconditionalPositiveRegard,
        FocusArea::Genuineness,
        FocusArea::SelfAwareness,
        FocusArea::CaseConceptualization,
        FocusArea::GoalSetting,
        FocusArea::WorkingWithResistance,
        FocusArea::CrisisIntervention,
        FocusArea::EmotionalValidation,
        FocusArea::DeepeningEmotion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FocusArea::EmotionalReflection => "Emotional Reflection",
            FocusArea::ContentReflection => "Content Reflection",
            FocusArea::QuestioningSkills => "Questioning Skills",
            FocusArea::Summarizing => "Summarizing",
            FocusArea::Confrontation => "Confrontation",
            FocusArea::Empathy => "Empathy",
            FocusArea::UnconditionalPositiveRegard => "Unconditional Positive Regard",
            FocusArea::Genuineness => "Genuineness",
            FocusArea::SelfAwareness => "Self-Awareness",
            FocusArea::CaseConceptualization => "Case Conceptualization",
            FocusArea::GoalSetting => "Goal Setting",
            FocusArea::WorkingWithResistance => "Working with Resistance",
            FocusArea::CrisisIntervention => "Crisis Intervention",
            FocusArea::EmotionalValidation => "Emotional Validation",
            FocusArea::DeepeningEmotion => "Deepening Emotion",
        }
    }

    pub fn category(self) -> FocusCategory {
        match self {
            FocusArea::EmotionalReflection
            | FocusArea::ContentReflection
            | FocusArea::QuestioningSkills
            | FocusArea::Summarizing
            | FocusArea::Confrontation => FocusCategory::Microskills,
            FocusArea::Empathy
            | FocusArea::UnconditionalPositiveRegard
            | FocusArea::Genuineness
            | FocusArea::SelfAwareness => FocusCategory::Relationship,
            FocusArea::CaseConceptualization | FocusArea::GoalSetting => FocusCategory::Process,
            FocusArea::WorkingWithResistance | FocusArea::CrisisIntervention => {
                FocusCategory::Situational
            }
            FocusArea::EmotionalValidation | FocusArea::DeepeningEmotion => {
                FocusCategory::EmotionFocused
            }
        }
    }

    /// Localized (title, short description).
    pub fn label(self, language: Language) -> (&'static str, &'static str) {
        match language {
            Language::En => match self {
                FocusArea::EmotionalReflection => ("Emotional Reflection", "Identify underlying feelings."),
                FocusArea::ContentReflection => ("Content Reflection", "Paraphrase core message."),
                FocusArea::QuestioningSkills => ("Questioning Skills", "Open/closed questions."),
                FocusArea::Summarizing => ("Summarizing", "Synthesize milestones."),
                FocusArea::Confrontation => ("Confrontation", "Name inconsistencies gently."),
                FocusArea::Empathy => ("Empathy", "Communicating understanding."),
                FocusArea::UnconditionalPositiveRegard => ("Positive Regard", "Accept without judgment."),
                FocusArea::Genuineness => ("Genuineness", "Be yourself without masks."),
                FocusArea::SelfAwareness => ("Self-Awareness", "Notice your own reactions."),
                FocusArea::CaseConceptualization => ("Case Conceptualization", "Build the clinical picture."),
                FocusArea::GoalSetting => ("Goal Setting", "Agree on concrete aims."),
                FocusArea::WorkingWithResistance => ("Managing Resistance", "Navigate pushback."),
                FocusArea::CrisisIntervention => ("Crisis Intervention", "Handle high-risk moments."),
                FocusArea::EmotionalValidation => ("Emotional Validation", "Legitimize what is felt."),
                FocusArea::DeepeningEmotion => ("Deepening Emotion", "Stay with primary emotion."),
            },
            Language::Zh => match self {
                FocusArea::EmotionalReflection => ("情感反映", "准确识别并回馈情感状态。"),
                FocusArea::ContentReflection => ("内容反映", "对咨询内容进行反映与释义。"),
                FocusArea::QuestioningSkills => ("提问技术", "合理使用提问并取得平衡。"),
                FocusArea::Summarizing => ("总结技术", "归纳总结咨询内容与计划。"),
                FocusArea::Confrontation => ("面质", "温和指出不一致之处。"),
                FocusArea::Empathy => ("共情能力", "深入体验内心世界并反馈。"),
                FocusArea::UnconditionalPositiveRegard => ("无条件积极关注", "整体接纳，不加评判。"),
                FocusArea::Genuineness => ("真诚一致", "真实可信，表里如一。"),
                FocusArea::SelfAwareness => ("自我觉察", "觉察自身的动机与反应。"),
                FocusArea::CaseConceptualization => ("个案概念化", "整合信息形成临床图景。"),
                FocusArea::GoalSetting => ("目标设定", "共同商定具体目标。"),
                FocusArea::WorkingWithResistance => ("处理阻抗", "应对抵触或缺乏投入。"),
                FocusArea::CrisisIntervention => ("危机干预", "管理高风险时刻的应对。"),
                FocusArea::EmotionalValidation => ("情绪确认", "承认并肯定来访者的感受。"),
                FocusArea::DeepeningEmotion => ("情绪深化", "停留并深入原发情绪。"),
            },
        }
    }

    /// Looks up a focus area by canonical name or localized title, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        FocusArea::ALL.into_iter().find(|focus| {
            focus.name().to_lowercase() == wanted
                || focus.label(Language::En).0.to_lowercase() == wanted
                || focus.label(Language::Zh).0 == wanted
        })
    }

    pub fn slug(self) -> String {
        self.name().to_lowercase().replace(' ', "-")
    }
}

/// A generated simulated-client case file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub background: String,
    pub presenting_problem: String,
    pub non_verbal_cues: String,
    pub statement: String,
    pub theoretical_orientation: String,
    pub focus_area: FocusArea,
    pub language: Language,
}

/// Scenario as returned by the model, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub age: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub background: String,
    #[serde(deserialize_with = "null_as_default")]
    pub presenting_problem: String,
    #[serde(deserialize_with = "null_as_default")]
    pub non_verbal_cues: String,
    #[serde(deserialize_with = "null_as_default")]
    pub statement: String,
    #[serde(deserialize_with = "null_as_default")]
    pub theoretical_orientation: String,
}

impl ScenarioPayload {
    /// Validate and tag the payload. A scenario without an opening statement
    /// or non-verbal cues cannot seed a transcript.
    pub fn into_scenario(
        self,
        focus_area: FocusArea,
        language: Language,
    ) -> Result<Scenario, GatewayError> {
        let statement = self.statement.trim().to_string();
        if statement.is_empty() {
            return Err(GatewayError::Schema("scenario is missing `statement`".into()));
        }
        let non_verbal_cues = self.non_verbal_cues.trim().to_string();
        if non_verbal_cues.is_empty() {
            return Err(GatewayError::Schema(
                "scenario is missing `nonVerbalCues`".into(),
            ));
        }
        let id = if self.id.trim().is_empty() {
            format!(
                "{}-{}",
                focus_area.slug(),
                chrono::Utc::now().timestamp_millis()
            )
        } else {
            self.id.trim().to_string()
        };

        Ok(Scenario {
            id,
            name: self.name.trim().to_string(),
            age: self.age,
            background: self.background.trim().to_string(),
            presenting_problem: self.presenting_problem.trim().to_string(),
            non_verbal_cues,
            statement,
            theoretical_orientation: self.theoretical_orientation.trim().to_string(),
            focus_area,
            language,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Counselor,
}

/// One utterance in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueTurn {
    pub role: Role,
    pub text: String,
    pub non_verbal: Option<String>,
    pub language: Language,
}

impl DialogueTurn {
    pub fn client(text: impl Into<String>, non_verbal: Option<String>, language: Language) -> Self {
        Self {
            role: Role::Client,
            text: text.into(),
            non_verbal: non_verbal.filter(|cue| !cue.trim().is_empty()),
            language,
        }
    }

    pub fn counselor(text: impl Into<String>, language: Language) -> Self {
        Self {
            role: Role::Counselor,
            text: text.into(),
            non_verbal: None,
            language,
        }
    }
}

/// The simulated client's next utterance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientReply {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    pub non_verbal: Option<String>,
}

/// What a supervision request evaluates.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationSubject {
    /// A single counselor response to the scenario's opening statement.
    Response(String),
    /// The whole transcript.
    Dialogue(Vec<DialogueTurn>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompetencyAnalysis {
    #[serde(deserialize_with = "lenient_f32")]
    pub empathy: f32,
    #[serde(deserialize_with = "lenient_f32")]
    pub reflective_listening: f32,
    #[serde(deserialize_with = "lenient_f32")]
    pub micro_skills: f32,
    #[serde(deserialize_with = "lenient_f32")]
    pub professionalism: f32,
}

/// Supervisory evaluation. Every field defaults so a partial model response
/// still renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Feedback {
    #[serde(deserialize_with = "lenient_f32")]
    pub score: f32,
    #[serde(deserialize_with = "string_list")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub growth_areas: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub competency_analysis: CompetencyAnalysis,
    #[serde(deserialize_with = "null_as_default")]
    pub revised_response: String,
    #[serde(deserialize_with = "null_as_default")]
    pub explanation: String,
    pub interaction_analysis: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn number_like(value: serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Accepts `85`, `85.5` or `"85"`; anything else becomes 0.
fn lenient_f32<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_like(value).map(|n| n as f32).unwrap_or(0.0))
}

/// A list of strings where nulls, numbers and blanks are dropped.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
        .collect())
}

/// Accepts `34`, `34.0` or `"34"`; anything else becomes 0.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_like(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round().min(u32::MAX as f64) as u32)
        .unwrap_or(0))
}
