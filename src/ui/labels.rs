use crate::types::Language;

/// Localized UI strings.
pub struct Labels {
    pub hero_title: &'static str,
    pub hero_desc: &'static str,
    pub start_hint: &'static str,
    pub select_title: &'static str,
    pub select_hint: &'static str,
    pub sessions: &'static str,
    pub last_session: &'static str,
    pub turns: &'static str,
    pub focus_on: &'static str,
    pub placeholder: &'static str,
    pub draft: &'static str,
    pub recording: &'static str,
    pub transcribing: &'static str,
    pub responding: &'static str,
    pub analyzing: &'static str,
    pub preparing: &'static str,
    pub feedback_title: &'static str,
    pub points: &'static str,
    pub metrics: [&'static str; 4],
    pub strengths: &'static str,
    pub growth_areas: &'static str,
    pub refined_response: &'static str,
    pub interaction: &'static str,
    pub results_hint: &'static str,
    pub problem: &'static str,
    pub background: &'static str,
    pub cues: &'static str,
    pub years_old: &'static str,
    pub client: &'static str,
    pub counselor: &'static str,
}

static EN: Labels = Labels {
    hero_title: "MindRefine",
    hero_desc: "Professional Counseling Deliberate Practice",
    start_hint: "Type `start` to begin, `:lang` to switch language, `:quit` to exit.",
    select_title: "Select Practice",
    select_hint: "Enter a number or a focus name. `back` returns home.",
    sessions: "Sessions",
    last_session: "Last",
    turns: "turns",
    focus_on: "Focus:",
    placeholder: "Type your clinical response and press Enter. `:rec` records voice, `:supervise` ends the session.",
    draft: "Draft",
    recording: "Listening...",
    transcribing: "Transcribing...",
    responding: "Client is responding...",
    analyzing: "Evaluating...",
    preparing: "Preparing...",
    feedback_title: "Supervisory Feedback",
    points: "pts",
    metrics: ["Empathy", "Reflection", "Micro-Skills", "Professionalism"],
    strengths: "Strengths",
    growth_areas: "Growth",
    refined_response: "Refined",
    interaction: "Interaction",
    results_hint: "`retry` to keep practicing, `next` for a new scenario (`next same`, `next <n>`).",
    problem: "Issue",
    background: "History",
    cues: "Cues",
    years_old: "y/o",
    client: "Client",
    counselor: "You",
};

static ZH: Labels = Labels {
    hero_title: "MindRefine",
    hero_desc: "心理咨询师临床刻意练习",
    start_hint: "输入 `start` 开始，`:lang` 切换语言，`:quit` 退出。",
    select_title: "选择练习",
    select_hint: "输入编号或名称。`back` 返回首页。",
    sessions: "练习",
    last_session: "上次",
    turns: "轮",
    focus_on: "重点:",
    placeholder: "输入回应后按回车。`:rec` 录音，`:supervise` 结束并请求督导。",
    draft: "草稿",
    recording: "正在倾听...",
    transcribing: "语音识别中...",
    responding: "来访者正在回应...",
    analyzing: "督导分析中...",
    preparing: "准备中...",
    feedback_title: "临床督导反馈",
    points: "分",
    metrics: ["共情", "反应", "微技能", "专业性"],
    strengths: "优点",
    growth_areas: "建议",
    refined_response: "示范",
    interaction: "互动分析",
    results_hint: "`retry` 重新回应，`next` 下一题（`next same`、`next <编号>`）。",
    problem: "主诉",
    background: "背景",
    cues: "状态",
    years_old: "岁",
    client: "来访者",
    counselor: "你",
};

pub fn labels(language: Language) -> &'static Labels {
    match language {
        Language::En => &EN,
        Language::Zh => &ZH,
    }
}
