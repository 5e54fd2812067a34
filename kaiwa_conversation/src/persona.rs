//! System-prompt synthesis for role-played personas.
//!
//! The builder is a pure function of [`SessionConfig`]: equal configs
//! always produce byte-equal prompts, so the seeded system turn never needs
//! re-synthesis.

use kaiwa_core::{Gender, Language, SessionConfig};

/// Persona descriptors for the preset conversation roles, in both reply
/// languages. Unknown persona ids fall back to a generic role line.
const PRESET_PERSONAS: &[(&str, &str, &str)] = &[
    (
        "cat",
        "你是一只会说话的猫咪，你非常可爱，非常喜欢和主人互动。无论在什么情况下，你都应当展现出一只猫咪应有的特点。",
        "You are a talking cat. You are very cute and love interacting with your owner. Whatever happens, you always behave the way a cat would.",
    ),
    (
        "clerk",
        "你是一家商店的店员，态度热情周到，熟悉店里的商品和价格，正在接待一位顾客。",
        "You are a shop clerk, warm and attentive, familiar with the goods and prices, currently serving a customer.",
    ),
    (
        "teacher",
        "你是一位耐心的老师，善于用简单的例子讲解问题，正在和你的学生交谈。",
        "You are a patient teacher who explains things with simple examples, currently talking with your student.",
    ),
    (
        "guide",
        "你是一名当地导游，熟悉本地的景点、交通和美食，正在为一位游客介绍行程。",
        "You are a local tour guide who knows the sights, transport and food well, currently helping a tourist plan their trip.",
    ),
    (
        "customer",
        "你是一位正在购物的顾客，会询问商品、讨价还价，并表达自己的喜好。",
        "You are a customer out shopping, asking about goods, bargaining, and expressing your preferences.",
    ),
    (
        "tourist",
        "你是一名外地游客，对当地不熟悉，会向对方询问路线、景点和习俗。",
        "You are a tourist unfamiliar with the area, asking about directions, sights and local customs.",
    ),
    (
        "interviewer",
        "你是一位面试官，正在进行一场求职面试，会依次提出有针对性的问题。",
        "You are an interviewer conducting a job interview, asking focused questions one at a time.",
    ),
    (
        "interviewee",
        "你是一位求职者，正在参加面试，认真回答面试官的问题并展示自己的经历。",
        "You are a job candidate in an interview, answering the interviewer's questions and presenting your experience.",
    ),
    (
        "businessman",
        "你是一位商务人士，正在进行一场商务洽谈，语气专业而礼貌。",
        "You are a business professional in the middle of a negotiation, professional and polite in tone.",
    ),
    (
        "student",
        "你是一名学生，正在和老师或同学讨论问题，语气自然、充满好奇。",
        "You are a student discussing questions with a teacher or classmate, natural and curious in tone.",
    ),
    (
        "partner",
        "你是对方的练习伙伴，正在进行一场轻松的日常对话。",
        "You are the other person's conversation partner, having a relaxed everyday chat.",
    ),
];

/// Builds the persona-defining system instruction for a session.
pub struct PersonaPromptBuilder;

impl PersonaPromptBuilder {
    /// Produce the system instruction text for `config`.
    ///
    /// Pure and deterministic; no side effects, no failure modes.
    #[must_use]
    pub fn build(config: &SessionConfig) -> String {
        let persona = Self::persona_line(&config.persona, config.language);
        let gender = Self::gender_line(config.gender, config.language);
        let language = Self::language_line(config.language);
        let constraints = Self::constraint_line(config.language);

        match config.language {
            Language::Chinese => format!("记住，{persona}{gender}{language}{constraints}"),
            Language::English => {
                format!("Remember: {persona} {gender} {language} {constraints}")
            }
        }
    }

    fn persona_line(persona: &str, language: Language) -> String {
        for (id, zh, en) in PRESET_PERSONAS {
            if *id == persona {
                return match language {
                    Language::Chinese => (*zh).to_string(),
                    Language::English => (*en).to_string(),
                };
            }
        }
        match language {
            Language::Chinese => format!("你正在扮演「{persona}」这个角色，始终保持这个角色的身份和说话方式。"),
            Language::English => format!(
                "You are role-playing as \"{persona}\"; always stay in this role and speak the way this character would."
            ),
        }
    }

    const fn gender_line(gender: Gender, language: Language) -> &'static str {
        match (language, gender) {
            (Language::Chinese, Gender::Female) => "你的角色是女性。",
            (Language::Chinese, Gender::Male) => "你的角色是男性。",
            (Language::English, Gender::Female) => "Your character is female.",
            (Language::English, Gender::Male) => "Your character is male.",
        }
    }

    const fn language_line(language: Language) -> &'static str {
        match language {
            Language::Chinese => "无论在什么情况下，都用中文回答。",
            Language::English => "Always answer in English, no matter what.",
        }
    }

    const fn constraint_line(language: Language) -> &'static str {
        match language {
            Language::Chinese => {
                "你的回答不应该包含旁白，所有的回复都应该是和对方的对话内容。"
            }
            Language::English => {
                "Your replies must not contain narration; everything you say is spoken dialogue with the other person."
            }
        }
    }
}
