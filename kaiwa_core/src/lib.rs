#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Shared data model and provider boundary for the kaiwa persona chat core.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged utterance. Immutable once appended to a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Language the persona must answer in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Chinese,
    English,
}

/// Speaker gender used for voice selection and prompt hints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Caller-supplied parameters identifying and shaping one conversation.
///
/// `persona` and `speed` participate in session identity derivation;
/// `language` and `gender` only shape the synthesized system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub persona: String,
    pub speed: f32,
    #[serde(default = "SessionConfig::default_language")]
    pub language: Language,
    #[serde(default = "SessionConfig::default_gender")]
    pub gender: Gender,
}

impl SessionConfig {
    #[must_use]
    pub fn new(persona: impl Into<String>, speed: f32) -> Self {
        Self {
            persona: persona.into(),
            speed,
            language: Self::default_language(),
            gender: Self::default_gender(),
        }
    }

    #[must_use]
    pub const fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub const fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    const fn default_language() -> Language {
        Language::Chinese
    }

    const fn default_gender() -> Gender {
        Gender::Female
    }
}

/// Generation parameters passed through to the completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        // Temperature above the provider default keeps persona replies
        // varied instead of repetitive.
        Self {
            model: "deepseek-chat".to_string(),
            max_tokens: 1000,
            temperature: 1.3,
        }
    }
}

impl CompletionOptions {
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One assistant utterance returned by the completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionReply {
    pub content: String,
    pub usage: Option<Usage>,
}

/// Failure at the completion-provider boundary.
///
/// Every provider-side failure is normalized into one of these variants so
/// callers can match on the kind without string inspection; the underlying
/// cause text is preserved inside the variant.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authentication rejected by completion endpoint: {0}")]
    Auth(String),

    #[error("rate limited by completion endpoint: {0}")]
    RateLimited(String),

    #[error("completion endpoint rejected the request: {0}")]
    InvalidRequest(String),

    #[error("transport failure reaching completion endpoint: {0}")]
    Transport(String),

    #[error("completion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("completion endpoint returned no usable content")]
    EmptyReply,
}

/// External capability: given an ordered transcript, return one assistant
/// turn. Implementations own all provider-specific quirks.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        turns: &[Turn],
        options: &CompletionOptions,
    ) -> Result<CompletionReply, ProviderError>;

    fn default_model(&self) -> &str;
}
