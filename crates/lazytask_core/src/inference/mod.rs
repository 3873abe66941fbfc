//! Language-model client contract.
//!
//! # Responsibility
//! - Describe the single-shot text completion used by priority inference
//!   and the task assistant.
//!
//! # Invariants
//! - Clients make one attempt per call; retry policy is not theirs to own.
//! - Responses are free text; callers own all parsing.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod assistant;
pub mod huggingface;

pub use assistant::{
    assistant_reply, build_assistant_prompt, extract_assistant_reply, AssistantError,
    ChatMessage, ChatRole,
};
pub use huggingface::HuggingFaceClient;

/// Sampling parameters for one completion. Unset options use the endpoint's
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_sample: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_full_text: Option<bool>,
}

/// Completion failures. Never escape priority classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Transport failure, timeout or unexpected HTTP status.
    Network(String),
    /// Rejected credentials.
    Auth(String),
    RateLimited,
    /// Body did not match the expected response shape.
    InvalidResponse(String),
}

impl ModelError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::RateLimited => "rate_limited",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "model request failed: {message}"),
            Self::Auth(message) => write!(f, "model authentication failed: {message}"),
            Self::RateLimited => write!(f, "model service is rate limiting requests"),
            Self::InvalidResponse(message) => write!(f, "invalid model response: {message}"),
        }
    }
}

impl Error for ModelError {}

/// Single-shot text completion over the network.
pub trait LanguageModelClient {
    fn complete(&self, prompt: &str) -> Result<String, ModelError>;

    /// Completion with caller-chosen sampling. Clients without tunable
    /// sampling ignore `params`.
    fn complete_with(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelError> {
        let _ = params;
        self.complete(prompt)
    }
}

impl<M: LanguageModelClient + ?Sized> LanguageModelClient for &M {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        (**self).complete(prompt)
    }

    fn complete_with(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelError> {
        (**self).complete_with(prompt, params)
    }
}

impl<M: LanguageModelClient + ?Sized> LanguageModelClient for Box<M> {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        (**self).complete(prompt)
    }

    fn complete_with(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelError> {
        (**self).complete_with(prompt, params)
    }
}
