//! Hugging Face inference API client.
//!
//! # Responsibility
//! - POST one text-generation request and return the generated text.
//! - Encode per-call sampling parameters; `complete` uses the configured
//!   classification sampling.
//! - Map HTTP/transport failures onto `ModelError`.
//!
//! # Invariants
//! - The configured timeout bounds the whole request, body included, as well
//!   as each connect/read/write; a slow endpoint surfaces as
//!   `ModelError::Network` instead of blocking the caller.
//! - The API key is sent only as a bearer header and never logged.

use super::{GenerationParams, LanguageModelClient, ModelError};
use crate::config::InferenceConfig;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const ERROR_BODY_MAX_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct GeneratedTextWire {
    generated_text: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequestWire<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

/// Blocking client for the hosted text-generation endpoint.
pub struct HuggingFaceClient {
    api_url: String,
    api_key: String,
    classification: GenerationParams,
    agent: ureq::Agent,
}

impl HuggingFaceClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            classification: classification_params(&InferenceConfig::default()),
            agent: http_agent(timeout),
        }
    }

    /// Builds a client from configuration.
    ///
    /// Returns `None` when inference is disabled or no API key is available;
    /// callers then run with the fallback tier only.
    pub fn from_config(config: &InferenceConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.resolved_api_key()?;
        Some(Self {
            api_url: config.api_url.clone(),
            api_key: api_key.to_string(),
            classification: classification_params(config),
            agent: http_agent(Duration::from_millis(config.timeout_ms)),
        })
    }
}

/// Sampling used by plain `complete` calls.
///
/// `return_full_text=false` keeps the prompt out of `generated_text`, which
/// must hold only the label for exact matching.
fn classification_params(config: &InferenceConfig) -> GenerationParams {
    GenerationParams {
        max_new_tokens: config.max_new_tokens,
        temperature: config.temperature,
        top_p: None,
        do_sample: None,
        return_full_text: Some(false),
    }
}

pub(crate) fn request_body(prompt: &str, params: &GenerationParams) -> Result<String, ModelError> {
    serde_json::to_string(&GenerateRequestWire {
        inputs: prompt,
        parameters: params,
    })
    .map_err(|err| ModelError::InvalidResponse(format!("request encoding failed: {err}")))
}

impl LanguageModelClient for HuggingFaceClient {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.complete_with(prompt, &self.classification)
    }

    fn complete_with(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelError> {
        let started_at = Instant::now();
        let body = request_body(prompt, params)?;

        let response = self
            .agent
            .post(&self.api_url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_string(&body);

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let detail = response
                    .into_string()
                    .map(|text| truncate(&text, ERROR_BODY_MAX_CHARS))
                    .unwrap_or_default();
                warn!(
                    "event=model_complete module=inference status=error http_status={status} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Err(map_status(status, detail));
            }
            Err(ureq::Error::Transport(transport)) => {
                warn!(
                    "event=model_complete module=inference status=error error_code=transport duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Err(ModelError::Network(transport.to_string()));
            }
        };

        let text = response
            .into_string()
            .map_err(|err| ModelError::Network(format!("failed to read response body: {err}")))?;
        let generated = parse_generated_text(&text)?;
        debug!(
            "event=model_complete module=inference status=ok duration_ms={} output_chars={}",
            started_at.elapsed().as_millis(),
            generated.chars().count()
        );
        Ok(generated)
    }
}

fn http_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .build()
}

/// Maps a non-2xx status onto the model error taxonomy.
pub(crate) fn map_status(status: u16, detail: String) -> ModelError {
    match status {
        401 | 403 => ModelError::Auth(format!("HTTP {status}")),
        429 => ModelError::RateLimited,
        _ if detail.is_empty() => ModelError::Network(format!("HTTP {status}")),
        _ => ModelError::Network(format!("HTTP {status}: {detail}")),
    }
}

/// Extracts `generated_text` from `[{"generated_text": "..."}]`.
pub(crate) fn parse_generated_text(body: &str) -> Result<String, ModelError> {
    let items: Vec<GeneratedTextWire> = serde_json::from_str(body)
        .map_err(|err| ModelError::InvalidResponse(err.to_string()))?;
    items
        .into_iter()
        .next()
        .map(|item| item.generated_text)
        .ok_or_else(|| ModelError::InvalidResponse("empty generation list".to_string()))
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    if value.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
