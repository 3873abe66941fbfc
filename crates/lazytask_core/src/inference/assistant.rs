//! Task-assistant replies.
//!
//! # Responsibility
//! - Render a conversation turn with the user's task list as context.
//! - Extract the assistant's answer from the generated text.
//!
//! # Invariants
//! - Only the latest message of the conversation is sent to the model.
//! - Rate limiting and rejected credentials surface as their own errors so
//!   callers can show actionable messages.
//! - Message text and task titles stay out of log lines.

use super::{GenerationParams, LanguageModelClient, ModelError};
use crate::model::task::Task;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const SYSTEM_INSTRUCTIONS: &str = "You are a helpful AI assistant for task and productivity management. Keep your responses concise and focused on helping users manage their tasks and time effectively.";
const NO_TASKS_CONTEXT: &str = "You have no tasks at the moment.";
const NO_DESCRIPTION: &str = "No description provided";
const REPLY_MARKER: &str = "assistant:";

/// Returned when the model produced nothing after the reply marker.
pub const FALLBACK_REPLY: &str = "I apologize, but I couldn't generate a proper response.";

/// Sampling for conversational replies.
pub fn assistant_params() -> GenerationParams {
    GenerationParams {
        max_new_tokens: 150,
        temperature: 0.7,
        top_p: Some(0.95),
        do_sample: Some(true),
        return_full_text: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    /// No message to answer.
    EmptyConversation,
    /// The service is rate limiting requests.
    Busy,
    /// The API token was rejected.
    InvalidToken,
    Model(ModelError),
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyConversation => write!(f, "conversation has no message to answer"),
            Self::Busy => write!(
                f,
                "the assistant service is currently busy, try again in a few seconds"
            ),
            Self::InvalidToken => write!(f, "invalid API token, check the inference configuration"),
            Self::Model(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssistantError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for AssistantError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::RateLimited => Self::Busy,
            ModelError::Auth(_) => Self::InvalidToken,
            other => Self::Model(other),
        }
    }
}

/// Renders the model input for answering `latest` with `tasks` as context.
///
/// The input ends with the reply marker so the generated text continues
/// as the assistant.
pub fn build_assistant_prompt(latest: &ChatMessage, tasks: &[Task]) -> String {
    let context = if tasks.is_empty() {
        NO_TASKS_CONTEXT.to_string()
    } else {
        let lines = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let description = task
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .unwrap_or(NO_DESCRIPTION);
                format!("{}. {} - {description}", index + 1, task.title)
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("Here are your current tasks:\n{lines}")
    };

    format!(
        "{}: {SYSTEM_INSTRUCTIONS} {context}\n{}: {}\n{REPLY_MARKER}",
        ChatRole::System.as_str(),
        latest.role.as_str(),
        latest.content
    )
}

/// Text after the last reply marker, trimmed.
///
/// Falls back to [`FALLBACK_REPLY`] when that text is blank.
pub fn extract_assistant_reply(generated: &str) -> String {
    let reply = generated
        .rsplit(REPLY_MARKER)
        .next()
        .unwrap_or_default()
        .trim();
    if reply.is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        reply.to_string()
    }
}

/// Answers the latest message of `conversation`.
///
/// # Errors
/// - [`AssistantError::EmptyConversation`] when `conversation` is empty.
/// - [`AssistantError::Busy`] / [`AssistantError::InvalidToken`] for rate
///   limiting and rejected credentials.
/// - [`AssistantError::Model`] for every other completion failure.
pub fn assistant_reply<M: LanguageModelClient>(
    client: &M,
    conversation: &[ChatMessage],
    tasks: &[Task],
) -> Result<String, AssistantError> {
    let latest = conversation
        .last()
        .ok_or(AssistantError::EmptyConversation)?;
    let started_at = Instant::now();
    let prompt = build_assistant_prompt(latest, tasks);

    match client.complete_with(&prompt, &assistant_params()) {
        Ok(generated) => {
            let reply = extract_assistant_reply(&generated);
            info!(
                "event=assistant_reply module=inference status=ok tasks={} duration_ms={} reply_chars={}",
                tasks.len(),
                started_at.elapsed().as_millis(),
                reply.chars().count()
            );
            Ok(reply)
        }
        Err(err) => {
            warn!(
                "event=assistant_reply module=inference status=error error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            );
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        assistant_params, assistant_reply, build_assistant_prompt, extract_assistant_reply,
        AssistantError, ChatMessage, FALLBACK_REPLY,
    };
    use crate::inference::{GenerationParams, LanguageModelClient, ModelError};
    use crate::model::task::Task;
    use std::cell::RefCell;

    struct RecordingModel {
        reply: Result<String, ModelError>,
        calls: RefCell<Vec<(String, GenerationParams)>>,
    }

    impl RecordingModel {
        fn replying(reply: Result<&str, ModelError>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl LanguageModelClient for RecordingModel {
        fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
            panic!("assistant must pass its own sampling parameters");
        }

        fn complete_with(
            &self,
            prompt: &str,
            params: &GenerationParams,
        ) -> Result<String, ModelError> {
            self.calls
                .borrow_mut()
                .push((prompt.to_string(), params.clone()));
            self.reply.clone()
        }
    }

    fn task(title: &str, description: Option<&str>) -> Task {
        let mut task = Task::new(title, 0);
        task.description = description.map(str::to_string);
        task
    }

    #[test]
    fn prompt_numbers_tasks_and_fills_missing_descriptions() {
        let tasks = [
            task("Pay rent", Some("before the 5th")),
            task("Call mom", None),
        ];
        let prompt = build_assistant_prompt(&ChatMessage::user("What first?"), &tasks);

        assert!(prompt.starts_with("system: You are a helpful AI assistant"));
        assert!(prompt.contains(
            "Here are your current tasks:\n1. Pay rent - before the 5th\n2. Call mom - No description provided"
        ));
        assert!(prompt.ends_with("\nuser: What first?\nassistant:"));
    }

    #[test]
    fn prompt_without_tasks_says_so() {
        let prompt = build_assistant_prompt(&ChatMessage::user("hi"), &[]);
        assert!(prompt.contains("effectively. You have no tasks at the moment.\nuser: hi"));
    }

    #[test]
    fn reply_is_text_after_last_marker() {
        let generated = "system: ...\nuser: plan?\nassistant: Start with rent. \n";
        assert_eq!(extract_assistant_reply(generated), "Start with rent.");
        assert_eq!(
            extract_assistant_reply("assistant: one\nuser: more\nassistant: two"),
            "two"
        );
        assert_eq!(extract_assistant_reply("no marker"), "no marker");
    }

    #[test]
    fn blank_reply_uses_fallback_text() {
        assert_eq!(extract_assistant_reply("user: hi\nassistant:   "), FALLBACK_REPLY);
        assert_eq!(extract_assistant_reply(""), FALLBACK_REPLY);
    }

    #[test]
    fn answer_sends_only_the_latest_message_with_chat_sampling() {
        let model = RecordingModel::replying(Ok("...\nassistant: Do the rent first."));
        let conversation = [
            ChatMessage::user("earlier question"),
            ChatMessage::assistant("earlier answer"),
            ChatMessage::user("What should I do now?"),
        ];

        let reply = assistant_reply(&model, &conversation, &[task("Pay rent", None)]).unwrap();
        assert_eq!(reply, "Do the rent first.");

        let calls = model.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("user: What should I do now?"));
        assert!(!calls[0].0.contains("earlier"));
        assert_eq!(calls[0].1, assistant_params());
    }

    #[test]
    fn answer_maps_rate_limit_and_auth_failures() {
        let conversation = [ChatMessage::user("hi")];

        let busy = RecordingModel::replying(Err(ModelError::RateLimited));
        assert_eq!(assistant_reply(&busy, &conversation, &[]), Err(AssistantError::Busy));

        let denied = RecordingModel::replying(Err(ModelError::Auth("HTTP 401".to_string())));
        assert_eq!(
            assistant_reply(&denied, &conversation, &[]),
            Err(AssistantError::InvalidToken)
        );

        let broken = RecordingModel::replying(Err(ModelError::InvalidResponse("[]".to_string())));
        assert!(matches!(
            assistant_reply(&broken, &conversation, &[]),
            Err(AssistantError::Model(ModelError::InvalidResponse(_)))
        ));
    }

    #[test]
    fn empty_conversation_never_calls_the_model() {
        let model = RecordingModel::replying(Ok("assistant: hi"));
        assert_eq!(
            assistant_reply(&model, &[], &[]),
            Err(AssistantError::EmptyConversation)
        );
        assert!(model.calls.borrow().is_empty());
    }
}
