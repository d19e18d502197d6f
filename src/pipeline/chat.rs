//! Conversational tutoring: a Socratic mentor persona shaped by a culture
//! context and the current lesson.
//!
//! The conversation lifecycle is owned entirely by the caller: history
//! arrives with every request, is replayed to the model in original order,
//! and nothing is stored server-side. Chat never surfaces raw errors to the
//! end user — a failed call produces a fixed, friendly fallback line.

use crate::pipeline::NO_API_KEY;
use crate::prompts::persona_prompt;
use crate::provider::{ChatMessage, ChatRole, CompletionOptions, Provider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Friendly reply used when the provider call fails.
pub const FALLBACK_REPLY: &str = "I'm having trouble thinking right now. Ask me again?";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: usize = 512;

/// One caller-supplied turn of conversation history, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// The tutoring persona.
#[derive(Clone)]
pub struct PersonaChat {
    provider: Option<Arc<dyn Provider>>,
}

impl PersonaChat {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self { provider }
    }

    /// Produce the persona's next utterance.
    ///
    /// The turn sequence sent to the model is
    /// `[persona system instruction] + history + [new user message]`.
    pub async fn respond(
        &self,
        message: &str,
        history: &[ChatTurn],
        lesson_context: &str,
        culture: &str,
    ) -> String {
        let Some(provider) = &self.provider else {
            return NO_API_KEY.to_string();
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(persona_prompt(lesson_context, culture)));
        messages.extend(history.iter().map(|turn| ChatMessage {
            role: turn.role,
            content: turn.content.clone(),
            images: Vec::new(),
        }));
        messages.push(ChatMessage::user(message));

        let options = CompletionOptions {
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            json_object: false,
        };

        match provider.chat(&messages, &options).await {
            Ok(completion) => completion.content,
            Err(e) => {
                error!("persona chat call failed: {e}");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
