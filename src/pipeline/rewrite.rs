//! Culturally-adapted rewriting: extracted text in, simplified explanation
//! and an image-generation prompt out.
//!
//! This stage never fails the request. Every failure state — missing
//! credential, provider error, unparsable model output — is encoded in the
//! returned [`RewriteResult`] as a documented placeholder, so the router can
//! treat the result as unconditionally present. The placeholder strings are
//! part of the wire contract; clients match on them.

use crate::pipeline::structured::decode_json_object;
use crate::pipeline::NO_API_KEY;
use crate::prompts::{rewrite_prompt, JSON_SYSTEM_PROMPT};
use crate::provider::{ChatMessage, CompletionOptions, Provider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Diagnostic returned as `rewritten_text` when no credential is configured.
pub const MISSING_KEY_TEXT: &str =
    "Error: GROQ_API_KEY not found. Please set it in your environment.";

/// Placeholder `image_prompt` when the model reply was not valid JSON.
pub const PARSE_FAILURE_PROMPT: &str = "Error parsing JSON response";

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: usize = 1024;

/// The rewrite outcome. Both fields are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResult {
    /// The simplified, culturally-adapted explanation.
    #[serde(default)]
    pub rewritten_text: String,
    /// A prompt depicting the core concept as clean educational line art.
    #[serde(default)]
    pub image_prompt: String,
}

/// Rewrites explanatory text for a target culture context.
#[derive(Clone)]
pub struct ContentRewriter {
    provider: Option<Arc<dyn Provider>>,
}

impl ContentRewriter {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self { provider }
    }

    /// Rewrite `text` for `culture`. Infallible by design; see module docs.
    pub async fn rewrite(&self, text: &str, culture: &str) -> RewriteResult {
        let Some(provider) = &self.provider else {
            return RewriteResult {
                rewritten_text: MISSING_KEY_TEXT.to_string(),
                image_prompt: NO_API_KEY.to_string(),
            };
        };

        let messages = [
            ChatMessage::system(JSON_SYSTEM_PROMPT),
            ChatMessage::user(rewrite_prompt(text, culture)),
        ];
        let options = CompletionOptions {
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            json_object: true,
        };

        let completion = match provider.chat(&messages, &options).await {
            Ok(completion) => completion,
            Err(e) => {
                error!("rewrite call failed: {e}");
                return RewriteResult {
                    rewritten_text: format!("Error processing with AI: {e}"),
                    image_prompt: "Error".to_string(),
                };
            }
        };

        match decode_json_object::<RewriteResult>(&completion.content) {
            Ok(result) => result,
            Err(e) => {
                warn!("rewrite reply was not the expected JSON shape: {e}");
                RewriteResult {
                    rewritten_text: completion.content,
                    image_prompt: PARSE_FAILURE_PROMPT.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::StubProvider;

    #[tokio::test]
    async fn well_formed_reply_round_trips() {
        let rewriter = ContentRewriter::new(Some(Arc::new(StubProvider::chatting(
            r#"{"rewritten_text": "Light becomes food.", "image_prompt": "line art of a leaf"}"#,
        ))));
        let result = rewriter.rewrite("Photosynthesis", "rural Kenya").await;
        assert_eq!(result.rewritten_text, "Light becomes food.");
        assert_eq!(result.image_prompt, "line art of a leaf");
    }

    #[tokio::test]
    async fn missing_credential_yields_fixed_diagnostic_pair() {
        let rewriter = ContentRewriter::new(None);
        let result = rewriter.rewrite("anything", "anywhere").await;
        assert_eq!(result.rewritten_text, MISSING_KEY_TEXT);
        assert_eq!(result.image_prompt, NO_API_KEY);
    }

    #[tokio::test]
    async fn provider_failure_is_encoded_not_raised() {
        let rewriter = ContentRewriter::new(Some(Arc::new(StubProvider::unreachable())));
        let result = rewriter.rewrite("anything", "anywhere").await;
        assert!(result.rewritten_text.starts_with("Error processing with AI:"));
        assert_eq!(result.image_prompt, "Error");
    }

    #[tokio::test]
    async fn unparsable_reply_falls_back_to_raw_content() {
        let rewriter = ContentRewriter::new(Some(Arc::new(StubProvider::chatting(
            "Plain prose, no JSON at all.",
        ))));
        let result = rewriter.rewrite("anything", "anywhere").await;
        assert_eq!(result.rewritten_text, "Plain prose, no JSON at all.");
        assert_eq!(result.image_prompt, PARSE_FAILURE_PROMPT);
    }

    #[tokio::test]
    async fn fenced_reply_is_recovered() {
        let rewriter = ContentRewriter::new(Some(Arc::new(StubProvider::chatting(
            "```json\n{\"rewritten_text\": \"ok\", \"image_prompt\": \"p\"}\n```",
        ))));
        let result = rewriter.rewrite("t", "c").await;
        assert_eq!(result.rewritten_text, "ok");
        assert_eq!(result.image_prompt, "p");
    }

    #[tokio::test]
    async fn both_fields_always_present() {
        // A reply with one field still yields both, defaulting the other —
        // the contract is "fields present", not "fields non-empty".
        let rewriter = ContentRewriter::new(Some(Arc::new(StubProvider::chatting(
            r#"{"rewritten_text": "only this"}"#,
        ))));
        let result = rewriter.rewrite("t", "c").await;
        assert_eq!(result.rewritten_text, "only this");
        assert_eq!(result.image_prompt, "");
    }
}
