//! The AI provider seam: one capability object, four capabilities.
//!
//! Everything the gateway asks of an external model — chat completion
//! (optionally with image attachments), speech-to-text, and text-to-speech —
//! goes through the [`Provider`] trait. The pipeline stages hold an
//! `Arc<dyn Provider>` constructed once at startup and never re-initialised;
//! the concrete implementation ([`GroqProvider`]) keeps no per-call mutable
//! state, so the same handle is shared by every in-flight request.
//!
//! Keeping the trait this narrow has two payoffs: the pipeline stages can be
//! unit-tested against scripted stand-ins without any network, and swapping
//! the backing vendor touches exactly one module.

pub mod groq;

pub use groq::GroqProvider;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

// ── Errors ───────────────────────────────────────────────────────────────

/// Failures of the external AI capability.
///
/// These never cross the gateway surface as hard errors; pipeline stages
/// translate them into per-operation placeholder values and log the cause.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credential was configured for the provider.
    #[error("API key not configured")]
    MissingApiKey,

    /// The HTTP round trip itself failed (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider's reply did not have the expected shape.
    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    /// The provider answered successfully but with nothing usable in it.
    #[error("Provider response contained no choices")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Http(e.to_string())
    }
}

// ── Messages ─────────────────────────────────────────────────────────────

/// Message author role, serialised lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A base64-encoded image attachment for vision-capable chat calls.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Base64 payload (no data-URI prefix; the wire layer adds it).
    pub data: String,
    /// MIME type, e.g. `image/jpeg`.
    pub mime_type: String,
}

impl ImageData {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Wrap raw bytes as a base64 attachment.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        Self::new(STANDARD.encode(bytes), mime_type)
    }

    /// Render as the `data:` URI the OpenAI-compatible APIs expect.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// One turn of a model conversation, with optional image attachments.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub images: Vec<ImageData>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// User turn carrying image attachments (vision calls).
    pub fn user_with_images(content: impl Into<String>, images: Vec<ImageData>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            images,
        }
    }
}

// ── Options and results ──────────────────────────────────────────────────

/// Per-call completion knobs. Each pipeline stage sets only what it needs.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Maximum tokens the model may generate.
    pub max_tokens: Option<usize>,
    /// Ask the provider for a strict JSON-object reply.
    pub json_object: bool,
}

/// A completed chat call: the reply plus token accounting.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub content: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

// ── Speech streaming ─────────────────────────────────────────────────────

/// One frame of a synthesized-speech stream.
///
/// Providers may interleave non-audio frames (timing marks, word
/// boundaries) with the audio itself; [`crate::pipeline::SpeechSynthesizer`]
/// keeps only the audio-bearing frames, in stream order.
#[derive(Debug, Clone)]
pub enum SpeechChunk {
    /// A run of encoded audio bytes.
    Audio(Bytes),
    /// Provider-specific metadata; carried for logging, never concatenated.
    Metadata(String),
}

/// A boxed stream of speech frames.
pub type SpeechStream = Pin<Box<dyn Stream<Item = Result<SpeechChunk, ProviderError>> + Send>>;

// ── The capability trait ─────────────────────────────────────────────────

/// An external AI capability, treated as opaque and possibly unreliable.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider identifier for logs.
    fn name(&self) -> &str;

    /// Run a chat completion. Messages may carry image attachments; the
    /// implementation routes those to its vision-capable model.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<ChatCompletion, ProviderError>;

    /// Transcribe an audio buffer to text. `filename` is a hint for the
    /// upload (its extension tells the provider the container format).
    async fn transcribe(&self, audio: &[u8], filename: &str) -> Result<String, ProviderError>;

    /// Open a synthesized-speech stream for `text` in the given voice.
    async fn speak(&self, text: &str, voice: &str) -> Result<SpeechStream, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_role_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&ChatRole::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(
            serde_json::from_str::<ChatRole>("\"system\"").unwrap(),
            ChatRole::System
        );
    }

    #[test]
    fn image_data_uri_carries_mime_and_payload() {
        let img = ImageData::from_bytes(b"abc", "image/jpeg");
        let uri = img.to_data_uri();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert!(uri.ends_with("YWJj"));
    }

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(ChatMessage::system("s").role, ChatRole::System);
        assert_eq!(ChatMessage::user("u").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("a").role, ChatRole::Assistant);
        let m = ChatMessage::user_with_images("", vec![ImageData::new("x", "image/png")]);
        assert_eq!(m.images.len(), 1);
    }
}
