//! Pipeline stages for the education gateway.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets the router
//! compose them per endpoint without any stage knowing about HTTP.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ extract ──▶ rewrite ─▶ {rewritten_text, image_prompt}
//! (multi-modal) (text)   ├─▶ quiz ───▶ {questions}
//!                        ├─▶ speech ─▶ audio bytes
//!                        └─▶ chat ───▶ persona reply
//! ```
//!
//! 1. [`extract`]    — normalise a typed input (text, PDF page, image,
//!    audio) to a single plain-text string
//! 2. [`rewrite`]    — culturally-adapted simplification + image prompt
//! 3. [`quiz`]       — fixed-size multiple-choice quiz
//! 4. [`speech`]     — synthesized speech, audio frames only
//! 5. [`chat`]       — Socratic tutoring persona
//! 6. [`structured`] — lenient decoding of model JSON replies, shared by
//!    the stages that request machine-parseable output

pub mod chat;
pub mod extract;
pub mod quiz;
pub mod rewrite;
pub mod speech;
pub mod structured;

/// Diagnostic placeholder emitted by AI-facing stages when no provider
/// credential is configured. Kept byte-for-byte stable: clients match on it.
pub const NO_API_KEY: &str = "Error: No API Key";

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted [`Provider`] stand-ins for stage unit tests.

    use crate::provider::{
        ChatCompletion, ChatMessage, CompletionOptions, Provider, ProviderError, SpeechChunk,
        SpeechStream,
    };
    use async_trait::async_trait;

    /// A provider whose every capability is scripted in advance.
    ///
    /// `None` scripts make the corresponding capability fail with an API
    /// error, which is how stage tests exercise the degradation paths.
    pub struct StubProvider {
        pub chat_reply: Option<String>,
        pub transcript: Option<String>,
        pub speech_frames: Option<Vec<SpeechChunk>>,
        /// When set, the speech stream yields its frames then an error.
        pub fail_mid_stream: bool,
    }

    impl StubProvider {
        pub fn unreachable() -> Self {
            Self {
                chat_reply: None,
                transcript: None,
                speech_frames: None,
                fail_mid_stream: false,
            }
        }

        pub fn chatting(reply: impl Into<String>) -> Self {
            Self {
                chat_reply: Some(reply.into()),
                ..Self::unreachable()
            }
        }

        pub fn transcribing(text: impl Into<String>) -> Self {
            Self {
                transcript: Some(text.into()),
                ..Self::unreachable()
            }
        }

        pub fn speaking(frames: Vec<SpeechChunk>) -> Self {
            Self {
                speech_frames: Some(frames),
                ..Self::unreachable()
            }
        }

        fn api_error() -> ProviderError {
            ProviderError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            }
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<ChatCompletion, ProviderError> {
            match &self.chat_reply {
                Some(content) => Ok(ChatCompletion {
                    content: content.clone(),
                    prompt_tokens: 0,
                    completion_tokens: 0,
                }),
                None => Err(Self::api_error()),
            }
        }

        async fn transcribe(
            &self,
            _audio: &[u8],
            _filename: &str,
        ) -> Result<String, ProviderError> {
            self.transcript.clone().ok_or_else(Self::api_error)
        }

        async fn speak(&self, _text: &str, _voice: &str) -> Result<SpeechStream, ProviderError> {
            let frames = self.speech_frames.clone().ok_or_else(Self::api_error)?;
            let mut items: Vec<Result<SpeechChunk, ProviderError>> =
                frames.into_iter().map(Ok).collect();
            if self.fail_mid_stream {
                items.push(Err(Self::api_error()));
            }
            Ok(Box::pin(tokio_stream::iter(items)))
        }
    }
}
