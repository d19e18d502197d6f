//! Groq provider: the OpenAI-compatible REST surface over `reqwest`.
//!
//! One client object covers all four capabilities:
//!
//! * chat + vision — `POST {base}/chat/completions`; image attachments are
//!   sent as base64 `data:` URIs inside `image_url` content parts, and their
//!   presence switches the call to the vision model
//! * speech-to-text — `POST {base}/audio/transcriptions` (multipart upload,
//!   plain-text response)
//! * text-to-speech — `POST {base}/audio/speech` (JSON in, streamed audio
//!   bytes out)
//!
//! The `base_url` is configurable so the whole provider can be pointed at a
//! local stand-in server in tests.

use crate::provider::{
    ChatCompletion, ChatMessage, ChatRole, CompletionOptions, Provider, ProviderError,
    SpeechChunk, SpeechStream,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

/// Default API root for Groq's OpenAI-compatible endpoints.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model ids. Chat and vision are distinct because the versatile
/// text model does not accept image parts.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_VISION_MODEL: &str = "llama-3.2-11b-vision-preview";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-large-v3-turbo";
pub const DEFAULT_SPEECH_MODEL: &str = "playai-tts";

/// Groq-backed [`Provider`]. Cheap to clone behind an `Arc`; holds a single
/// connection-pooling `reqwest::Client` and no per-call state.
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    vision_model: String,
    transcription_model: String,
    speech_model: String,
}

impl GroqProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    pub fn with_transcription_model(mut self, model: impl Into<String>) -> Self {
        self.transcription_model = model.into();
        self
    }

    pub fn with_speech_model(mut self, model: impl Into<String>) -> Self {
        self.speech_model = model.into();
        self
    }

    /// Turn a non-success response into `ProviderError::Api`, consuming the
    /// body as the message.
    async fn api_error(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ProviderError::Api { status, message }
    }
}

#[async_trait]
impl Provider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<ChatCompletion, ProviderError> {
        let has_images = messages.iter().any(|m| !m.images.is_empty());
        let model: &str = if has_images {
            &self.vision_model
        } else {
            &self.chat_model
        };

        let request = ChatRequest {
            model,
            messages: convert_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options.json_object.then_some(ResponseFormat {
                kind: "json_object",
            }),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let usage = parsed.usage.unwrap_or_default();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(ChatCompletion {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }

    async fn transcribe(&self, audio: &[u8], filename: &str) -> Result<String, ProviderError> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec()).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.transcription_model.clone())
            .text("response_format", "text");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response.text().await?)
    }

    async fn speak(&self, text: &str, voice: &str) -> Result<SpeechStream, ProviderError> {
        let request = SpeechRequest {
            model: self.speech_model.as_str(),
            voice,
            input: text,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(SpeechChunk::Audio).map_err(ProviderError::from));

        Ok(Box::pin(stream))
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct WireMessage {
    role: ChatRole,
    content: WireContent,
}

/// Plain messages serialise as a string; vision messages as content parts.
#[derive(Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireReply,
}

#[derive(Deserialize)]
struct WireReply {
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// Map gateway messages to the wire shape, expanding image attachments into
/// `image_url` content parts.
fn convert_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|m| {
            let content = if m.images.is_empty() {
                WireContent::Text(m.content.clone())
            } else {
                let mut parts = Vec::with_capacity(m.images.len() + 1);
                if !m.content.is_empty() {
                    parts.push(ContentPart::Text {
                        text: m.content.clone(),
                    });
                }
                parts.extend(m.images.iter().map(|img| ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: img.to_data_uri(),
                    },
                }));
                WireContent::Parts(parts)
            };
            WireMessage {
                role: m.role,
                content,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ImageData;

    #[test]
    fn plain_message_serialises_as_string_content() {
        let wire = convert_messages(&[ChatMessage::system("be brief")]);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[0]["content"], "be brief");
    }

    #[test]
    fn vision_message_expands_into_parts() {
        let msg = ChatMessage::user_with_images(
            "Describe this",
            vec![ImageData::new("QUJD", "image/jpeg")],
        );
        let json = serde_json::to_value(convert_messages(&[msg])).unwrap();
        let parts = json[0]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/jpeg;base64,QUJD"
        );
    }

    #[test]
    fn empty_text_is_omitted_from_vision_parts() {
        let msg = ChatMessage::user_with_images("", vec![ImageData::new("QUJD", "image/png")]);
        let json = serde_json::to_value(convert_messages(&[msg])).unwrap();
        let parts = json[0]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["type"], "image_url");
    }

    #[test]
    fn response_format_only_present_in_json_mode() {
        let req = ChatRequest {
            model: "m",
            messages: vec![],
            temperature: Some(0.5),
            max_tokens: Some(64),
            response_format: None,
            stream: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("response_format").is_none());

        let req = ChatRequest {
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
            ..req
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn chat_response_tolerates_missing_usage() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#,
        )
        .unwrap();
        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hi"));
    }
}
