//! Input normalisation: any supported upload becomes one plain-text string.
//!
//! The four input shapes are a closed enum rather than untyped content-type
//! strings, so adding a shape is a compile-time-checked exhaustive match.
//! Classification from a declared media type happens exactly once, in
//! [`InputPayload::from_upload`]; truly unrecognised types are the only hard
//! error this stage can produce.
//!
//! Extraction itself is deliberately soft: a PDF that will not parse, a page
//! without a text layer, or a failed vision/transcription call all come back
//! as strings (possibly empty) rather than errors, because downstream the
//! router treats "no text" as a caller-fixable condition and everything else
//! flows onward into rewriting. The out-of-range page message is part of the
//! wire contract and must stay byte-for-byte stable.

use crate::pipeline::NO_API_KEY;
use crate::prompts::IMAGE_DESCRIPTION_PROMPT;
use crate::provider::{ChatMessage, CompletionOptions, ImageData, Provider};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Filename hint for transcription uploads; the extension tells the
/// provider the container format.
const AUDIO_UPLOAD_NAME: &str = "audio.m4a";

/// Hard errors raised while classifying an upload.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The declared type is none of PDF / image / audio-like.
    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),
}

/// A typed gateway input. Exactly one variant per request.
#[derive(Debug, Clone)]
pub enum InputPayload {
    /// Caller-supplied text, passed through verbatim.
    RawText(String),
    /// A PDF document and a 1-indexed page to read.
    Pdf { bytes: Bytes, page_number: usize },
    /// An image to describe via the vision capability.
    Image(Bytes),
    /// An audio clip to transcribe.
    Audio(Bytes),
}

impl InputPayload {
    /// Classify an uploaded binary by its declared content type.
    ///
    /// The substring dispatch ("pdf", "image", "audio"/"mp4"/"mpeg") is the
    /// gateway's compatibility surface for browser-supplied types like
    /// `application/pdf`, `image/png`, or `audio/mp4`.
    pub fn from_upload(
        content_type: &str,
        bytes: Bytes,
        page_number: usize,
    ) -> Result<Self, ExtractError> {
        if content_type.contains("pdf") {
            Ok(InputPayload::Pdf { bytes, page_number })
        } else if content_type.contains("image") {
            Ok(InputPayload::Image(bytes))
        } else if content_type.contains("audio")
            || content_type.contains("mp4")
            || content_type.contains("mpeg")
        {
            Ok(InputPayload::Audio(bytes))
        } else {
            Err(ExtractError::UnsupportedMediaType(content_type.to_string()))
        }
    }
}

/// Normalises every [`InputPayload`] variant to plain text.
#[derive(Clone)]
pub struct TextExtractor {
    provider: Option<Arc<dyn Provider>>,
}

impl TextExtractor {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self { provider }
    }

    /// Produce a single plain-text string for the payload.
    ///
    /// Empty output means "nothing extractable"; the out-of-range PDF
    /// message is returned as content, not as an error.
    pub async fn extract(&self, payload: InputPayload) -> Result<String, ExtractError> {
        match payload {
            InputPayload::RawText(text) => Ok(text),
            InputPayload::Pdf { bytes, page_number } => Ok(extract_pdf_page(&bytes, page_number)),
            InputPayload::Image(bytes) => Ok(self.describe_image(&bytes).await),
            InputPayload::Audio(bytes) => Ok(self.transcribe_audio(&bytes).await),
        }
    }

    /// Vision description of an uploaded image.
    async fn describe_image(&self, bytes: &[u8]) -> String {
        let Some(provider) = &self.provider else {
            return NO_API_KEY.to_string();
        };

        let attachment = ImageData::from_bytes(bytes, "image/jpeg");
        let messages = [ChatMessage::user_with_images(
            IMAGE_DESCRIPTION_PROMPT,
            vec![attachment],
        )];
        let options = CompletionOptions {
            temperature: Some(0.5),
            max_tokens: Some(1024),
            json_object: false,
        };

        match provider.chat(&messages, &options).await {
            Ok(completion) => completion.content,
            Err(e) => {
                warn!("image description failed: {e}");
                String::new()
            }
        }
    }

    /// Speech-to-text for an uploaded audio clip.
    async fn transcribe_audio(&self, bytes: &[u8]) -> String {
        let Some(provider) = &self.provider else {
            return NO_API_KEY.to_string();
        };

        match provider.transcribe(bytes, AUDIO_UPLOAD_NAME).await {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!("audio transcription failed: {e}");
                String::new()
            }
        }
    }
}

/// Read the text layer of the 1-indexed `page_number` from an in-memory PDF.
///
/// * zero pages → empty string
/// * page out of `[1, page_count]` → the descriptive range message, as text
/// * page without a text layer → empty string
/// * unparsable bytes → empty string (logged)
fn extract_pdf_page(bytes: &[u8], page_number: usize) -> String {
    let pages = match pdf_extract::extract_text_from_mem_by_pages(bytes) {
        Ok(pages) => pages,
        Err(e) => {
            warn!("PDF parsing failed: {e}");
            return String::new();
        }
    };

    if pages.is_empty() {
        return String::new();
    }

    if page_number < 1 || page_number > pages.len() {
        return format!(
            "Error: Page {} out of range. Document has {} pages.",
            page_number,
            pages.len()
        );
    }

    let text = &pages[page_number - 1];
    if text.trim().is_empty() {
        // No text layer on this page.
        String::new()
    } else {
        text.clone()
    }
}
