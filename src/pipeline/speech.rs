//! Speech synthesis: text in, one contiguous audio byte sequence out.
//!
//! The provider exposes synthesis as a stream of frames which may interleave
//! non-audio metadata (timing marks, word boundaries) with the audio itself.
//! This stage concatenates only the audio-bearing frames, preserving stream
//! order, and never fails the request: any failure — missing credential,
//! refused call, or an error mid-stream — degrades to an empty byte
//! sequence, logged for the operator.

use crate::provider::{Provider, SpeechChunk};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Concatenates a provider speech stream into a single audio clip.
#[derive(Clone)]
pub struct SpeechSynthesizer {
    provider: Option<Arc<dyn Provider>>,
}

impl SpeechSynthesizer {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self { provider }
    }

    /// Synthesize `text` in `voice`. The voice identifier is passed through
    /// unvalidated; an unknown or empty voice is the provider's problem and
    /// degrades like any other failure.
    pub async fn synthesize(&self, text: &str, voice: &str) -> Bytes {
        let Some(provider) = &self.provider else {
            warn!("speech synthesis requested without a configured provider");
            return Bytes::new();
        };

        let mut stream = match provider.speak(text, voice).await {
            Ok(stream) => stream,
            Err(e) => {
                error!("speech synthesis failed to start: {e}");
                return Bytes::new();
            }
        };

        let mut audio = BytesMut::new();
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(SpeechChunk::Audio(chunk)) => audio.extend_from_slice(&chunk),
                Ok(SpeechChunk::Metadata(meta)) => {
                    debug!("discarding non-audio speech frame: {meta}")
                }
                Err(e) => {
                    error!("speech stream failed mid-way: {e}");
                    return Bytes::new();
                }
            }
        }

        audio.freeze()
    }
}
