//! Error types for the lessonloom gateway.
//!
//! Two distinct error tiers reflect two distinct failure modes:
//!
//! * [`GatewayError`] — **Caller-facing**: the request itself is wrong
//!   (no input supplied, unsupported media type, nothing extractable).
//!   Surfaced as a 4xx response with a descriptive message; the caller can
//!   fix it and retry.
//!
//! * [`crate::provider::ProviderError`] — **Provider-facing**: the external
//!   AI capability misbehaved (missing credential, network failure, garbled
//!   model output). Never propagated to the caller as a hard failure; each
//!   pipeline stage degrades to a well-defined placeholder value instead,
//!   and the underlying error is logged for operator visibility.
//!
//! The asymmetry is deliberate: input validation is the caller's problem to
//! fix, provider flakiness is not.

use crate::pipeline::extract::ExtractError;
use thiserror::Error;

/// Caller-facing errors returned by the gateway surface.
///
/// Provider-tier failures use [`crate::provider::ProviderError`] and are
/// absorbed inside pipeline results rather than propagated here.
#[derive(Debug, Error)]
pub enum GatewayError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Neither a file nor a text field was supplied to `/rewrite`.
    #[error("No file or text input provided.")]
    MissingInput,

    /// The uploaded binary's declared type is none of PDF / image / audio.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Extraction ran but produced an empty string.
    #[error("Could not extract text from input.")]
    EmptyExtraction,

    /// A multipart request was structurally malformed.
    #[error("Invalid multipart request: {0}")]
    MalformedMultipart(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
