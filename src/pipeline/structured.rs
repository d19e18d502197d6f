//! Lenient decoding of model JSON replies.
//!
//! Even when asked for strict JSON, models occasionally wrap their reply in
//! ``` fences, prepend a sentence of commentary, or append a sign-off. The
//! stages that need structured output funnel raw replies through
//! [`decode_json_object`], which applies two cheap deterministic recovery
//! passes before giving up:
//!
//! 1. strip an outer ``` / ```json fence pair
//! 2. if a direct parse fails, re-parse the widest `{ … }` slice
//!
//! Anything still unparsable is the caller's recoverable-error path; this
//! module never invents content.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n(.*)\n```\s*$").unwrap());

/// Decode a JSON object of type `T` from a raw model reply.
pub fn decode_json_object<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let stripped = strip_fences(raw.trim());

    match serde_json::from_str(stripped.trim()) {
        Ok(value) => Ok(value),
        Err(direct_err) => match widest_object_slice(&stripped) {
            Some(slice) => serde_json::from_str(slice),
            None => Err(direct_err),
        },
    }
}

/// Remove an outer markdown fence pair, if present.
fn strip_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

/// The slice from the first `{` to the last `}`, when both exist in order.
fn widest_object_slice(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    (end > start).then(|| &input[start..=end])
}
