//! # lessonloom
//!
//! A culturally-adaptive education gateway: multi-modal content in,
//! rewritten lessons, quizzes, synthesized speech, and a tutoring persona
//! out.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (text / PDF page / image / audio)
//!  │
//!  ├─ 1. Extract  normalise to one plain-text string
//!  │              (PDF text layer, vision description, transcription)
//!  ├─ 2. Rewrite  simplified explanation + image prompt for a culture
//!  ├─ 3. Quiz     3 conceptual questions, 4 options each
//!  ├─ 4. Speech   streamed TTS frames → one audio clip
//!  └─ 5. Chat     Socratic mentor persona over caller-owned history
//! ```
//!
//! Every AI capability flows through one [`provider::Provider`] handle,
//! constructed once at startup and shared read-only by all requests. A
//! missing credential never prevents startup — AI-dependent operations
//! degrade to documented placeholder values instead, while caller mistakes
//! (no input, unsupported media type, nothing extractable) surface as 4xx
//! responses.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lessonloom::{run_server, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     // Credential read from GROQ_API_KEY; absence degrades gracefully.
//!     let config = GatewayConfig::from_env();
//!     run_server(&config).await
//! }
//! ```
//!
//! The pipeline stages are also usable directly, without the HTTP surface:
//!
//! ```rust,no_run
//! use lessonloom::pipeline::rewrite::ContentRewriter;
//! use lessonloom::GatewayConfig;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = GatewayConfig::from_env();
//! let rewriter = ContentRewriter::new(config.resolve_provider());
//! let result = rewriter
//!     .rewrite("Photosynthesis converts light to energy", "rural Kenya")
//!     .await;
//! println!("{}", result.rewritten_text);
//! # }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use error::GatewayError;
pub use pipeline::chat::{ChatTurn, PersonaChat};
pub use pipeline::extract::{ExtractError, InputPayload, TextExtractor};
pub use pipeline::quiz::{Quiz, QuizGenerator, QuizQuestion};
pub use pipeline::rewrite::{ContentRewriter, RewriteResult};
pub use pipeline::speech::SpeechSynthesizer;
pub use provider::{Provider, ProviderError};
pub use server::{run_server, AppState};

#[cfg(test)]
pub(crate) mod test_fixtures {
    //! In-memory PDF fixtures for unit tests.

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a valid PDF with one page per entry of `pages`, each carrying
    /// its text in the page's text layer.
    pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = pages
            .iter()
            .map(|text| {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 24.into()]),
                        Operation::new("Td", vec![72.into(), 720.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id = doc.add_object(Stream::new(
                    dictionary! {},
                    content.encode().expect("encode page content"),
                ));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                });
                page_id.into()
            })
            .collect();

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("serialise PDF");
        buf
    }
}
