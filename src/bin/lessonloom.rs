//! Server binary for lessonloom.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GatewayConfig` and runs the HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use lessonloom::{run_server, GatewayConfig};
use std::io;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address (0.0.0.0:8000)
  GROQ_API_KEY=gsk_... lessonloom

  # Local development bind with debug logs
  lessonloom --bind 127.0.0.1:9000 --verbose

  # Override the chat model
  lessonloom --chat-model llama-3.1-8b-instant

ENVIRONMENT VARIABLES:
  GROQ_API_KEY            Provider credential. When unset the server still
                          starts; AI-dependent endpoints return diagnostic
                          placeholders instead of results.
  LESSONLOOM_BIND         Listen address (host:port)
  LESSONLOOM_BASE_URL     Provider API root (for proxies and tests)

ENDPOINTS:
  GET  /          liveness probe
  POST /rewrite   multipart: file|text_input, culture, page_number
  POST /tts       {"text", "voice"} -> audio/mpeg bytes
  POST /quiz      {"text"} -> {"questions": [...]}
  POST /chat      {"message", "history", "context", "culture"}
"#;

/// Culturally-adaptive education gateway.
#[derive(Parser, Debug)]
#[command(
    name = "lessonloom",
    version,
    about = "Serve the lessonloom education gateway",
    long_about = "Accepts educational content (text, PDF, image, or audio), extracts or \
transcribes it to plain text, and routes it through an LLM provider to produce a \
culturally-adapted rewrite, a quiz, synthesized speech, and a tutoring persona.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Listen address (host:port).
    #[arg(long, env = "LESSONLOOM_BIND", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Provider API root. Point at a proxy or stand-in server if needed.
    #[arg(long, env = "LESSONLOOM_BASE_URL")]
    base_url: Option<String>,

    /// Chat-completion model id.
    #[arg(long, env = "LESSONLOOM_CHAT_MODEL")]
    chat_model: Option<String>,

    /// Vision model id (used for image uploads).
    #[arg(long, env = "LESSONLOOM_VISION_MODEL")]
    vision_model: Option<String>,

    /// Speech-to-text model id (used for audio uploads).
    #[arg(long, env = "LESSONLOOM_TRANSCRIPTION_MODEL")]
    transcription_model: Option<String>,

    /// Text-to-speech model id.
    #[arg(long, env = "LESSONLOOM_SPEECH_MODEL")]
    speech_model: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LESSONLOOM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LESSONLOOM_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    // Start from the environment (credential pickup + warning), then apply
    // CLI overrides.
    let mut config = GatewayConfig::from_env();
    config.bind = cli.bind;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(model) = cli.chat_model {
        config.chat_model = model;
    }
    if let Some(model) = cli.vision_model {
        config.vision_model = model;
    }
    if let Some(model) = cli.transcription_model {
        config.transcription_model = model;
    }
    if let Some(model) = cli.speech_model {
        config.speech_model = model;
    }

    // ── Serve ────────────────────────────────────────────────────────────
    run_server(&config)
        .await
        .with_context(|| format!("Failed to serve on {}", config.bind))
}
