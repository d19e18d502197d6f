//! Configuration for the gateway process.
//!
//! All runtime behaviour is controlled through [`GatewayConfig`], built via
//! its [`GatewayConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across handlers and to stand up a fully
//! wired gateway inside a test with nothing but a builder chain.
//!
//! The one required external credential (`GROQ_API_KEY`) is read from the
//! process environment at startup. Its absence does **not** prevent
//! startup: the provider handle simply stays unconfigured and every
//! AI-dependent operation degrades to its documented diagnostic value.

use crate::error::GatewayError;
use crate::provider::{groq, GroqProvider, Provider};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Gateway configuration.
///
/// Built via [`GatewayConfig::builder()`], [`GatewayConfig::default()`], or
/// [`GatewayConfig::from_env()`].
///
/// # Example
/// ```rust
/// use lessonloom::GatewayConfig;
///
/// let config = GatewayConfig::builder()
///     .bind("127.0.0.1:9000")
///     .api_key("gsk_test")
///     .build()
///     .unwrap();
/// assert_eq!(config.bind, "127.0.0.1:9000");
/// ```
#[derive(Clone)]
pub struct GatewayConfig {
    /// Listen address for the HTTP surface. Default: `0.0.0.0:8000`.
    pub bind: String,

    /// Provider credential. `None` degrades every AI-dependent endpoint to
    /// its fixed diagnostic response instead of failing startup.
    pub api_key: Option<String>,

    /// API root for the provider. Overridable so tests can point the whole
    /// gateway at a local stand-in server.
    pub base_url: String,

    /// Chat-completion model id.
    pub chat_model: String,

    /// Vision model id, used when a message carries image attachments.
    pub vision_model: String,

    /// Speech-to-text model id.
    pub transcription_model: String,

    /// Text-to-speech model id.
    pub speech_model: String,

    /// Pre-constructed provider. Takes precedence over `api_key`; the seam
    /// tests and embedders use to inject a scripted provider.
    pub provider: Option<Arc<dyn Provider>>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            api_key: None,
            base_url: groq::DEFAULT_BASE_URL.to_string(),
            chat_model: groq::DEFAULT_CHAT_MODEL.to_string(),
            vision_model: groq::DEFAULT_VISION_MODEL.to_string(),
            transcription_model: groq::DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            speech_model: groq::DEFAULT_SPEECH_MODEL.to_string(),
            provider: None,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bind", &self.bind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("vision_model", &self.vision_model)
            .field("transcription_model", &self.transcription_model)
            .field("speech_model", &self.speech_model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn Provider>"))
            .finish()
    }
}

impl GatewayConfig {
    /// Create a new builder for `GatewayConfig`.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the process environment.
    ///
    /// Reads [`API_KEY_ENV`]; an unset or empty value leaves the provider
    /// unconfigured (with a warning) rather than aborting.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!(
                "{} is not set; AI-dependent endpoints will return diagnostic placeholders",
                API_KEY_ENV
            );
        }
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Resolve the provider handle, from most-specific to least-specific:
    ///
    /// 1. A pre-built provider (`config.provider`) is used as-is.
    /// 2. A configured credential constructs a [`GroqProvider`] with this
    ///    config's base URL and model ids.
    /// 3. Otherwise `None` — the pipeline stages degrade per operation.
    pub fn resolve_provider(&self) -> Option<Arc<dyn Provider>> {
        if let Some(ref provider) = self.provider {
            return Some(Arc::clone(provider));
        }
        let api_key = self.api_key.as_ref()?;
        Some(Arc::new(
            GroqProvider::new(api_key.clone())
                .with_base_url(self.base_url.clone())
                .with_chat_model(self.chat_model.clone())
                .with_vision_model(self.vision_model.clone())
                .with_transcription_model(self.transcription_model.clone())
                .with_speech_model(self.speech_model.clone()),
        ))
    }
}

/// Builder for [`GatewayConfig`].
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn bind(mut self, bind: impl Into<String>) -> Self {
        self.config.bind = bind.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.config.chat_model = model.into();
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn transcription_model(mut self, model: impl Into<String>) -> Self {
        self.config.transcription_model = model.into();
        self
    }

    pub fn speech_model(mut self, model: impl Into<String>) -> Self {
        self.config.speech_model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GatewayConfig, GatewayError> {
        let c = &self.config;
        if !c.bind.contains(':') {
            return Err(GatewayError::InvalidConfig(format!(
                "bind address must be host:port, got '{}'",
                c.bind
            )));
        }
        if c.base_url.is_empty() {
            return Err(GatewayError::InvalidConfig(
                "base_url must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
