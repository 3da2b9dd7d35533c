//! Configuration types for PDF question answering.
//!
//! All session behaviour is controlled through [`QaConfig`], built via its
//! [`QaConfigBuilder`]. The credential lives here too, as an explicit
//! [`ApiKey`] value that the completion client receives at construction;
//! nothing below the CLI reads the environment on its own.

use crate::error::PdfQaError;
use std::fmt;
use std::time::Duration;

/// Environment variable holding the chat-completion API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI-compatible API root. `/chat/completions` is appended.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Opaque API credential.
///
/// `Debug` never prints the secret, so configs can be logged freely.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key. Blank keys are rejected.
    pub fn new(key: impl Into<String>) -> Result<Self, PdfQaError> {
        Self::from_value(Some(key.into()))
    }

    /// Read the key from [`API_KEY_ENV`].
    pub fn from_env() -> Result<Self, PdfQaError> {
        Self::from_value(std::env::var(API_KEY_ENV).ok())
    }

    /// Validate a possibly-missing raw value.
    pub fn from_value(value: Option<String>) -> Result<Self, PdfQaError> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => Ok(Self(v)),
            _ => Err(PdfQaError::MissingApiKey {
                var: API_KEY_ENV.to_string(),
            }),
        }
    }

    /// The raw secret, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Configuration for a question-answering session.
///
/// # Example
/// ```rust
/// use edgequake_pdfqa::{ApiKey, QaConfig};
///
/// let config = QaConfig::builder()
///     .api_key(ApiKey::new("sk-test").unwrap())
///     .model("gpt-4o-mini")
///     .max_attempts(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 150);
/// ```
#[derive(Clone)]
pub struct QaConfig {
    /// Credential sent as `Authorization: Bearer …`. Required by `build()`.
    pub api_key: Option<ApiKey>,

    /// Chat model identifier. Default: `gpt-3.5-turbo`.
    pub model: String,

    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,

    /// Maximum tokens generated per answer. Default: 150.
    pub max_tokens: u32,

    /// Sampling temperature. Range 0.0–2.0. Default: 0.7.
    pub temperature: f32,

    /// Total request attempts per question, counting the first. Default: 5.
    ///
    /// Only HTTP 429 is retried; every other failure ends the call at once.
    pub max_attempts: u32,

    /// Wait before the first retry. Doubles after each 429. Default: 5 s.
    pub initial_backoff: Duration,

    /// Per-attempt HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Reject prompts longer than this many characters. Default: no limit.
    pub max_prompt_chars: Option<usize>,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 150,
            temperature: 0.7,
            max_attempts: 5,
            initial_backoff: Duration::from_secs(5),
            api_timeout_secs: 60,
            password: None,
            max_prompt_chars: None,
        }
    }
}

impl fmt::Debug for QaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QaConfig")
            .field("api_key", &self.api_key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_attempts", &self.max_attempts)
            .field("initial_backoff", &self.initial_backoff)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_prompt_chars", &self.max_prompt_chars)
            .finish()
    }
}

impl QaConfig {
    /// Create a new builder for `QaConfig`.
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the chat-completion endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Builder for [`QaConfig`].
#[derive(Debug)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.config.api_key = Some(key);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    /// Clamped to 0.0–2.0 by [`build`](Self::build); NaN and infinities are rejected there.
    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn initial_backoff(mut self, delay: Duration) -> Self {
        self.config.initial_backoff = delay;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn max_prompt_chars(mut self, n: usize) -> Self {
        self.config.max_prompt_chars = Some(n);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<QaConfig, PdfQaError> {
        if !self.config.temperature.is_finite() {
            return Err(PdfQaError::InvalidConfig(format!(
                "Temperature must be a finite number, got {}",
                self.config.temperature
            )));
        }
        self.config.temperature = self.config.temperature.clamp(0.0, 2.0);

        let c = &self.config;
        if c.api_key.is_none() {
            return Err(PdfQaError::MissingApiKey {
                var: API_KEY_ENV.to_string(),
            });
        }
        if c.model.trim().is_empty() {
            return Err(PdfQaError::InvalidConfig("Model must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(PdfQaError::InvalidConfig(format!(
                "Base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if c.max_attempts == 0 {
            return Err(PdfQaError::InvalidConfig("Max attempts must be ≥ 1".into()));
        }
        if c.max_tokens == 0 {
            return Err(PdfQaError::InvalidConfig("Max tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(PdfQaError::InvalidConfig("API timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}
