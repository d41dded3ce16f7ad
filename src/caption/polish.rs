//! External caption polishing.
//!
//! The polisher turns a recognized gloss into a natural sentence. It is the
//! only component allowed to wait on the network, and every failure it
//! reports is recovered by the translator's template fallback.

use crate::config::{CaptionStyle, PolishConfig};
use crate::recognition::token::PhraseToken;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a polish attempt produced no caption.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolishError {
    #[error("polishing service unavailable: {0}")]
    Unavailable(String),

    #[error("polishing timed out after {0:?}")]
    Timeout(Duration),

    #[error("polishing request failed: {0}")]
    Request(String),

    #[error("polishing service returned an empty caption")]
    EmptyResponse,
}

/// Trait for external caption polishing.
///
/// This trait allows swapping implementations (HTTP service vs mock).
#[async_trait::async_trait]
pub trait Polisher: Send + Sync {
    /// Produce caption text for `token` in the requested `style`.
    async fn polish(&self, token: PhraseToken, style: CaptionStyle) -> Result<String, PolishError>;

    /// Name for logging.
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl<T: Polisher + ?Sized> Polisher for Arc<T> {
    async fn polish(&self, token: PhraseToken, style: CaptionStyle) -> Result<String, PolishError> {
        (**self).polish(token, style).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Polisher used when polishing is switched off; always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPolisher;

#[async_trait::async_trait]
impl Polisher for DisabledPolisher {
    async fn polish(&self, _token: PhraseToken, _style: CaptionStyle) -> Result<String, PolishError> {
        Err(PolishError::Unavailable("polishing disabled".to_string()))
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

const SYSTEM_PROMPT: &str = "You are a sign language caption generator. Your job is to convert \
sign language glosses into natural English captions. Rules:\n\
1. NEVER add information not in the gloss\n\
2. NEVER hallucinate context or meaning\n\
3. Keep concise style under 12 words\n\
4. Keep detailed style under 20 words\n\
5. Be natural and conversational";

/// User prompt for one gloss.
pub fn build_prompt(token: PhraseToken, style: CaptionStyle) -> String {
    format!(
        "Convert this sign language gloss to {} English:\nGloss: {}\nOutput only the caption, no explanations.",
        style.as_str(),
        token.as_str()
    )
}

/// OpenAI-compatible chat-completions polisher.
#[cfg(feature = "llm")]
pub struct HttpPolisher {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

#[cfg(feature = "llm")]
impl HttpPolisher {
    /// Builds a polisher from configuration, reading the API key from the
    /// configured environment variable. A missing key is not an error here;
    /// every call then reports `Unavailable`.
    pub fn from_config(config: &PolishConfig) -> crate::error::Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::error::SigncapError::Other(format!("HTTP client: {}", e)))?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    fn request_body(&self, token: PhraseToken, style: CaptionStyle) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(token, style)},
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

#[cfg(feature = "llm")]
#[async_trait::async_trait]
impl Polisher for HttpPolisher {
    async fn polish(&self, token: PhraseToken, style: CaptionStyle) -> Result<String, PolishError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PolishError::Unavailable("no API key configured".to_string()))?;

        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&self.request_body(token, style))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PolishError::Timeout(self.timeout)
                } else if e.is_connect() {
                    PolishError::Unavailable(e.to_string())
                } else {
                    PolishError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(PolishError::Request(format!("HTTP {}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PolishError::Request(e.to_string()))?;
        extract_caption(&json)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Pulls the first choice's message text out of a chat-completions response.
pub fn extract_caption(json: &serde_json::Value) -> Result<String, PolishError> {
    let caption = json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or_default();
    if caption.is_empty() {
        Err(PolishError::EmptyResponse)
    } else {
        Ok(caption.to_string())
    }
}

/// Builds the polisher the configuration asks for.
pub fn polisher_from_config(config: &PolishConfig) -> crate::error::Result<Arc<dyn Polisher>> {
    if !config.enabled {
        return Ok(Arc::new(DisabledPolisher));
    }
    #[cfg(feature = "llm")]
    {
        Ok(Arc::new(HttpPolisher::from_config(config)?))
    }
    #[cfg(not(feature = "llm"))]
    {
        tracing::warn!("polishing enabled but built without the `llm` feature");
        Ok(Arc::new(DisabledPolisher))
    }
}

/// Mock polisher for testing
#[derive(Debug, Clone)]
pub struct MockPolisher {
    response: Option<String>,
    failure: Option<PolishError>,
    delay: Duration,
}

impl Default for MockPolisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPolisher {
    /// Echoes `"<gloss> (<style>)"` for every call.
    pub fn new() -> Self {
        Self {
            response: None,
            failure: None,
            delay: Duration::ZERO,
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    /// Configure the mock to fail with `error`
    pub fn with_failure(mut self, error: PolishError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Configure the mock to wait before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl Polisher for MockPolisher {
    async fn polish(&self, token: PhraseToken, style: CaptionStyle) -> Result<String, PolishError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| format!("{} ({})", token, style.as_str())))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
