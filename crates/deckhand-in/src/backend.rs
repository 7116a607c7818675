//! Text-generation backends.
//!
//! The translator talks to a [`TextBackend`]: instructions plus one user
//! message in, raw text out. [`AnthropicBackend`] is the production
//! implementation; tests script their own.

use async_trait::async_trait;
use deckhand_core::DeckhandError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("json error: {0}")]
    Serde(String),
    #[error("missing api key: set DECKHAND_API_KEY or ANTHROPIC_API_KEY")]
    MissingApiKey,
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<BackendError> for DeckhandError {
    fn from(err: BackendError) -> Self {
        DeckhandError::BackendUnavailable(err.to_string())
    }
}

/// One completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instructions
    pub instructions: String,
    /// The user's message, verbatim
    pub query: String,
    pub temperature: f32,
}

#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Produce the raw response text for `request`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}

#[async_trait]
impl<T: TextBackend + ?Sized> TextBackend for Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        (**self).complete(request).await
    }
}

/// Connection settings for [`AnthropicBackend`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    /// `None` disables the client-side timeout.
    pub timeout: Option<Duration>,
    pub max_tokens: u32,
}

impl BackendConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Read settings from `DECKHAND_*` environment variables.
    ///
    /// The key comes from `DECKHAND_API_KEY`, falling back to
    /// `ANTHROPIC_API_KEY`. `DECKHAND_TIMEOUT_SECS=0` disables the timeout.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BackendError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("DECKHAND_API_KEY")
            .or_else(|| var("ANTHROPIC_API_KEY"))
            .ok_or(BackendError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(url) = var("DECKHAND_API_URL") {
            config.api_url = url;
        }
        if let Some(model) = var("DECKHAND_MODEL") {
            config.model = model;
        }
        if let Some(secs) = var("DECKHAND_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| BackendError::Config(format!("DECKHAND_TIMEOUT_SECS={:?}", secs)))?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(tokens) = var("DECKHAND_MAX_TOKENS") {
            config.max_tokens = tokens
                .trim()
                .parse()
                .map_err(|_| BackendError::Config(format!("DECKHAND_MAX_TOKENS={:?}", tokens)))?;
        }

        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

impl MessagesResponse {
    fn into_text(self) -> Option<String> {
        self.content.into_iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
    }
}

/// Messages API client. One attempt per call: a failed call surfaces as a
/// [`BackendError`] and nothing is retried here.
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    http: Client,
    config: BackendConfig,
}

impl AnthropicBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let mut builder =
            Client::builder().user_agent(concat!("deckhand/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

#[async_trait]
impl TextBackend for AnthropicBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: &request.instructions,
            messages: vec![Message {
                role: "user",
                content: &request.query,
            }],
            temperature: request.temperature,
        };

        debug!(model = %self.config.model, url = %self.config.api_url, "sending completion request");

        let res = self
            .http
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => res
                .json::<MessagesResponse>()
                .await
                .map_err(|e| BackendError::Serde(e.to_string()))?
                .into_text()
                .ok_or_else(|| BackendError::Serde("no text content in response".to_string())),
            StatusCode::UNAUTHORIZED => Err(BackendError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(BackendError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(BackendError::Http { status, body })
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Transport(e.to_string())
    }
}
