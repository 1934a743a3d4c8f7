//! Text-generation provider adapters.
//!
//! Every backend implements [`Provider`]: take a prompt plus sampling parameters, return the
//! provider's JSON reply untouched. Pulling the interpretation text out of that reply is the job of
//! [`response::normalize`], keyed by [`ProviderKind`].
//!
//! | Kind | Endpoint | Reply shape |
//! |---|---|---|
//! | [`ProviderKind::Anthropic`] | `POST /v1/messages` | `content: [{type, text}]` |
//! | [`ProviderKind::OpenAi`] | `POST /v1/chat/completions` | `choices: [{message: {content}}]` |
//! | [`ProviderKind::HuggingFace`] | `POST /models/{model}` | `[{generated_text}]` |
//!
//! The adapter is chosen once from configuration at startup. Transport failures, timeouts, non-2xx
//! statuses and non-JSON bodies all surface as [`Error::Provider`]; there are no retries.

pub mod anthropic;
pub mod http;
pub mod huggingface;
pub mod openai;
pub mod response;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::GenerationParams;
use crate::analysis::prompt::Prompt;
use crate::config::Config;
use crate::errors::{Error, Result};
use http::{HttpClient, HttpRequest, ReqwestHttpClient};

pub use anthropic::AnthropicProvider;
pub use huggingface::HuggingFaceProvider;
pub use openai::OpenAiProvider;

/// Which wire protocol a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Chat messages returning a list of content blocks
    Anthropic,
    /// Chat completions returning a list of choices
    OpenAi,
    /// Plain text generation returning a list of generations
    HuggingFace,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::HuggingFace => "huggingface",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider reply as parsed JSON, before text extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProviderResponse(pub Value);

/// A text-generation backend.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Send `prompt` and return the provider's raw JSON reply.
    async fn generate(&self, prompt: &Prompt, params: GenerationParams) -> Result<RawProviderResponse>;
}

/// Connection settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL without trailing slash
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    /// Settings from `config`, or `None` when no credential is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.credential()?;
        Some(Self {
            base_url: config.provider.base_url().as_str().trim_end_matches('/').to_string(),
            model: config.provider.model().to_string(),
            api_key: api_key.to_string(),
            timeout: config.request_timeout,
        })
    }
}

/// Build the configured provider on the production HTTP client.
pub fn build_provider(config: &Config) -> Option<Arc<dyn Provider>> {
    build_provider_with_client(config, ReqwestHttpClient::new())
}

/// Build the configured provider on `client`. `None` when no credential is configured.
pub fn build_provider_with_client<C>(config: &Config, client: C) -> Option<Arc<dyn Provider>>
where
    C: HttpClient + 'static,
{
    let settings = ProviderSettings::from_config(config)?;
    let provider: Arc<dyn Provider> = match config.provider.kind() {
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(client, settings)),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(client, settings)),
        ProviderKind::HuggingFace => Arc::new(HuggingFaceProvider::new(client, settings)),
    };
    Some(provider)
}

/// Execute `request` and parse a successful reply as JSON.
pub(crate) async fn send<C: HttpClient>(client: &C, request: HttpRequest, timeout: Duration) -> Result<RawProviderResponse> {
    let response = client.execute(&request, timeout).await?;

    if !(200..300).contains(&response.status) {
        return Err(Error::Provider {
            message: format!("HTTP {} - {}", response.status, excerpt(&response.body)),
        });
    }

    let body = serde_json::from_str::<Value>(&response.body).map_err(|e| Error::Provider {
        message: format!("Failed to parse response as JSON: {e}. Response body: {}", excerpt(&response.body)),
    })?;

    Ok(RawProviderResponse(body))
}

// Provider error pages can be large; logs only need the start
fn excerpt(body: &str) -> &str {
    const MAX: usize = 512;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
