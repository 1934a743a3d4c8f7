//! Hugging Face text-generation inference adapter.

use async_trait::async_trait;
use serde_json::json;

use super::http::{HttpClient, HttpRequest};
use super::{Provider, ProviderKind, ProviderSettings, RawProviderResponse, send};
use crate::analysis::GenerationParams;
use crate::analysis::prompt::Prompt;
use crate::errors::Result;

pub struct HuggingFaceProvider<C> {
    client: C,
    settings: ProviderSettings,
}

impl<C: HttpClient> HuggingFaceProvider<C> {
    pub fn new(client: C, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    fn request(&self, prompt: &Prompt, params: GenerationParams) -> HttpRequest {
        HttpRequest {
            url: format!("{}/models/{}", self.settings.base_url, self.settings.model),
            headers: vec![("authorization", format!("Bearer {}", self.settings.api_key))],
            body: json!({
                "inputs": prompt.as_str(),
                "parameters": {
                    "max_new_tokens": params.max_tokens,
                    "temperature": params.temperature,
                    // Only the continuation, not the prompt echoed back
                    "return_full_text": false,
                },
            }),
        }
    }
}

#[async_trait]
impl<C: HttpClient> Provider for HuggingFaceProvider<C> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    #[tracing::instrument(skip_all, fields(model = %self.settings.model, max_tokens = params.max_tokens))]
    async fn generate(&self, prompt: &Prompt, params: GenerationParams) -> Result<RawProviderResponse> {
        send(&self.client, self.request(prompt, params), self.settings.timeout).await
    }
}
