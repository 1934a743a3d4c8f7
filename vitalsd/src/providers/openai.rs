//! OpenAI-compatible chat completions adapter.

use async_trait::async_trait;
use serde_json::json;

use super::http::{HttpClient, HttpRequest};
use super::{Provider, ProviderKind, ProviderSettings, RawProviderResponse, send};
use crate::analysis::GenerationParams;
use crate::analysis::prompt::Prompt;
use crate::errors::Result;

pub struct OpenAiProvider<C> {
    client: C,
    settings: ProviderSettings,
}

impl<C: HttpClient> OpenAiProvider<C> {
    pub fn new(client: C, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    fn request(&self, prompt: &Prompt, params: GenerationParams) -> HttpRequest {
        HttpRequest {
            url: format!("{}/v1/chat/completions", self.settings.base_url),
            headers: vec![("authorization", format!("Bearer {}", self.settings.api_key))],
            body: json!({
                "model": self.settings.model,
                "max_tokens": params.max_tokens,
                "temperature": params.temperature,
                "messages": [{"role": "user", "content": prompt.as_str()}],
            }),
        }
    }
}

#[async_trait]
impl<C: HttpClient> Provider for OpenAiProvider<C> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    #[tracing::instrument(skip_all, fields(model = %self.settings.model, max_tokens = params.max_tokens))]
    async fn generate(&self, prompt: &Prompt, params: GenerationParams) -> Result<RawProviderResponse> {
        send(&self.client, self.request(prompt, params), self.settings.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SignalKind;
    use crate::providers::http::MockHttpClient;
    use std::time::Duration;

    fn provider(mock: MockHttpClient) -> OpenAiProvider<MockHttpClient> {
        OpenAiProvider::new(
            mock,
            ProviderSettings {
                base_url: "https://llm.internal".into(),
                model: "gpt-4o-mini".into(),
                api_key: "sk-test".into(),
                timeout: Duration::from_secs(7),
            },
        )
    }

    #[tokio::test]
    async fn test_chat_completions_request() {
        let mock = MockHttpClient::new();
        mock.add_json(json!({"choices": [{"message": {"role": "assistant", "content": "Glukoz dengeli."}}]}));

        let raw = provider(mock.clone())
            .generate(&Prompt::new("glukoz yorumla"), SignalKind::Glucose.generation_params())
            .await
            .unwrap();
        assert_eq!(raw.0["choices"][0]["message"]["content"], "Glukoz dengeli.");

        let calls = mock.get_calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.request.url, "https://llm.internal/v1/chat/completions");
        assert_eq!(call.request.headers, vec![("authorization", "Bearer sk-test".to_string())]);
        assert_eq!(call.request.body["model"], "gpt-4o-mini");
        assert_eq!(call.request.body["max_tokens"], 512);
        assert_eq!(call.request.body["temperature"], 0.7);
        assert_eq!(call.request.body["messages"][0]["content"], "glukoz yorumla");
        assert_eq!(call.timeout, Duration::from_secs(7));
    }
}
