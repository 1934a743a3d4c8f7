//! Anthropic messages API adapter.

use async_trait::async_trait;
use serde_json::json;

use super::http::{HttpClient, HttpRequest};
use super::{Provider, ProviderKind, ProviderSettings, RawProviderResponse, send};
use crate::analysis::GenerationParams;
use crate::analysis::prompt::Prompt;
use crate::errors::Result;

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider<C> {
    client: C,
    settings: ProviderSettings,
}

impl<C: HttpClient> AnthropicProvider<C> {
    pub fn new(client: C, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    fn request(&self, prompt: &Prompt, params: GenerationParams) -> HttpRequest {
        HttpRequest {
            url: format!("{}/v1/messages", self.settings.base_url),
            headers: vec![
                ("x-api-key", self.settings.api_key.clone()),
                ("anthropic-version", API_VERSION.to_string()),
            ],
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
impl<C: HttpClient> Provider for AnthropicProvider<C> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
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
    use crate::errors::Error;
    use crate::providers::http::ReqwestHttpClient;
    use serde_json::Value;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> ProviderSettings {
        ProviderSettings {
            base_url,
            model: "claude-3-opus-20240229".into(),
            api_key: "sk-ant-test".into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_messages_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "model": "claude-3-opus-20240229",
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": "nabız yorumla"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "Nabzınız normal."}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(ReqwestHttpClient::new(), settings(server.uri()));
        let raw = provider
            .generate(&Prompt::new("nabız yorumla"), SignalKind::HeartRate.generation_params())
            .await
            .unwrap();

        assert_eq!(raw.0["content"][0]["text"], Value::from("Nabzınız normal."));
    }

    #[tokio::test]
    async fn test_overloaded_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(ReqwestHttpClient::new(), settings(server.uri()));
        let err = provider
            .generate(&Prompt::new("x"), SignalKind::Ecg.generation_params())
            .await
            .unwrap_err();

        match err {
            Error::Provider { message } => assert!(message.contains("529"), "{message}"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
