//! Drives one request through validation, statistics, prompting and generation.

use serde_json::Value;

use super::prompt::build_prompt;
use super::stats::summarize;
use super::validate::validate;
use super::{AnalysisResult, SignalKind};
use crate::errors::Result;
use crate::providers::{Provider, response};

/// Interpret `body` as a `kind` signal using `provider`.
///
/// Validation and filtering failures return before the provider is called.
#[tracing::instrument(skip_all, fields(kind = %kind, provider = %provider.kind()))]
pub async fn analyze(provider: &dyn Provider, kind: SignalKind, body: &Value) -> Result<AnalysisResult> {
    let request = validate(kind, body)?;
    let summary = summarize(kind, &request.series(), &request.overrides())?;
    tracing::debug!(count = summary.count, average = summary.average, "Summarized series");

    let prompt = build_prompt(&request, &summary);
    let raw = provider.generate(&prompt, kind.generation_params()).await?;
    let reply = response::normalize(provider.kind(), &raw)?;

    tracing::info!(chars = reply.text.chars().count(), "Interpretation generated");

    Ok(AnalysisResult {
        kind,
        interpretation: reply.text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::providers::http::MockHttpClient;
    use crate::providers::{AnthropicProvider, HuggingFaceProvider, ProviderSettings};
    use serde_json::json;
    use std::time::Duration;

    fn settings() -> ProviderSettings {
        ProviderSettings {
            base_url: "https://provider.test".into(),
            model: "test-model".into(),
            api_key: "key".into(),
            timeout: Duration::from_secs(30),
        }
    }

    fn anthropic(mock: &MockHttpClient) -> AnthropicProvider<MockHttpClient> {
        AnthropicProvider::new(mock.clone(), settings())
    }

    #[tokio::test]
    async fn test_ecg_end_to_end() {
        let mock = MockHttpClient::new();
        mock.add_json(json!({"content": [{"type": "text", "text": " Sinüs ritmi. "}]}));

        let result = analyze(
            &anthropic(&mock),
            SignalKind::Ecg,
            &json!({"voltages": [0.1, 0.5, -0.2], "heartRate": 72}),
        )
        .await
        .unwrap();

        assert_eq!(result.kind, SignalKind::Ecg);
        assert_eq!(result.interpretation, "Sinüs ritmi.");

        let calls = mock.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].request.body["max_tokens"], 512);
        let prompt = calls[0].request.body["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("Nabız: 72.0 bpm"));
    }

    #[tokio::test]
    async fn test_empty_series_never_reaches_provider() {
        let mock = MockHttpClient::new();

        let err = analyze(&anthropic(&mock), SignalKind::Ecg, &json!({"voltages": []}))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_all_sentinels_never_reach_provider() {
        let mock = MockHttpClient::new();

        let err = analyze(&anthropic(&mock), SignalKind::HeartRate, &json!({"bpm_values": [0, 0, -1]}))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoValidData { kind: SignalKind::HeartRate }));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reply_normalized_per_provider() {
        let mock = MockHttpClient::new();
        mock.add_json(json!([{"generated_text": "Toparlanma iyi."}]));
        let provider = HuggingFaceProvider::new(mock.clone(), settings());

        let result = analyze(&provider, SignalKind::Hrv, &json!({"rr_intervals": [800, 810, 790, 805]}))
            .await
            .unwrap();

        assert_eq!(result.interpretation, "Toparlanma iyi.");
        let calls = mock.get_calls();
        assert_eq!(calls[0].request.url, "https://provider.test/models/test-model");
        assert_eq!(calls[0].request.body["parameters"]["temperature"], 0.7);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_a_shape_error() {
        let mock = MockHttpClient::new();
        mock.add_json(json!({"choices": [{"message": {"content": "wrong provider"}}]}));

        let err = analyze(&anthropic(&mock), SignalKind::Glucose, &json!({"glucose_data": [{"value": 95}]}))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnexpectedProviderShape { provider: "anthropic", .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        // No queued response: the mock fails like an unreachable host
        let mock = MockHttpClient::new();

        let err = analyze(&anthropic(&mock), SignalKind::HeartRate, &json!({"bpm_values": [72]}))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
        assert_eq!(mock.call_count(), 1);
    }
}
