//! Reduce a raw provider reply to the interpretation text.

use serde_json::Value;

use super::{ProviderKind, RawProviderResponse};
use crate::errors::{Error, Result};

/// The interpretation text pulled out of a provider reply. Trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,
}

/// Extract the generated text from `raw` according to `kind`'s reply shape.
///
/// Anything other than the documented shape fails with [`Error::UnexpectedProviderShape`];
/// nothing is guessed.
pub fn normalize(kind: ProviderKind, raw: &RawProviderResponse) -> Result<ProviderResponse> {
    let text = match kind {
        ProviderKind::Anthropic => content_blocks(kind, &raw.0)?,
        ProviderKind::OpenAi => first_choice(kind, &raw.0)?,
        ProviderKind::HuggingFace => first_generation(kind, &raw.0)?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(shape(kind, "generated text is empty"));
    }

    Ok(ProviderResponse { text: text.to_string() })
}

// {"content": [{"type": "text", "text": "..."}, ...]}; blocks without text (tool use) are skipped
fn content_blocks(kind: ProviderKind, body: &Value) -> Result<String> {
    let blocks = body
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| shape(kind, "missing `content` array"))?;

    let texts: Vec<&str> = blocks
        .iter()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();

    if texts.is_empty() {
        return Err(shape(kind, "no text blocks in `content`"));
    }

    Ok(texts.concat())
}

// {"choices": [{"message": {"content": "..."}}]}
fn first_choice(kind: ProviderKind, body: &Value) -> Result<String> {
    body.get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.pointer("/message/content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| shape(kind, "missing `choices[0].message.content`"))
}

// [{"generated_text": "..."}]
fn first_generation(kind: ProviderKind, body: &Value) -> Result<String> {
    body.as_array()
        .and_then(|generations| generations.first())
        .and_then(|generation| generation.get("generated_text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| shape(kind, "expected a list with `generated_text`"))
}

fn shape(kind: ProviderKind, message: &str) -> Error {
    Error::UnexpectedProviderShape {
        provider: kind.as_str(),
        message: message.to_string(),
    }
}
