//! Gemini-backed composer.
//!
//! One `generateContent` call with a tightly constrained prompt.
//! Every failure path logs and returns the fallback template.

use async_trait::async_trait;
use quotepilot_core::config::GeminiConfig;
use serde_json::{Value, json};

use crate::{ComposeInput, Composer, fallback_message};

/// Generated text is clipped here even when the model ignores the
/// 280-character instruction.
const MAX_GENERATED_CHARS: usize = 350;

pub struct GeminiComposer {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiComposer {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            api_key: config.api_key.trim().to_string(),
            model: config.model.trim().to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn build_prompt(input: &ComposeInput) -> String {
        let total_text = match input.total_amount {
            Some(total) if total.is_finite() => format!("{total:.2}"),
            _ => "not provided".to_string(),
        };

        [
            "You are a contractor follow-up assistant.".to_string(),
            "Write one concise, warm follow-up message for a homeowner.".to_string(),
            "Constraints:".to_string(),
            "- max 280 characters".to_string(),
            "- plain text only".to_string(),
            "- no markdown".to_string(),
            "- no pressure tactics".to_string(),
            "- include estimate number naturally".to_string(),
            format!("Client name: {}", input.client_name),
            format!("Estimate number: {}", input.estimate_number),
            format!("Estimate total: {total_text}"),
            format!("Business name: {}", input.business_name),
        ]
        .join("\n")
    }

    async fn try_generate(&self, input: &ComposeInput) -> Option<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": Self::build_prompt(input) }] }
            ],
            "generationConfig": {
                "temperature": 0.4,
                "maxOutputTokens": 180,
                "responseMimeType": "text/plain",
            }
        });

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| tracing::warn!("Gemini connection failed: {e}"))
            .ok()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let payload: Value = resp.json().await.unwrap_or_default();
            let provider_message = payload["error"]["message"]
                .as_str()
                .unwrap_or("Gemini request failed");
            tracing::warn!("Gemini error {status}: {provider_message}");
            return None;
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| tracing::warn!("Gemini response parse failed: {e}"))
            .ok()?;

        let generated = extract_gemini_text(&payload)?;
        Some(generated.chars().take(MAX_GENERATED_CHARS).collect())
    }
}

/// First non-empty text part of the first candidate.
fn extract_gemini_text(payload: &Value) -> Option<String> {
    let parts = payload["candidates"].get(0)?["content"]["parts"].as_array()?;
    parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(String::from)
}

#[async_trait]
impl Composer for GeminiComposer {
    async fn compose(&self, input: &ComposeInput) -> String {
        if self.api_key.is_empty() {
            return fallback_message(input);
        }
        match self.try_generate(input).await {
            Some(message) => message,
            None => fallback_message(input),
        }
    }
}
