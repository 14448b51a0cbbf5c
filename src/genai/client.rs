use std::future::Future;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{error, info};

use super::{Generated, Generator, OutputKind};
use crate::config::GenAiConfig;
use crate::error::{LogbookError, Result};

/// Client for the Generative Language `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    text_model: String,
    image_model: String,
    place_model: String,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Build a client from config. Fails when no API key is configured.
    pub fn new(config: &GenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                LogbookError::Config("No Gemini API key set (GEMINI_API_KEY)".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LogbookError::Generation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            place_model: config.place_model.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn model_for(&self, kind: OutputKind) -> &str {
        match kind {
            OutputKind::Text => &self.text_model,
            OutputKind::Image => &self.image_model,
            OutputKind::PlaceText(_) => &self.place_model,
        }
    }

    async fn call(&self, prompt: &str, kind: OutputKind) -> Result<Generated> {
        let model = self.model_for(kind);
        let url = format!("{}/models/{}:generateContent", self.api_base, model);
        let body = build_request_body(prompt, kind, self.max_output_tokens);

        info!("Calling model '{}' for {:?} output", model, kind);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let msg = if e.is_timeout() {
                    format!("Model API timeout after 60s for '{}'", model)
                } else {
                    format!("Model API request failed for '{}': {}", model, e)
                };
                error!("{}", msg);
                LogbookError::Generation(msg)
            })?;

        let body_text = handle_api_response(response, model).await?;
        let json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
            let msg = format!("Failed to parse model response wrapper: {}", e);
            error!("{}", msg);
            LogbookError::Generation(msg)
        })?;

        let extracted = match kind {
            OutputKind::Image => extract_inline_image(&json).map(Generated::Image),
            OutputKind::Text | OutputKind::PlaceText(_) => extract_text(&json).map(Generated::Text),
        };
        extracted.ok_or_else(|| {
            let msg = format!("No usable {:?} content in response from '{}'", kind, model);
            error!("{}", msg);
            LogbookError::Generation(msg)
        })
    }
}

impl Generator for GeminiClient {
    fn generate(&self, prompt: &str, kind: OutputKind) -> impl Future<Output = Result<Generated>> {
        self.call(prompt, kind)
    }
}

pub(crate) fn build_request_body(
    prompt: &str,
    kind: OutputKind,
    max_output_tokens: u32,
) -> serde_json::Value {
    let contents = serde_json::json!([{ "parts": [{ "text": prompt }] }]);
    match kind {
        OutputKind::Text => serde_json::json!({
            "contents": contents,
            "generationConfig": { "maxOutputTokens": max_output_tokens }
        }),
        OutputKind::Image => serde_json::json!({
            "contents": contents,
            "generationConfig": { "responseModalities": ["IMAGE"] }
        }),
        OutputKind::PlaceText(near) => serde_json::json!({
            "contents": contents,
            "tools": [{ "googleMaps": {} }],
            "toolConfig": {
                "retrievalConfig": {
                    "latLng": { "latitude": near.lat, "longitude": near.lng }
                }
            }
        }),
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(response: &serde_json::Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// First inline image of the first candidate, as a `data:` URL.
pub(crate) fn extract_inline_image(response: &serde_json::Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    parts.iter().find_map(|p| {
        let inline = p.get("inlineData")?;
        let data = inline["data"].as_str()?;
        STANDARD.decode(data).ok()?;
        let mime = inline["mimeType"].as_str().unwrap_or("image/png");
        Some(format!("data:{};base64,{}", mime, data))
    })
}

async fn handle_api_response(response: reqwest::Response, model: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let truncated = if body.len() > 1024 {
            format!("{}...", truncate_chars(&body, 1024))
        } else {
            body
        };
        let msg = format!("Model API error: {} from '{}' - {}", status, model, truncated);
        error!("{}", msg);
        return Err(LogbookError::Generation(msg));
    }
    response.text().await.map_err(|e| {
        LogbookError::Generation(format!("Failed to read response body from '{}': {}", model, e))
    })
}

fn truncate_chars(s: &str, max_bytes: usize) -> &str {
    let mut end = max_bytes.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
