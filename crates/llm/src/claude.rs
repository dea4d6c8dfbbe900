//! Claude signal annotator
//!
//! Calls the Anthropic Messages API with the company and signal text and asks
//! for a single JSON object describing the buying signal. The reply is parsed
//! leniently: surrounding prose is ignored, confidence is clamped to 0-1 and
//! unknown urgency values fall back to medium.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use lead_intel_config::LlmSettings;
use lead_intel_core::{AiInference, Result, SignalAnnotator, UrgencyLevel};

use crate::LlmError;

const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You qualify B2B sales signals for an industrial supplier. \
Given a company name and a signal (news snippet, tender notice or note), reply with ONLY a JSON object: \
{\"confidenceScore\": number between 0 and 1 that this is a genuine buying opportunity, \
\"urgencyLevel\": \"low\" | \"medium\" | \"high\", \
\"industry\": short industry label or null, \
\"summary\": one sentence}.";

/// Claude model variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaudeModel {
    /// Most capable, slowest
    Opus4_5,
    Sonnet4,
    /// Fastest; plenty for classification
    #[default]
    Haiku3_5,
}

impl ClaudeModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            ClaudeModel::Opus4_5 => "claude-opus-4-5-20251101",
            ClaudeModel::Sonnet4 => "claude-sonnet-4-20250514",
            ClaudeModel::Haiku3_5 => "claude-3-5-haiku-20241022",
        }
    }

    pub fn from_alias(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "opus" | "opus-4.5" | "claude-opus-4-5-20251101" => Some(ClaudeModel::Opus4_5),
            "sonnet" | "sonnet-4" | "claude-sonnet-4-20250514" => Some(ClaudeModel::Sonnet4),
            "haiku" | "haiku-3.5" | "claude-3-5-haiku-20241022" => Some(ClaudeModel::Haiku3_5),
            _ => None,
        }
    }
}

/// Configuration for the Claude annotator
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: ClaudeModel,
    pub max_tokens: usize,
    /// Temperature (0.0 - 1.0)
    pub temperature: f32,
    pub timeout: Duration,
    /// API endpoint (for testing or proxy)
    pub endpoint: String,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: ClaudeModel::default(),
            max_tokens: 512,
            temperature: 0.0,
            timeout: Duration::from_secs(20),
            endpoint: "https://api.anthropic.com".to_string(),
        }
    }
}

impl ClaudeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Build from service settings; an unknown model alias keeps the default
    pub fn from_settings(settings: &LlmSettings, api_key: &str) -> Self {
        let model = ClaudeModel::from_alias(&settings.model).unwrap_or_else(|| {
            tracing::warn!(model = %settings.model, "Unknown model alias, using default");
            ClaudeModel::default()
        });
        Self {
            api_key: api_key.to_string(),
            model,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout_seconds),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: ClaudeModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }
}

/// Annotator backed by the Claude Messages API
pub struct ClaudeAnnotator {
    config: ClaudeConfig,
    client: Client,
}

impl ClaudeAnnotator {
    pub fn new(config: ClaudeConfig) -> std::result::Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "ANTHROPIC_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn model_id(&self) -> &'static str {
        self.config.model.model_id()
    }

    async fn request(&self, company: &str, signal: &str) -> std::result::Result<String, LlmError> {
        let request = ClaudeRequest {
            model: self.config.model.model_id(),
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![ClaudeMessage {
                role: "user",
                content: format!("Company: {}\nSignal: {}", company.trim(), signal.trim()),
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.endpoint))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: ClaudeApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Claude annotation complete"
        );

        Ok(response.text())
    }
}

#[async_trait]
impl SignalAnnotator for ClaudeAnnotator {
    async fn annotate(&self, company: &str, signal: &str) -> Result<AiInference> {
        let text = self.request(company, signal).await?;
        Ok(parse_inference(&text)?)
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}

/// Extract an inference from model output
///
/// Takes the outermost `{...}` span so fenced or chatty replies still parse.
pub fn parse_inference(text: &str) -> std::result::Result<AiInference, LlmError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => {
            return Err(LlmError::InvalidResponse(
                "no JSON object in model output".to_string(),
            ))
        }
    };

    let raw: RawInference =
        serde_json::from_str(json).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    Ok(AiInference {
        confidence_score: normalize_confidence(raw.confidence_score),
        urgency_level: raw
            .urgency_level
            .as_deref()
            .map(UrgencyLevel::parse_lenient)
            .unwrap_or_default(),
        industry: raw
            .industry
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty() && !i.eq_ignore_ascii_case("unknown")),
        summary: raw
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

/// Percentages are accepted and scaled; anything else is clamped to 0-1
fn normalize_confidence(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => {
            let v = if v > 1.0 && v <= 100.0 { v / 100.0 } else { v };
            v.clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInference {
    #[serde(default, alias = "confidence", alias = "confidence_score")]
    confidence_score: Option<f64>,
    #[serde(default, alias = "urgency", alias = "urgency_level")]
    urgency_level: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

// Claude API types

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    system: &'a str,
    messages: Vec<ClaudeMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ClaudeApiResponse {
    content: Vec<ClaudeContentBlock>,
    #[serde(default)]
    usage: ClaudeUsage,
}

impl ClaudeApiResponse {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ClaudeContentBlock::Text { text } => Some(text.as_str()),
                ClaudeContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Default, Deserialize)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: usize,
    #[serde(default)]
    output_tokens: usize,
}
