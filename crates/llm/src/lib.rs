//! Signal annotation
//!
//! Features:
//! - Claude Messages API backend returning a structured inference
//! - Keyword heuristic used when no API key is configured
//! - Factory choosing a backend from settings

pub mod claude;
pub mod heuristic;

pub use claude::{parse_inference, ClaudeAnnotator, ClaudeConfig, ClaudeModel};
pub use heuristic::KeywordAnnotator;

use std::sync::Arc;

use lead_intel_config::LlmSettings;
use lead_intel_core::SignalAnnotator;
use thiserror::Error;

/// Annotation errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for lead_intel_core::Error {
    fn from(err: LlmError) -> Self {
        lead_intel_core::Error::Annotation(err.to_string())
    }
}

/// Pick the annotation backend for the given settings
///
/// Claude is used when enabled and an API key is present; anything else,
/// including a client that fails to build, falls back to the keyword heuristic.
pub fn build_annotator(settings: &LlmSettings) -> Arc<dyn SignalAnnotator> {
    if settings.enabled {
        if let Some(api_key) = settings.effective_api_key() {
            let config = ClaudeConfig::from_settings(settings, api_key);
            match ClaudeAnnotator::new(config) {
                Ok(annotator) => {
                    tracing::info!(model = annotator.model_id(), "Using Claude signal annotator");
                    return Arc::new(annotator);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Claude annotator unavailable, using keyword heuristic");
                }
            }
        } else {
            tracing::info!("No LLM API key configured, using keyword heuristic");
        }
    }
    Arc::new(KeywordAnnotator::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_converts_to_annotation() {
        let err: lead_intel_core::Error = LlmError::Timeout.into();
        assert_eq!(err.kind(), "annotation");
    }

    #[test]
    fn test_build_annotator_without_key_uses_heuristic() {
        let settings = LlmSettings {
            enabled: true,
            api_key: None,
            ..LlmSettings::default()
        };
        // An ambient ANTHROPIC_API_KEY would change the outcome
        if settings.effective_api_key().is_none() {
            assert_eq!(build_annotator(&settings).name(), "keyword");
        }

        let disabled = LlmSettings {
            enabled: false,
            api_key: Some("sk-test".to_string()),
            ..LlmSettings::default()
        };
        assert_eq!(build_annotator(&disabled).name(), "keyword");
    }

    #[test]
    fn test_build_annotator_with_key_uses_claude() {
        let settings = LlmSettings {
            enabled: true,
            api_key: Some("sk-test".to_string()),
            ..LlmSettings::default()
        };
        assert_eq!(build_annotator(&settings).name(), "claude");
    }
}
