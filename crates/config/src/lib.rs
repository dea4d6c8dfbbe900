//! Configuration management for the lead intelligence service
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (LEAD_INTEL__ prefix)
//!
//! # Domain Configuration
//!
//! Scoring tables and the learning policy live in `domain/` and load from
//! YAML with built-in defaults:
//! - scoring.yaml - keyword points, component caps, freshness steps
//! - learning.yaml - analyzer thresholds and adjustment scales

pub mod domain;
pub mod settings;

pub use settings::{
    load_settings, LearningSettings, LlmSettings, NotificationSettings, ObservabilityConfig,
    PersistenceConfig, RateLimitConfig, RuntimeEnvironment, ServerConfig, Settings,
};

pub use domain::{
    AdjustmentScales, CategoryRule, CompanySizeConfig, ComponentCaps, ComponentRule, DomainTables,
    FreshnessConfig, FreshnessStep, GeoScoringConfig, IntentScoringConfig, KeywordPoints,
    LearningPolicy, Raise, Reduction, ScoringConfig, ScoringConfigError,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ScoringConfigError> for ConfigError {
    fn from(err: ScoringConfigError) -> Self {
        match err {
            ScoringConfigError::FileNotFound(path, _) => ConfigError::FileNotFound(path),
            ScoringConfigError::ParseError(msg) => ConfigError::ParseError(msg),
            ScoringConfigError::Invalid(msg) => ConfigError::InvalidValue {
                field: "domain".to_string(),
                message: msg,
            },
        }
    }
}
