//! Domain Configuration
//!
//! YAML-driven tables for the scoring engine:
//! 1. Scoring tables (keyword points, caps, freshness steps)
//! 2. Learning policy (analyzer thresholds, adjustment scales)
//!
//! Both have built-in defaults; a path in [`Settings`](crate::Settings)
//! replaces them wholesale for a deployment.

mod learning;
mod scoring;

pub use learning::{
    AdjustmentScales, CategoryRule, ComponentRule, LearningPolicy, Raise, Reduction,
};
pub use scoring::{
    CompanySizeConfig, ComponentCaps, FreshnessConfig, FreshnessStep, GeoScoringConfig,
    IntentScoringConfig, KeywordPoints, ScoringConfig, ScoringConfigError,
};

use crate::Settings;

/// Scoring tables and learning policy resolved for a deployment
#[derive(Debug, Clone, Default)]
pub struct DomainTables {
    pub scoring: ScoringConfig,
    pub learning: LearningPolicy,
}

impl DomainTables {
    /// Load the tables named in settings, using defaults where no path is set
    pub fn from_settings(settings: &Settings) -> Result<Self, ScoringConfigError> {
        let scoring = match settings.scoring_config_path.as_deref() {
            Some(path) => {
                tracing::info!(path = %path, "Loading scoring tables");
                ScoringConfig::load(path)?
            }
            None => ScoringConfig::default(),
        };

        let learning = match settings.learning_policy_path.as_deref() {
            Some(path) => {
                tracing::info!(path = %path, "Loading learning policy");
                LearningPolicy::load(path)?
            }
            None => LearningPolicy::default(),
        };

        Ok(Self { scoring, learning })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_paths() {
        let tables = DomainTables::from_settings(&Settings::default()).unwrap();
        assert_eq!(tables.scoring.caps.sum(), 100);
        assert_eq!(tables.learning.min_sample_size, 10);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let settings = Settings {
            scoring_config_path: Some("/nonexistent/scoring.yaml".to_string()),
            ..Settings::default()
        };
        assert!(DomainTables::from_settings(&settings).is_err());
    }
}
