//! Lead Scoring Configuration
//!
//! Keyword tables, component caps and step functions used by the base scorer.
//! Everything here is pure data; defaults match the production tables and any
//! field can be overridden from `scoring.yaml`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use lead_intel_core::ScoreComponent;

/// Scoring configuration loaded from scoring.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Per-component ceilings
    pub caps: ComponentCaps,
    /// Intent keyword table and scaling
    pub intent: IntentScoringConfig,
    /// Freshness step function
    pub freshness: FreshnessConfig,
    /// Company-size proxy table
    pub company_size: CompanySizeConfig,
    /// Geography match scoring
    pub geo: GeoScoringConfig,
    /// Vocabulary for keyword extraction on feedback snapshots
    pub importance_keywords: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            caps: ComponentCaps::default(),
            intent: IntentScoringConfig::default(),
            freshness: FreshnessConfig::default(),
            company_size: CompanySizeConfig::default(),
            geo: GeoScoringConfig::default(),
            importance_keywords: [
                "tender",
                "expansion",
                "plant",
                "diesel",
                "fuel",
                "bitumen",
                "lubricant",
                "crore",
                "urgent",
                "supply",
                "contract",
                "mtpa",
                "refinery",
                "procurement",
                "capacity",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ScoringConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoringConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ScoringConfigError::FileNotFound(path.as_ref().display().to_string(), e.to_string())
        })?;

        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ScoringConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the tables
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for component in ScoreComponent::ALL {
            if self.caps.cap(component) == 0 {
                return Err(ScoringConfigError::Invalid(format!(
                    "cap for {} must be positive",
                    component.display_name()
                )));
            }
        }
        if self.caps.sum() != 100 {
            return Err(ScoringConfigError::Invalid(format!(
                "component caps must sum to 100, got {}",
                self.caps.sum()
            )));
        }
        if self.intent.normalizer <= 0.0 {
            return Err(ScoringConfigError::Invalid(
                "intent.normalizer must be positive".to_string(),
            ));
        }
        let mut last_day = f64::NEG_INFINITY;
        for step in &self.freshness.steps {
            if step.max_days <= last_day {
                return Err(ScoringConfigError::Invalid(
                    "freshness.steps must be sorted by max_days".to_string(),
                ));
            }
            if !(0.0..=1.0).contains(&step.fraction) {
                return Err(ScoringConfigError::Invalid(format!(
                    "freshness fraction {} outside [0, 1]",
                    step.fraction
                )));
            }
            last_day = step.max_days;
        }
        if !(0.0..=1.0).contains(&self.freshness.stale_fraction)
            || !(0.0..=1.0).contains(&self.geo.unmatched_fraction)
        {
            return Err(ScoringConfigError::Invalid(
                "fractions must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cap(&self, component: ScoreComponent) -> u32 {
        self.caps.cap(component)
    }
}

/// Component ceilings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCaps {
    pub intent_strength: u32,
    pub freshness: u32,
    pub company_size: u32,
    pub trust_score: u32,
    pub geo_match: u32,
}

impl Default for ComponentCaps {
    fn default() -> Self {
        Self {
            intent_strength: 35,
            freshness: 20,
            company_size: 20,
            trust_score: 15,
            geo_match: 10,
        }
    }
}

impl ComponentCaps {
    pub fn cap(&self, component: ScoreComponent) -> u32 {
        match component {
            ScoreComponent::IntentStrength => self.intent_strength,
            ScoreComponent::Freshness => self.freshness,
            ScoreComponent::CompanySize => self.company_size,
            ScoreComponent::TrustScore => self.trust_score,
            ScoreComponent::GeoMatch => self.geo_match,
        }
    }

    pub fn sum(&self) -> u32 {
        ScoreComponent::ALL.iter().map(|c| self.cap(*c)).sum()
    }
}

/// Keyword and the points it contributes when found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordPoints {
    pub keyword: String,
    pub points: u32,
}

impl KeywordPoints {
    fn table(entries: &[(&str, u32)]) -> Vec<Self> {
        entries
            .iter()
            .map(|(keyword, points)| KeywordPoints {
                keyword: keyword.to_string(),
                points: *points,
            })
            .collect()
    }
}

/// Intent strength scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentScoringConfig {
    pub keywords: Vec<KeywordPoints>,
    /// Points per unit of inference confidence
    pub confidence_weight: f64,
    /// Raw points that map to the full cap
    pub normalizer: f64,
}

impl Default for IntentScoringConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordPoints::table(&[
                ("tender", 10),
                ("rfp", 10),
                ("urgent", 9),
                ("procurement", 8),
                ("immediate", 8),
                ("new plant", 8),
                ("expansion", 7),
                ("contract", 7),
                ("commissioning", 7),
                ("supply", 6),
                ("order", 6),
                ("requirement", 6),
                ("investment", 6),
                ("acquisition", 6),
                ("capacity", 5),
                ("bulk", 5),
            ]),
            confidence_weight: 10.0,
            normalizer: 40.0,
        }
    }
}

/// One step of the freshness function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshnessStep {
    /// Inclusive upper bound on elapsed days
    pub max_days: f64,
    /// Fraction of the cap awarded
    pub fraction: f64,
}

/// Freshness scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    pub steps: Vec<FreshnessStep>,
    /// Fraction awarded beyond the last step
    pub stale_fraction: f64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            steps: vec![
                FreshnessStep { max_days: 1.0, fraction: 1.0 },
                FreshnessStep { max_days: 3.0, fraction: 0.85 },
                FreshnessStep { max_days: 7.0, fraction: 0.6 },
            ],
            stale_fraction: 0.3,
        }
    }
}

impl FreshnessConfig {
    /// Fraction of the cap for a given age in days
    pub fn fraction_for(&self, days: f64) -> f64 {
        self.steps
            .iter()
            .find(|s| days <= s.max_days)
            .map(|s| s.fraction)
            .unwrap_or(self.stale_fraction)
    }
}

/// Company-size proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySizeConfig {
    pub base_points: u32,
    pub keywords: Vec<KeywordPoints>,
    /// Bonus when a numeric quantity such as "500 crore" appears
    pub quantity_bonus: u32,
    /// Units recognised after a number for the quantity bonus
    pub quantity_units: Vec<String>,
}

impl Default for CompanySizeConfig {
    fn default() -> Self {
        Self {
            base_points: 5,
            keywords: KeywordPoints::table(&[
                ("billion", 6),
                ("mtpa", 6),
                ("crore", 5),
                ("refinery", 5),
                ("tpa", 4),
                ("mw", 4),
                ("million", 3),
                ("plant", 3),
                ("lakh", 2),
            ]),
            quantity_bonus: 5,
            quantity_units: [
                "crore", "cr", "billion", "bn", "million", "mn", "lakh", "mtpa", "tpa", "mw",
                "tonnes", "tons", "kl",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Geography match configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoScoringConfig {
    /// Fraction of the cap when no sales region matches
    pub unmatched_fraction: f64,
}

impl Default for GeoScoringConfig {
    fn default() -> Self {
        Self {
            unmatched_fraction: 0.5,
        }
    }
}

/// Scoring configuration errors
#[derive(Debug)]
pub enum ScoringConfigError {
    FileNotFound(String, String),
    ParseError(String),
    Invalid(String),
}

impl std::fmt::Display for ScoringConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path, err) => {
                write!(f, "Scoring config not found at {}: {}", path, err)
            }
            Self::ParseError(err) => write!(f, "Failed to parse scoring config: {}", err),
            Self::Invalid(err) => write!(f, "Invalid scoring config: {}", err),
        }
    }
}

impl std::error::Error for ScoringConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.caps.sum(), 100);
        assert_eq!(config.cap(ScoreComponent::IntentStrength), 35);
        assert_eq!(config.cap(ScoreComponent::GeoMatch), 10);
    }

    #[test]
    fn test_freshness_breakpoints() {
        let freshness = FreshnessConfig::default();
        assert_eq!(freshness.fraction_for(0.0), 1.0);
        assert_eq!(freshness.fraction_for(1.0), 1.0);
        assert_eq!(freshness.fraction_for(1.01), 0.85);
        assert_eq!(freshness.fraction_for(3.0), 0.85);
        assert_eq!(freshness.fraction_for(7.0), 0.6);
        assert_eq!(freshness.fraction_for(7.5), 0.3);
    }

    #[test]
    fn test_caps_must_sum_to_hundred() {
        let mut config = ScoringConfig::default();
        config.caps.geo_match = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsorted_steps_rejected() {
        let mut config = ScoringConfig::default();
        config.freshness.steps.reverse();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "intent:\n  normalizer: 50\ngeo:\n  unmatched_fraction: 0.4\n"
        )
        .unwrap();

        let config = ScoringConfig::load(file.path()).unwrap();
        assert_eq!(config.intent.normalizer, 50.0);
        assert_eq!(config.geo.unmatched_fraction, 0.4);
        assert!(!config.intent.keywords.is_empty());
        assert_eq!(config.caps.freshness, 20);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScoringConfig::load("/nonexistent/scoring.yaml").unwrap_err();
        assert!(matches!(err, ScoringConfigError::FileNotFound(_, _)));
    }
}
