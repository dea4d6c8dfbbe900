//! Feedback Learning Policy
//!
//! Thresholds the pattern analyzer uses to turn feedback history into weight
//! suggestions, and the scales the learning-aware scorer applies them with.
//! Loaded from `learning.yaml`, falling back to the built-in policy.

use serde::{Deserialize, Serialize};
use std::path::Path;

use lead_intel_core::ScoreComponent;

use super::scoring::ScoringConfigError;

/// Learning policy loaded from learning.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningPolicy {
    /// Feedback records required before any suggestion or adjustment
    pub min_sample_size: u64,
    /// Per-component gap rules
    pub intent_strength: ComponentRule,
    pub freshness: ComponentRule,
    pub company_size: ComponentRule,
    pub trust_score: ComponentRule,
    /// Per-category approval-rate rules
    pub industry: CategoryRule,
    pub source: CategoryRule,
    pub geo: CategoryRule,
    /// Rejection reasons reported in insights
    pub top_rejection_reasons: usize,
    /// Application scales for the learning-aware scorer
    pub adjustments: AdjustmentScales,
}

impl Default for LearningPolicy {
    fn default() -> Self {
        Self {
            min_sample_size: 10,
            intent_strength: ComponentRule {
                raise_above: 5.0,
                raise: Raise::Scaled { divisor: 50.0 },
                lower_below: Some(-3.0),
                floor: 0.7,
            },
            freshness: ComponentRule::symmetric(3.0, 30.0),
            company_size: ComponentRule::symmetric(3.0, 30.0),
            trust_score: ComponentRule {
                raise_above: 10.0,
                raise: Raise::Flat { value: 1.2 },
                lower_below: None,
                floor: 0.7,
            },
            industry: CategoryRule {
                boost_above: 0.7,
                boost_scale: 1.0,
                reduce_below: 0.3,
                reduction: Reduction::Scaled { floor: 0.6 },
            },
            source: CategoryRule {
                boost_above: 0.65,
                boost_scale: 0.8,
                reduce_below: 0.35,
                reduction: Reduction::Scaled { floor: 0.6 },
            },
            geo: CategoryRule {
                boost_above: 0.7,
                boost_scale: 1.0,
                reduce_below: 0.3,
                reduction: Reduction::Flat { value: 0.8 },
            },
            top_rejection_reasons: 3,
            adjustments: AdjustmentScales::default(),
        }
    }
}

impl LearningPolicy {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoringConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ScoringConfigError::FileNotFound(path.as_ref().display().to_string(), e.to_string())
        })?;

        let policy: Self =
            serde_yaml::from_str(&content).map_err(|e| ScoringConfigError::ParseError(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if self.min_sample_size == 0 {
            return Err(ScoringConfigError::Invalid(
                "min_sample_size must be at least 1".to_string(),
            ));
        }
        for rule in [&self.industry, &self.source, &self.geo] {
            if rule.reduce_below > rule.boost_above {
                return Err(ScoringConfigError::Invalid(format!(
                    "category reduce_below {} exceeds boost_above {}",
                    rule.reduce_below, rule.boost_above
                )));
            }
        }
        if let Raise::Scaled { divisor } = self.intent_strength.raise {
            if divisor <= 0.0 {
                return Err(ScoringConfigError::Invalid(
                    "intent_strength divisor must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Gap rule for a component; the geography-match multiplier has none
    pub fn component_rule(&self, component: ScoreComponent) -> Option<&ComponentRule> {
        match component {
            ScoreComponent::IntentStrength => Some(&self.intent_strength),
            ScoreComponent::Freshness => Some(&self.freshness),
            ScoreComponent::CompanySize => Some(&self.company_size),
            ScoreComponent::TrustScore => Some(&self.trust_score),
            ScoreComponent::GeoMatch => None,
        }
    }
}

/// How a component multiplier is raised
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Raise {
    /// `1 + gap / divisor`
    Scaled { divisor: f64 },
    /// Fixed multiplier
    Flat { value: f64 },
}

/// Rule turning a mean-gap between approved and rejected leads into a multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRule {
    /// Raise when `gap > raise_above`
    pub raise_above: f64,
    pub raise: Raise,
    /// Lower when `gap < lower_below`; `None` disables lowering
    #[serde(default)]
    pub lower_below: Option<f64>,
    /// Lowest multiplier a decrease may produce
    pub floor: f64,
}

impl ComponentRule {
    fn symmetric(threshold: f64, divisor: f64) -> Self {
        Self {
            raise_above: threshold,
            raise: Raise::Scaled { divisor },
            lower_below: Some(-threshold),
            floor: 0.7,
        }
    }

    /// Suggested multiplier for a gap, or `None` when the gap is inside the dead band
    pub fn multiplier_for(&self, gap: f64) -> Option<f64> {
        if gap > self.raise_above {
            return Some(match self.raise {
                Raise::Scaled { divisor } => 1.0 + gap / divisor,
                Raise::Flat { value } => value,
            });
        }
        match (self.lower_below, self.raise) {
            (Some(lower), Raise::Scaled { divisor }) if gap < lower => {
                Some((1.0 + gap / divisor).max(self.floor))
            }
            (Some(lower), Raise::Flat { .. }) if gap < lower => Some(self.floor),
            _ => None,
        }
    }
}

/// How a category multiplier is reduced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reduction {
    /// `max(floor, 1 - (0.5 - rate))`
    Scaled { floor: f64 },
    /// Fixed multiplier
    Flat { value: f64 },
}

/// Rule turning a category approval rate into a boost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub boost_above: f64,
    pub boost_scale: f64,
    pub reduce_below: f64,
    pub reduction: Reduction,
}

impl CategoryRule {
    /// Observations a category needs before it is considered
    pub const MIN_OBSERVATIONS: usize = 3;
    /// Approval rate around which boosts pivot
    pub const PIVOT: f64 = 0.5;

    /// Boost for an approval rate, or `None` when the rate is unremarkable
    pub fn boost_for(&self, rate: f64) -> Option<f64> {
        if rate > self.boost_above {
            Some(1.0 + (rate - Self::PIVOT) * self.boost_scale)
        } else if rate < self.reduce_below {
            Some(match self.reduction {
                Reduction::Scaled { floor } => (1.0 - (Self::PIVOT - rate)).max(floor),
                Reduction::Flat { value } => value,
            })
        } else {
            None
        }
    }
}

/// Scales used when applying learned weights to a base score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentScales {
    /// Linear adjustment is applied only when its magnitude exceeds this
    pub linear_threshold: f64,
    pub industry_bonus: f64,
    pub source_bonus: f64,
    pub geo_bonus: f64,
}

impl Default for AdjustmentScales {
    fn default() -> Self {
        Self {
            linear_threshold: 1.0,
            industry_bonus: 10.0,
            source_bonus: 8.0,
            geo_bonus: 5.0,
        }
    }
}
