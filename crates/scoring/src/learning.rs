//! Learning-aware scoring
//!
//! Applies the active [`LearnedWeights`] on top of a base score. The weights
//! document is always passed in by the caller; nothing is read from ambient
//! state, so a score can be reproduced from (lead, weights, now).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lead_intel_config::LearningPolicy;
use lead_intel_core::{Lead, LearnedWeights, ScoreBreakdown, ScoreComponent};

use crate::scorer::{LeadScorer, ScoreResult};

/// Base result plus learned adjustments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedScore {
    /// Final score after adjustments, 0-100
    pub score: u32,
    /// Score before adjustments
    pub base_score: u32,
    pub breakdown: ScoreBreakdown,
    pub explanation: Vec<String>,
    pub ml_adjusted: bool,
    /// Adjustments applied, in order
    pub ml_adjustments: Vec<String>,
    /// Version of the weights document used
    pub weights_version: u64,
}

impl LearnedScore {
    /// Write the result onto a lead (overwrite semantics)
    pub fn apply_to(&self, lead: &mut Lead, now: DateTime<Utc>) {
        lead.score = self.score;
        lead.breakdown = self.breakdown;
        lead.explanation = self.explanation.clone();
        lead.ml_adjusted = self.ml_adjusted;
        lead.ml_adjustments = self.ml_adjustments.clone();
        lead.updated_at = now;
    }
}

/// Score a lead and apply learned weights
pub fn score_with_learning(
    scorer: &LeadScorer,
    lead: &Lead,
    regions: &[String],
    weights: &LearnedWeights,
    policy: &LearningPolicy,
    now: DateTime<Utc>,
) -> LearnedScore {
    let base = scorer.score(lead, regions, now);
    apply_learned_weights(base, lead, weights, policy)
}

/// Apply learned weights to an existing base result
pub fn apply_learned_weights(
    base: ScoreResult,
    lead: &Lead,
    weights: &LearnedWeights,
    policy: &LearningPolicy,
) -> LearnedScore {
    let mut result = LearnedScore {
        score: base.score,
        base_score: base.score,
        breakdown: base.breakdown,
        explanation: base.explanation,
        ml_adjusted: false,
        ml_adjustments: Vec::new(),
        weights_version: weights.version,
    };

    if weights.sample_size < policy.min_sample_size {
        return result;
    }

    let scales = &policy.adjustments;
    let mut adjusted = base.score as f64;

    let linear: f64 = ScoreComponent::ALL
        .iter()
        .map(|c| base.breakdown.get(*c) as f64 * (weights.multiplier(*c) - 1.0))
        .sum();
    if linear.abs() > scales.linear_threshold {
        adjusted += linear;
        result.ml_adjustments.push(format!(
            "Component weights: {:+.1} (learned from {} feedback records)",
            linear, weights.sample_size
        ));
    }

    let categories = [
        (
            "Industry",
            lead.industry(),
            weights.industry_boosts.lookup(lead.industry()),
            scales.industry_bonus,
        ),
        (
            "Source",
            Some(lead.source_type.as_str()),
            weights.source_boosts.lookup(Some(lead.source_type.as_str())),
            scales.source_bonus,
        ),
        (
            "Geography",
            lead.geo.as_deref(),
            weights.geo_boosts.lookup(lead.geo.as_deref()),
            scales.geo_bonus,
        ),
    ];
    for (kind, label, boost, scale) in categories {
        let bonus = (boost - 1.0) * scale;
        if bonus.abs() > f64::EPSILON {
            adjusted += bonus;
            result.ml_adjustments.push(format!(
                "{} '{}': {:+.1}",
                kind,
                label.unwrap_or_default().trim(),
                bonus
            ));
        }
    }

    result.ml_adjusted = !result.ml_adjustments.is_empty();
    if result.ml_adjusted {
        result.score = adjusted.round().clamp(0.0, 100.0) as u32;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_intel_core::{AiInference, BoostTable, WeightSuggestion};

    fn lead() -> Lead {
        Lead::new("JSW Cement", "Expansion of cement plant, 3 mtpa capacity")
            .with_source("press", "news")
            .with_geo("Karnataka")
            .with_trust(70.0)
            .with_inference(AiInference {
                confidence_score: 0.6,
                industry: Some("Cement".to_string()),
                ..AiInference::default()
            })
    }

    fn regions() -> Vec<String> {
        vec!["Karnataka".to_string()]
    }

    fn trained(sample_size: u64) -> LearnedWeights {
        let suggestion = WeightSuggestion {
            intent_strength_multiplier: Some(1.5),
            industry_boosts: Some([("cement".to_string(), 1.3)].into_iter().collect()),
            source_boosts: Some([("news".to_string(), 0.6)].into_iter().collect()),
            geo_boosts: Some(BoostTable::new()),
            ..WeightSuggestion::default()
        };
        LearnedWeights::default().merged(&suggestion, sample_size, Utc::now())
    }

    #[test]
    fn test_small_sample_leaves_score_unchanged() {
        let scorer = LeadScorer::default();
        let now = Utc::now();
        let base = scorer.score(&lead(), &regions(), now);
        let policy = LearningPolicy::default();

        for sample_size in [0, 5, 9] {
            let weights = trained(sample_size);
            let result = score_with_learning(&scorer, &lead(), &regions(), &weights, &policy, now);
            assert!(!result.ml_adjusted);
            assert!(result.ml_adjustments.is_empty());
            assert_eq!(result.score, base.score);
            assert_eq!(result.breakdown, base.breakdown);
        }
    }

    #[test]
    fn test_linear_and_category_adjustments() {
        let scorer = LeadScorer::default();
        let now = Utc::now();
        let base = scorer.score(&lead(), &regions(), now);
        let weights = trained(25);
        let result =
            score_with_learning(&scorer, &lead(), &regions(), &weights, &LearningPolicy::default(), now);

        let linear = base.breakdown.intent_strength as f64 * 0.5;
        let expected = (base.score as f64 + linear + 3.0 - 3.2).round().clamp(0.0, 100.0) as u32;

        assert!(result.ml_adjusted);
        assert_eq!(result.base_score, base.score);
        assert_eq!(result.score, expected);
        assert_eq!(result.ml_adjustments.len(), 3);
        assert!(result.ml_adjustments[0].starts_with("Component weights"));
        assert!(result.ml_adjustments[1].starts_with("Industry 'Cement'"));
        assert!(result.ml_adjustments[2].starts_with("Source 'news'"));
        assert_eq!(result.weights_version, 1);
    }

    #[test]
    fn test_sub_point_linear_adjustment_ignored() {
        let mut weights = LearnedWeights::default();
        weights.sample_size = 50;
        weights.trust_score_multiplier = 1.01;

        let result = score_with_learning(
            &LeadScorer::default(),
            &lead(),
            &regions(),
            &weights,
            &LearningPolicy::default(),
            Utc::now(),
        );
        assert!(!result.ml_adjusted);
        assert_eq!(result.score, result.base_score);
    }

    #[test]
    fn test_adjusted_score_is_clamped() {
        let mut weights = LearnedWeights::default();
        weights.sample_size = 50;
        weights.intent_strength_multiplier = 10.0;
        weights.company_size_multiplier = 10.0;

        let high = score_with_learning(
            &LeadScorer::default(),
            &lead(),
            &regions(),
            &weights,
            &LearningPolicy::default(),
            Utc::now(),
        );
        assert_eq!(high.score, 100);

        weights.intent_strength_multiplier = -10.0;
        weights.company_size_multiplier = -10.0;
        let low = score_with_learning(
            &LeadScorer::default(),
            &lead(),
            &regions(),
            &weights,
            &LearningPolicy::default(),
            Utc::now(),
        );
        assert_eq!(low.score, 0);
    }

    #[test]
    fn test_apply_to_overwrites_lead() {
        let mut target = lead();
        let now = Utc::now();
        let result = score_with_learning(
            &LeadScorer::default(),
            &target,
            &regions(),
            &LearnedWeights::default(),
            &LearningPolicy::default(),
            now,
        );
        result.apply_to(&mut target, now);
        assert_eq!(target.score, result.score);
        assert_eq!(target.breakdown, result.breakdown);
        assert!(!target.explanation.is_empty());
        assert_eq!(target.updated_at, now);
    }
}
