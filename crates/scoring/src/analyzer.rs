//! Feedback pattern analysis
//!
//! Aggregates the full feedback history into approval-rate patterns and a
//! partial weight suggestion. Every threshold comes from [`LearningPolicy`];
//! nothing here touches storage.
//!
//! The analysis recomputes from the complete history on every run, so category
//! boosts are point-in-time snapshots rather than running totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lead_intel_config::{CategoryRule, LearningPolicy};
use lead_intel_core::{
    BoostTable, FeedbackAction, FeedbackRecord, RejectionReason, ScoreComponent, WeightSuggestion,
};

/// Result of analyzing the feedback history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackAnalysis {
    pub patterns: FeedbackPatterns,
    pub suggested_weights: WeightSuggestion,
    pub insights: Vec<String>,
}

impl FeedbackAnalysis {
    /// Whether enough history existed to evaluate any rule
    pub fn is_sufficient(&self) -> bool {
        self.patterns.sufficient
    }
}

/// Aggregated view of the feedback history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPatterns {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub contacted: usize,
    /// Approved over approved + rejected
    pub approval_rate: Option<f64>,
    /// False when the history is below the minimum sample size
    pub sufficient: bool,
    pub components: Vec<ComponentPattern>,
    pub industries: Vec<CategoryPattern>,
    pub sources: Vec<CategoryPattern>,
    pub geographies: Vec<CategoryPattern>,
    pub rejection_reasons: Vec<ReasonCount>,
}

/// Mean component value among approved versus rejected snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPattern {
    pub component: ScoreComponent,
    pub approved_mean: f64,
    pub rejected_mean: f64,
    pub gap: f64,
}

/// Approval statistics for one category label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPattern {
    pub label: String,
    pub approved: usize,
    pub rejected: usize,
    pub approval_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCount {
    pub reason: RejectionReason,
    pub count: usize,
}

/// Analyze the full feedback history
pub fn analyze(records: &[FeedbackRecord], policy: &LearningPolicy) -> FeedbackAnalysis {
    let approved: Vec<&FeedbackRecord> = records.iter().filter(|r| r.action.is_positive()).collect();
    let rejected: Vec<&FeedbackRecord> = records.iter().filter(|r| r.action.is_negative()).collect();

    let mut patterns = FeedbackPatterns {
        total: records.len(),
        approved: approved.len(),
        rejected: rejected.len(),
        contacted: records
            .iter()
            .filter(|r| r.action == FeedbackAction::Contacted)
            .count(),
        approval_rate: rate(approved.len(), rejected.len()),
        ..FeedbackPatterns::default()
    };

    if (records.len() as u64) < policy.min_sample_size {
        return FeedbackAnalysis {
            patterns,
            suggested_weights: WeightSuggestion::default(),
            insights: vec![format!(
                "Need at least {} feedback records to learn weights (have {})",
                policy.min_sample_size,
                records.len()
            )],
        };
    }
    patterns.sufficient = true;

    let mut suggestion = WeightSuggestion::default();
    let mut insights = Vec::new();

    // Component gaps
    if !approved.is_empty() && !rejected.is_empty() {
        for component in ScoreComponent::ALL {
            let approved_mean = mean(&approved, component);
            let rejected_mean = mean(&rejected, component);
            let gap = approved_mean - rejected_mean;
            patterns.components.push(ComponentPattern {
                component,
                approved_mean,
                rejected_mean,
                gap,
            });

            let Some(rule) = policy.component_rule(component) else {
                continue;
            };
            if let Some(multiplier) = rule.multiplier_for(gap) {
                suggestion.set_multiplier(component, multiplier);
                let direction = if multiplier >= 1.0 { "raise" } else { "lower" };
                insights.push(format!(
                    "Approved leads average {:.1} {} vs {:.1} for rejected; {} weight to {:.2}",
                    approved_mean,
                    component.display_name(),
                    rejected_mean,
                    direction,
                    multiplier
                ));
            }
        }
    }

    // Category approval rates
    patterns.industries = category_patterns(records, |r| r.snapshot.industry.as_deref());
    patterns.sources = category_patterns(records, |r| Some(r.snapshot.source_type.as_str()));
    patterns.geographies = category_patterns(records, |r| r.snapshot.geo.as_deref());

    suggestion.industry_boosts =
        category_boosts("industry", &patterns.industries, &policy.industry, &mut insights);
    suggestion.source_boosts =
        category_boosts("source", &patterns.sources, &policy.source, &mut insights);
    suggestion.geo_boosts =
        category_boosts("geography", &patterns.geographies, &policy.geo, &mut insights);

    // Rejection reasons are reported only
    patterns.rejection_reasons = rejection_reasons(records);
    let top: Vec<String> = patterns
        .rejection_reasons
        .iter()
        .take(policy.top_rejection_reasons)
        .map(|r| format!("{} ({})", r.reason.as_str(), r.count))
        .collect();
    if !top.is_empty() {
        insights.push(format!("Top rejection reasons: {}", top.join(", ")));
    }

    if suggestion.is_empty() {
        insights.push("No significant patterns found; weights unchanged".to_string());
    }

    FeedbackAnalysis {
        patterns,
        suggested_weights: suggestion,
        insights,
    }
}

fn rate(approved: usize, rejected: usize) -> Option<f64> {
    let total = approved + rejected;
    (total > 0).then(|| approved as f64 / total as f64)
}

fn mean(records: &[&FeedbackRecord], component: ScoreComponent) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: u64 = records
        .iter()
        .map(|r| r.snapshot.breakdown.get(component) as u64)
        .sum();
    sum as f64 / records.len() as f64
}

fn category_patterns<F>(records: &[FeedbackRecord], label: F) -> Vec<CategoryPattern>
where
    F: Fn(&FeedbackRecord) -> Option<&str>,
{
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for record in records {
        let positive = record.action.is_positive();
        if !positive && !record.action.is_negative() {
            continue;
        }
        let Some(key) = label(record)
            .map(BoostTable::normalize_key)
            .filter(|k| !k.is_empty())
        else {
            continue;
        };
        let entry = counts.entry(key).or_default();
        if positive {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(label, (approved, rejected))| CategoryPattern {
            label,
            approved,
            rejected,
            approval_rate: rate(approved, rejected).unwrap_or(0.0),
        })
        .collect()
}

fn category_boosts(
    kind: &str,
    patterns: &[CategoryPattern],
    rule: &CategoryRule,
    insights: &mut Vec<String>,
) -> Option<BoostTable> {
    let mut boosts = BoostTable::new();
    for pattern in patterns {
        if pattern.approved + pattern.rejected < CategoryRule::MIN_OBSERVATIONS {
            continue;
        }
        if let Some(boost) = rule.boost_for(pattern.approval_rate) {
            boosts.insert(&pattern.label, boost);
            insights.push(format!(
                "{} '{}' approved {:.0}% of the time; boost {:.2}",
                capitalize(kind),
                pattern.label,
                pattern.approval_rate * 100.0,
                boost
            ));
        }
    }
    (!boosts.is_empty()).then_some(boosts)
}

/// Rejection-reason frequencies, most frequent first
pub fn rejection_reasons(records: &[FeedbackRecord]) -> Vec<ReasonCount> {
    let mut counts: BTreeMap<RejectionReason, usize> = BTreeMap::new();
    for record in records {
        if let Some(reason) = record.rejection_reason {
            *counts.entry(reason).or_default() += 1;
        }
    }
    let mut reasons: Vec<ReasonCount> = counts
        .into_iter()
        .map(|(reason, count)| ReasonCount { reason, count })
        .collect();
    // Stable sort keeps enum order among ties
    reasons.sort_by(|a, b| b.count.cmp(&a.count));
    reasons
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lead_intel_core::{LeadSnapshot, ScoreBreakdown};

    fn record(action: FeedbackAction, intent: u32) -> FeedbackRecord {
        FeedbackRecord {
            id: uuid::Uuid::new_v4().to_string(),
            lead_id: "lead".to_string(),
            user_id: "user".to_string(),
            action,
            rejection_reason: None,
            notes: None,
            snapshot: LeadSnapshot {
                score: intent + 40,
                source_type: String::new(),
                industry: None,
                geo: None,
                trust: Some(70.0),
                breakdown: ScoreBreakdown {
                    intent_strength: intent,
                    freshness: 17,
                    company_size: 10,
                    trust_score: 11,
                    geo_match: 10,
                },
                keywords: Vec::new(),
            },
            created_at: Utc::now(),
        }
    }

    fn with_category(
        mut record: FeedbackRecord,
        industry: &str,
        source: &str,
        geo: &str,
    ) -> FeedbackRecord {
        record.snapshot.industry = Some(industry.to_string());
        record.snapshot.source_type = source.to_string();
        record.snapshot.geo = Some(geo.to_string());
        record
    }

    #[test]
    fn test_insufficient_history() {
        let policy = LearningPolicy::default();
        for n in [0usize, 1, 9] {
            let records: Vec<_> = (0..n)
                .map(|i| record(FeedbackAction::Approved, i as u32 * 3))
                .collect();
            let analysis = analyze(&records, &policy);
            assert!(analysis.suggested_weights.is_empty());
            assert_eq!(analysis.insights.len(), 1);
            assert!(analysis.insights[0].starts_with("Need at least 10"));
            assert!(!analysis.is_sufficient());
            assert_eq!(analysis.patterns.total, n);
        }
    }

    #[test]
    fn test_intent_gap_raises_multiplier() {
        let mut records: Vec<_> = (0..6).map(|_| record(FeedbackAction::Approved, 28)).collect();
        records.extend((0..6).map(|_| record(FeedbackAction::Rejected, 10)));

        let analysis = analyze(&records, &LearningPolicy::default());
        let multiplier = analysis.suggested_weights.intent_strength_multiplier.unwrap();
        assert!(multiplier > 1.0);
        assert!((multiplier - 1.36).abs() < 1e-9);

        // Identical freshness / size / trust across groups: silent
        assert!(analysis.suggested_weights.freshness_multiplier.is_none());
        assert!(analysis.suggested_weights.company_size_multiplier.is_none());
        assert!(analysis.suggested_weights.trust_score_multiplier.is_none());
        assert!(analysis.suggested_weights.geo_match_multiplier.is_none());
    }

    #[test]
    fn test_inverted_gap_lowers_with_floor() {
        let mut records: Vec<_> = (0..5).map(|_| record(FeedbackAction::Converted, 5)).collect();
        records.extend((0..5).map(|_| record(FeedbackAction::Rejected, 35)));

        let analysis = analyze(&records, &LearningPolicy::default());
        let multiplier = analysis.suggested_weights.intent_strength_multiplier.unwrap();
        assert!((multiplier - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_trust_rule_is_one_sided() {
        let mut approved: Vec<_> = (0..5).map(|_| record(FeedbackAction::Approved, 20)).collect();
        let mut rejected: Vec<_> = (0..5).map(|_| record(FeedbackAction::Rejected, 20)).collect();
        for r in &mut rejected {
            r.snapshot.breakdown.trust_score = 0;
        }
        for r in &mut approved {
            r.snapshot.breakdown.trust_score = 15;
        }
        let mut records = approved.clone();
        records.extend(rejected.clone());
        let analysis = analyze(&records, &LearningPolicy::default());
        assert_eq!(analysis.suggested_weights.trust_score_multiplier, Some(1.2));

        // Reverse the groups: no decrease is ever proposed
        for r in &mut approved {
            r.snapshot.breakdown.trust_score = 0;
        }
        for r in &mut rejected {
            r.snapshot.breakdown.trust_score = 15;
        }
        let mut records = approved;
        records.extend(rejected);
        let analysis = analyze(&records, &LearningPolicy::default());
        assert!(analysis.suggested_weights.trust_score_multiplier.is_none());
    }

    #[test]
    fn test_one_sided_history_skips_component_rules() {
        let records: Vec<_> = (0..12).map(|i| record(FeedbackAction::Approved, i)).collect();
        let analysis = analyze(&records, &LearningPolicy::default());
        assert!(analysis.patterns.components.is_empty());
        assert!(analysis.suggested_weights.intent_strength_multiplier.is_none());
    }

    #[test]
    fn test_category_boosts() {
        let mut records = Vec::new();
        // Cement: 4 approved of 4
        for _ in 0..4 {
            records.push(with_category(
                record(FeedbackAction::Approved, 20),
                "Cement",
                "tender_portal",
                "Gujarat",
            ));
        }
        // Textiles: 0 approved of 4
        for _ in 0..4 {
            records.push(with_category(
                record(FeedbackAction::Rejected, 20),
                "textiles",
                "news",
                "Kerala",
            ));
        }
        // Two observations only: ignored
        for _ in 0..2 {
            records.push(with_category(
                record(FeedbackAction::Rejected, 20),
                "Mining",
                "manual",
                "Assam",
            ));
        }
        // Contacted never counts toward rates
        records.push(with_category(
            record(FeedbackAction::Contacted, 20),
            "Mining",
            "manual",
            "Assam",
        ));

        let analysis = analyze(&records, &LearningPolicy::default());
        let industries = analysis.suggested_weights.industry_boosts.as_ref().unwrap();
        assert!((industries.get("cement") - 1.5).abs() < 1e-9);
        assert!((industries.get("Textiles") - 0.6).abs() < 1e-9);
        assert_eq!(industries.get("mining"), 1.0);
        assert_eq!(industries.len(), 2);

        let sources = analysis.suggested_weights.source_boosts.as_ref().unwrap();
        assert!((sources.get("tender_portal") - 1.4).abs() < 1e-9);
        assert!((sources.get("news") - 0.6).abs() < 1e-9);

        let geos = analysis.suggested_weights.geo_boosts.as_ref().unwrap();
        assert!((geos.get("gujarat") - 1.5).abs() < 1e-9);
        assert_eq!(geos.get("kerala"), 0.8);

        let mining = analysis
            .patterns
            .industries
            .iter()
            .find(|p| p.label == "mining")
            .unwrap();
        assert_eq!(mining.rejected, 2);
        assert_eq!(mining.approved, 0);
    }

    #[test]
    fn test_top_rejection_reasons() {
        let mut records: Vec<_> = (0..4).map(|_| record(FeedbackAction::Approved, 20)).collect();
        let reasons = [
            RejectionReason::WrongGeography,
            RejectionReason::WrongGeography,
            RejectionReason::WrongGeography,
            RejectionReason::TooSmall,
            RejectionReason::TooSmall,
            RejectionReason::Duplicate,
            RejectionReason::BadTiming,
        ];
        for reason in reasons {
            let mut r = record(FeedbackAction::Rejected, 20);
            r.rejection_reason = Some(reason);
            records.push(r);
        }

        let analysis = analyze(&records, &LearningPolicy::default());
        assert_eq!(analysis.patterns.rejection_reasons[0].reason, RejectionReason::WrongGeography);
        assert_eq!(analysis.patterns.rejection_reasons[0].count, 3);
        let insight = analysis
            .insights
            .iter()
            .find(|i| i.starts_with("Top rejection reasons"))
            .unwrap();
        assert_eq!(
            insight,
            "Top rejection reasons: wrong_geography (3), too_small (2), duplicate (1)"
        );
        // Reasons never feed into weights
        assert!(analysis.suggested_weights.is_empty());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let mut records: Vec<_> = (0..6).map(|_| record(FeedbackAction::Approved, 30)).collect();
        records.extend((0..6).map(|_| record(FeedbackAction::Rejected, 8)));
        let policy = LearningPolicy::default();
        let first = analyze(&records, &policy);
        let second = analyze(&records, &policy);
        assert_eq!(first.suggested_weights, second.suggested_weights);
        assert_eq!(first.insights, second.insights);
    }
}
