//! Base lead scorer
//!
//! Converts a lead's signal text, timestamp, trust and geography into a
//! 0-100 score made of five independently capped components:
//!
//! | Component      | Cap | Rule                                              |
//! |----------------|-----|---------------------------------------------------|
//! | Intent         | 35  | keyword points + inference confidence, normalized |
//! | Freshness      | 20  | step function of elapsed days                     |
//! | Company size   | 20  | base + size keywords + numeric quantity bonus     |
//! | Trust          | 15  | linear in source trust                            |
//! | Geography      | 10  | full when a sales region matches, else half       |
//!
//! Scoring is pure: the evaluation instant and the region table are inputs,
//! and missing fields fall back to neutral contributions instead of failing.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use lead_intel_config::{KeywordPoints, ScoringConfig};
use lead_intel_core::{AiInference, Lead, ScoreBreakdown, ScoreComponent};

/// Output of a base scoring pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Sum of the breakdown, clamped to 100
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    /// Which rules fired, in evaluation order
    pub explanation: Vec<String>,
}

/// Rule-based scorer over a fixed set of scoring tables
#[derive(Debug, Clone)]
pub struct LeadScorer {
    config: ScoringConfig,
    size_patterns: Vec<SizePattern>,
    quantity_pattern: Option<Regex>,
}

/// Company-size keyword anchored at a word start, so "tpa" does not fire inside "mtpa"
#[derive(Debug, Clone)]
struct SizePattern {
    keyword: String,
    points: u32,
    regex: Regex,
}

impl Default for LeadScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl LeadScorer {
    pub fn new(config: ScoringConfig) -> Self {
        let size_patterns = build_size_patterns(&config.company_size.keywords);
        let quantity_pattern = build_quantity_pattern(&config.company_size.quantity_units);
        Self {
            config,
            size_patterns,
            quantity_pattern,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a lead against the assigned regions of the sales team
    pub fn score(&self, lead: &Lead, regions: &[String], now: DateTime<Utc>) -> ScoreResult {
        let mut explanation = Vec::new();
        // Only the signal text carries intent; the company name never scores
        let text = lead.signal.to_lowercase();

        let breakdown = ScoreBreakdown {
            intent_strength: self.intent_strength(&text, lead.ai_inference.as_ref(), &mut explanation),
            freshness: self.freshness(lead.signal_at, now, &mut explanation),
            company_size: self.company_size(&text, &mut explanation),
            trust_score: self.trust(lead.trust, &mut explanation),
            geo_match: self.geo_match(lead.geo.as_deref(), regions, &mut explanation),
        };

        ScoreResult {
            score: breakdown.total(),
            breakdown,
            explanation,
        }
    }

    fn intent_strength(
        &self,
        text: &str,
        inference: Option<&AiInference>,
        explanation: &mut Vec<String>,
    ) -> u32 {
        let intent = &self.config.intent;
        let cap = self.config.cap(ScoreComponent::IntentStrength);

        let mut matched = Vec::new();
        let mut keyword_points = 0u32;
        for entry in &intent.keywords {
            if text.contains(&entry.keyword.to_lowercase()) {
                keyword_points += entry.points;
                matched.push(entry.keyword.as_str());
            }
        }

        if matched.is_empty() {
            explanation.push("No intent keywords found".to_string());
        } else {
            explanation.push(format!(
                "Intent keywords: {} (+{})",
                matched.join(", "),
                keyword_points
            ));
        }

        let mut raw = keyword_points as f64;
        if let Some(inference) = inference {
            let confidence = finite_or_zero(inference.confidence_score).clamp(0.0, 1.0);
            let bonus = confidence * intent.confidence_weight;
            raw += bonus;
            explanation.push(format!(
                "AI confidence {:.0}% (+{:.1})",
                confidence * 100.0,
                bonus
            ));
        }

        scale_to_cap(raw / intent.normalizer, cap)
    }

    fn freshness(
        &self,
        signal_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        explanation: &mut Vec<String>,
    ) -> u32 {
        let cap = self.config.cap(ScoreComponent::Freshness);
        let days = days_since(signal_at, now);
        let fraction = self.config.freshness.fraction_for(days);

        if signal_at.is_none() {
            explanation.push("No signal timestamp, treated as fresh".to_string());
        } else if days <= 1.0 {
            explanation.push("Fresh signal (within 1 day)".to_string());
        } else {
            explanation.push(format!(
                "Signal is {:.1} days old ({:.0}% freshness)",
                days,
                fraction * 100.0
            ));
        }

        scale_to_cap(fraction, cap)
    }

    fn company_size(&self, text: &str, explanation: &mut Vec<String>) -> u32 {
        let size = &self.config.company_size;
        let cap = self.config.cap(ScoreComponent::CompanySize);

        let mut points = size.base_points;
        let mut matched = Vec::new();
        for pattern in &self.size_patterns {
            if pattern.regex.is_match(text) {
                points += pattern.points;
                matched.push(pattern.keyword.as_str());
            }
        }
        if !matched.is_empty() {
            explanation.push(format!("Size indicators: {}", matched.join(", ")));
        }

        if let Some(quantity) = self
            .quantity_pattern
            .as_ref()
            .and_then(|p| p.find(text))
        {
            points += size.quantity_bonus;
            explanation.push(format!(
                "Quantity mentioned: {} (+{})",
                quantity.as_str().trim(),
                size.quantity_bonus
            ));
        }

        points.min(cap)
    }

    fn trust(&self, trust: Option<f64>, explanation: &mut Vec<String>) -> u32 {
        let cap = self.config.cap(ScoreComponent::TrustScore);
        match trust {
            Some(value) => {
                let value = finite_or_zero(value).clamp(0.0, 100.0);
                explanation.push(format!("Source trust {:.0}/100", value));
                scale_to_cap(value / 100.0, cap)
            }
            None => {
                explanation.push("Source trust unknown".to_string());
                0
            }
        }
    }

    fn geo_match(&self, geo: Option<&str>, regions: &[String], explanation: &mut Vec<String>) -> u32 {
        let cap = self.config.cap(ScoreComponent::GeoMatch);
        let unmatched = scale_to_cap(self.config.geo.unmatched_fraction, cap);

        let geo = match geo.map(str::trim).filter(|g| !g.is_empty()) {
            Some(geo) => geo,
            None => {
                explanation.push("No geography provided".to_string());
                return unmatched;
            }
        };

        if regions.iter().any(|r| r.trim().eq_ignore_ascii_case(geo)) {
            explanation.push(format!("{} matches an assigned sales region", geo));
            cap
        } else {
            explanation.push(format!("{} is outside assigned sales regions", geo));
            unmatched
        }
    }
}

/// Fractional days between the signal and `now`; future or missing timestamps count as zero
pub fn days_since(signal_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    signal_at
        .map(|at| (now - at).num_seconds() as f64 / 86_400.0)
        .unwrap_or(0.0)
        .max(0.0)
}

fn scale_to_cap(fraction: f64, cap: u32) -> u32 {
    let value = (finite_or_zero(fraction) * cap as f64).round();
    value.clamp(0.0, cap as f64) as u32
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn build_size_patterns(keywords: &[KeywordPoints]) -> Vec<SizePattern> {
    keywords
        .iter()
        .filter_map(|entry| {
            let pattern = format!(r"(?i)\b{}", regex::escape(&entry.keyword.to_lowercase()));
            match Regex::new(&pattern) {
                Ok(regex) => Some(SizePattern {
                    keyword: entry.keyword.clone(),
                    points: entry.points,
                    regex,
                }),
                Err(e) => {
                    tracing::warn!(keyword = %entry.keyword, error = %e, "Skipping size keyword");
                    None
                }
            }
        })
        .collect()
}

fn build_quantity_pattern(units: &[String]) -> Option<Regex> {
    if units.is_empty() {
        return None;
    }
    let mut units: Vec<String> = units.iter().map(|u| regex::escape(&u.to_lowercase())).collect();
    // Longer units first so "crore" wins over "cr"
    units.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = format!(r"(?i)\d+(?:[.,]\d+)?\s*(?:{})\b", units.join("|"));
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid quantity pattern, quantity bonus disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lead_intel_core::UrgencyLevel;

    fn regions() -> Vec<String> {
        vec!["Gujarat".to_string(), "Maharashtra".to_string()]
    }

    fn tender_lead(now: DateTime<Utc>) -> Lead {
        Lead::new(
            "Adani Ports",
            "Urgent tender: diesel supply, ₹500 crore contract",
        )
        .with_trust(95.0)
        .with_geo("Gujarat")
        .with_signal_at(now)
    }

    #[test]
    fn test_worked_example_scores_high() {
        let now = Utc::now();
        let scorer = LeadScorer::default();
        let result = scorer.score(&tender_lead(now), &regions(), now);

        assert_eq!(result.breakdown.freshness, 20);
        assert_eq!(result.breakdown.geo_match, 10);
        assert_eq!(result.breakdown.trust_score, 14);
        assert!(result.breakdown.company_size >= 15);
        assert!(result.breakdown.intent_strength >= 28);
        assert!(result.score >= 85, "score was {}", result.score);
    }

    #[test]
    fn test_inference_confidence_reaches_cap() {
        let now = Utc::now();
        let lead = tender_lead(now).with_inference(AiInference {
            confidence_score: 0.9,
            urgency_level: UrgencyLevel::High,
            industry: Some("Logistics".to_string()),
            summary: None,
        });
        let result = LeadScorer::default().score(&lead, &regions(), now);
        assert_eq!(result.breakdown.intent_strength, 35);
        assert!(result.explanation.iter().any(|e| e.starts_with("AI confidence")));
    }

    #[test]
    fn test_components_stay_within_caps() {
        let now = Utc::now();
        let scorer = LeadScorer::default();
        let huge = "urgent tender rfp procurement new plant expansion 900 crore billion mtpa refinery "
            .repeat(200);
        assert!(huge.len() >= 10_000);

        for trust in [-50.0, 0.0, 100.0, 1e9, f64::NAN, f64::INFINITY] {
            let lead = Lead::new("Mega Corp", huge.clone())
                .with_trust(trust)
                .with_inference(AiInference {
                    confidence_score: 50.0,
                    ..AiInference::default()
                })
                .with_signal_at(now + Duration::days(30));
            let result = scorer.score(&lead, &regions(), now);

            for component in ScoreComponent::ALL {
                assert!(result.breakdown.get(component) <= scorer.config().cap(component));
            }
            assert!(result.score <= 100);
        }
    }

    #[test]
    fn test_empty_lead_defaults() {
        let now = Utc::now();
        let result = LeadScorer::default().score(&Lead::new("", ""), &regions(), now);
        assert_eq!(result.breakdown.intent_strength, 0);
        assert_eq!(result.breakdown.freshness, 20);
        assert_eq!(result.breakdown.company_size, 5);
        assert_eq!(result.breakdown.trust_score, 0);
        assert_eq!(result.breakdown.geo_match, 5);
        assert_eq!(result.score, 30);
    }

    #[test]
    fn test_freshness_is_monotone_with_breakpoints() {
        let now = Utc::now();
        let scorer = LeadScorer::default();
        let freshness_at = |hours: i64| {
            let lead = Lead::new("Acme", "supply").with_signal_at(now - Duration::hours(hours));
            scorer.score(&lead, &[], now).breakdown.freshness
        };

        assert_eq!(freshness_at(24), 20);
        assert_eq!(freshness_at(25), 17);
        assert_eq!(freshness_at(72), 17);
        assert_eq!(freshness_at(73), 12);
        assert_eq!(freshness_at(168), 12);
        assert_eq!(freshness_at(169), 6);

        let mut last = u32::MAX;
        for hours in (0..400).step_by(6) {
            let value = freshness_at(hours);
            assert!(value <= last);
            last = value;
        }
    }

    #[test]
    fn test_future_timestamp_counts_as_now() {
        let now = Utc::now();
        assert_eq!(days_since(Some(now + Duration::days(3)), now), 0.0);
        assert_eq!(days_since(None, now), 0.0);
    }

    #[test]
    fn test_geo_match_is_case_insensitive() {
        let now = Utc::now();
        let scorer = LeadScorer::default();
        let matched = scorer.score(&Lead::new("A", "b").with_geo("  gujarat "), &regions(), now);
        assert_eq!(matched.breakdown.geo_match, 10);

        let unmatched = scorer.score(&Lead::new("A", "b").with_geo("Kerala"), &regions(), now);
        assert_eq!(unmatched.breakdown.geo_match, 5);
    }

    #[test]
    fn test_quantity_pattern() {
        let scorer = LeadScorer::default();
        let pattern = scorer.quantity_pattern.as_ref().unwrap();
        assert!(pattern.is_match("a 500 crore contract"));
        assert!(pattern.is_match("capacity of 2.5 mtpa"));
        assert!(pattern.is_match("1,200 tonnes"));
        assert!(!pattern.is_match("crore of rupees"));
        assert!(!pattern.is_match("500 crores")); // word boundary
    }

    #[test]
    fn test_company_name_does_not_score_intent() {
        let now = Utc::now();
        let scorer = LeadScorer::default();
        let signal = "Quarterly results announced";
        let named = scorer.score(&Lead::new("National Tender & Supply Corp", signal), &[], now);
        let plain = scorer.score(&Lead::new("Acme Ltd", signal), &[], now);

        assert_eq!(named.breakdown.intent_strength, 0);
        assert_eq!(named.breakdown, plain.breakdown);
        assert!(named.explanation.contains(&"No intent keywords found".to_string()));
    }

    #[test]
    fn test_size_keywords_match_at_word_start() {
        let now = Utc::now();
        let scorer = LeadScorer::default();

        let mtpa = scorer.score(&Lead::new("Acme", "Clinker line rated at 2 mtpa"), &[], now);
        // base 5 + mtpa 6 + quantity 5
        assert_eq!(mtpa.breakdown.company_size, 16);
        assert!(mtpa.explanation.contains(&"Size indicators: mtpa".to_string()));

        let tpa = scorer.score(&Lead::new("Acme", "Bagging unit of 90000 tpa"), &[], now);
        // base 5 + tpa 4 + quantity 5
        assert_eq!(tpa.breakdown.company_size, 14);
        assert!(tpa.explanation.contains(&"Size indicators: tpa".to_string()));
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let now = Utc::now();
        let scorer = LeadScorer::default();
        let lead = tender_lead(now - Duration::days(2));
        let first = scorer.score(&lead, &regions(), now);
        let second = scorer.score(&lead, &regions(), now);
        assert_eq!(first, second);
    }
}
