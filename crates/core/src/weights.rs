//! Learned weights document
//!
//! A single versioned document holding the multipliers and category boosts
//! derived from historical feedback. It is passed into the learning-aware
//! scorer explicitly; nothing reads it from ambient state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::lead::ScoreComponent;

/// Document id of the singleton weights record
pub const LEARNED_WEIGHTS_ID: &str = "learned_weights_v1";

/// Map from category label to a boost multiplier
///
/// Keys are normalized (trimmed, lowercased) on insert and lookup. Unknown
/// keys resolve to a neutral multiplier of 1.0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoostTable(BTreeMap<String, f64>);

impl BoostTable {
    pub const NEUTRAL: f64 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize_key(label: &str) -> String {
        label.trim().to_lowercase()
    }

    pub fn insert(&mut self, label: &str, multiplier: f64) {
        self.0.insert(Self::normalize_key(label), multiplier);
    }

    /// Boost for a label, 1.0 when absent
    pub fn get(&self, label: &str) -> f64 {
        self.0
            .get(&Self::normalize_key(label))
            .copied()
            .unwrap_or(Self::NEUTRAL)
    }

    /// Boost for an optional label, 1.0 when the label is missing
    pub fn lookup(&self, label: Option<&str>) -> f64 {
        label.map_or(Self::NEUTRAL, |l| self.get(l))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }
}

impl FromIterator<(String, f64)> for BoostTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut table = BoostTable::new();
        for (label, value) in iter {
            table.insert(&label, value);
        }
        table
    }
}

/// Active multipliers and boosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedWeights {
    pub id: String,
    pub intent_strength_multiplier: f64,
    pub freshness_multiplier: f64,
    pub company_size_multiplier: f64,
    pub trust_score_multiplier: f64,
    pub geo_match_multiplier: f64,
    #[serde(default)]
    pub industry_boosts: BoostTable,
    #[serde(default)]
    pub source_boosts: BoostTable,
    #[serde(default)]
    pub geo_boosts: BoostTable,
    /// Feedback count the current weights were learned from
    pub sample_size: u64,
    pub version: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for LearnedWeights {
    fn default() -> Self {
        Self {
            id: LEARNED_WEIGHTS_ID.to_string(),
            intent_strength_multiplier: 1.0,
            freshness_multiplier: 1.0,
            company_size_multiplier: 1.0,
            trust_score_multiplier: 1.0,
            geo_match_multiplier: 1.0,
            industry_boosts: BoostTable::new(),
            source_boosts: BoostTable::new(),
            geo_boosts: BoostTable::new(),
            sample_size: 0,
            version: 0,
            last_updated: None,
        }
    }
}

impl LearnedWeights {
    pub fn multiplier(&self, component: ScoreComponent) -> f64 {
        match component {
            ScoreComponent::IntentStrength => self.intent_strength_multiplier,
            ScoreComponent::Freshness => self.freshness_multiplier,
            ScoreComponent::CompanySize => self.company_size_multiplier,
            ScoreComponent::TrustScore => self.trust_score_multiplier,
            ScoreComponent::GeoMatch => self.geo_match_multiplier,
        }
    }

    /// Merge a partial suggestion over these weights
    ///
    /// Proposed scalars overwrite; a proposed boost map replaces the stored map
    /// since it is recomputed from the full history. Omitted parts are kept.
    /// `version` is advanced and `sample_size`/`last_updated` are stamped.
    pub fn merged(&self, suggestion: &WeightSuggestion, sample_size: u64, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if let Some(v) = suggestion.intent_strength_multiplier {
            next.intent_strength_multiplier = v;
        }
        if let Some(v) = suggestion.freshness_multiplier {
            next.freshness_multiplier = v;
        }
        if let Some(v) = suggestion.company_size_multiplier {
            next.company_size_multiplier = v;
        }
        if let Some(v) = suggestion.trust_score_multiplier {
            next.trust_score_multiplier = v;
        }
        if let Some(v) = suggestion.geo_match_multiplier {
            next.geo_match_multiplier = v;
        }
        if let Some(table) = &suggestion.industry_boosts {
            next.industry_boosts = table.clone();
        }
        if let Some(table) = &suggestion.source_boosts {
            next.source_boosts = table.clone();
        }
        if let Some(table) = &suggestion.geo_boosts {
            next.geo_boosts = table.clone();
        }
        next.id = LEARNED_WEIGHTS_ID.to_string();
        next.version = self.version + 1;
        next.sample_size = sample_size;
        next.last_updated = Some(now);
        next
    }
}

/// Partial weight update proposed by the pattern analyzer
///
/// Components or categories with insufficient signal stay `None` rather than
/// being reset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightSuggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_strength_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_match_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_boosts: Option<BoostTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_boosts: Option<BoostTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_boosts: Option<BoostTable>,
}

impl WeightSuggestion {
    pub fn is_empty(&self) -> bool {
        self.intent_strength_multiplier.is_none()
            && self.freshness_multiplier.is_none()
            && self.company_size_multiplier.is_none()
            && self.trust_score_multiplier.is_none()
            && self.geo_match_multiplier.is_none()
            && self.industry_boosts.is_none()
            && self.source_boosts.is_none()
            && self.geo_boosts.is_none()
    }

    pub fn set_multiplier(&mut self, component: ScoreComponent, value: f64) {
        let slot = match component {
            ScoreComponent::IntentStrength => &mut self.intent_strength_multiplier,
            ScoreComponent::Freshness => &mut self.freshness_multiplier,
            ScoreComponent::CompanySize => &mut self.company_size_multiplier,
            ScoreComponent::TrustScore => &mut self.trust_score_multiplier,
            ScoreComponent::GeoMatch => &mut self.geo_match_multiplier,
        };
        *slot = Some(value);
    }

    pub fn multiplier(&self, component: ScoreComponent) -> Option<f64> {
        match component {
            ScoreComponent::IntentStrength => self.intent_strength_multiplier,
            ScoreComponent::Freshness => self.freshness_multiplier,
            ScoreComponent::CompanySize => self.company_size_multiplier,
            ScoreComponent::TrustScore => self.trust_score_multiplier,
            ScoreComponent::GeoMatch => self.geo_match_multiplier,
        }
    }
}
