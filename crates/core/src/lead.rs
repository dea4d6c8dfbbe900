//! Lead records and score breakdown types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow status of a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    InProgress,
    Rejected,
    Converted,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Rejected => "rejected",
            Self::Converted => "converted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "rejected" => Some(Self::Rejected),
            "converted" => Some(Self::Converted),
            _ => None,
        }
    }
}

/// Urgency level reported by the language-model annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl UrgencyLevel {
    /// Lenient parse; anything unrecognised is treated as medium
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" | "critical" | "urgent" => Self::High,
            _ => Self::Medium,
        }
    }
}

/// Language-model annotation attached to a lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInference {
    /// Model confidence that the signal is a genuine buying opportunity (0.0-1.0)
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub urgency_level: UrgencyLevel,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Default for AiInference {
    fn default() -> Self {
        Self {
            confidence_score: 0.0,
            urgency_level: UrgencyLevel::Medium,
            industry: None,
            summary: None,
        }
    }
}

/// The five named scoring components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreComponent {
    IntentStrength,
    Freshness,
    CompanySize,
    TrustScore,
    GeoMatch,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 5] = [
        ScoreComponent::IntentStrength,
        ScoreComponent::Freshness,
        ScoreComponent::CompanySize,
        ScoreComponent::TrustScore,
        ScoreComponent::GeoMatch,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::IntentStrength => "intent strength",
            Self::Freshness => "freshness",
            Self::CompanySize => "company size",
            Self::TrustScore => "trust",
            Self::GeoMatch => "geography match",
        }
    }
}

/// Score breakdown by component
///
/// Each component is a non-negative integer bounded by its cap; the sum of the
/// components, clamped to 100, is the lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub intent_strength: u32,
    pub freshness: u32,
    pub company_size: u32,
    pub trust_score: u32,
    pub geo_match: u32,
}

impl ScoreBreakdown {
    pub fn get(&self, component: ScoreComponent) -> u32 {
        match component {
            ScoreComponent::IntentStrength => self.intent_strength,
            ScoreComponent::Freshness => self.freshness,
            ScoreComponent::CompanySize => self.company_size,
            ScoreComponent::TrustScore => self.trust_score,
            ScoreComponent::GeoMatch => self.geo_match,
        }
    }

    /// Sum of components, clamped to 100
    pub fn total(&self) -> u32 {
        ScoreComponent::ALL
            .iter()
            .map(|c| self.get(*c))
            .sum::<u32>()
            .min(100)
    }
}

/// A tracked sales opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    #[serde(default)]
    pub company: String,
    /// Free-text signal content (news snippet, tender notice, manual note)
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub geo: Option<String>,
    /// Source trust, 0-100
    #[serde(default)]
    pub trust: Option<f64>,
    #[serde(default)]
    pub signal_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ai_inference: Option<AiInference>,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub explanation: Vec<String>,
    #[serde(default)]
    pub ml_adjusted: bool,
    #[serde(default)]
    pub ml_adjustments: Vec<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Create an unscored lead with a fresh id
    pub fn new(company: impl Into<String>, signal: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            company: company.into(),
            signal: signal.into(),
            source: String::new(),
            source_type: String::new(),
            geo: None,
            trust: None,
            signal_at: None,
            ai_inference: None,
            status: LeadStatus::New,
            score: 0,
            breakdown: ScoreBreakdown::default(),
            explanation: Vec::new(),
            ml_adjusted: false,
            ml_adjustments: Vec::new(),
            assigned_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>, source_type: impl Into<String>) -> Self {
        self.source = source.into();
        self.source_type = source_type.into();
        self
    }

    pub fn with_geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = Some(geo.into());
        self
    }

    pub fn with_trust(mut self, trust: f64) -> Self {
        self.trust = Some(trust);
        self
    }

    pub fn with_signal_at(mut self, at: DateTime<Utc>) -> Self {
        self.signal_at = Some(at);
        self
    }

    pub fn with_inference(mut self, inference: AiInference) -> Self {
        self.ai_inference = Some(inference);
        self
    }

    /// Industry label from the inference, if any
    pub fn industry(&self) -> Option<&str> {
        self.ai_inference
            .as_ref()
            .and_then(|i| i.industry.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Listing filter for stored leads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadFilter {
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        self.status.map_or(true, |s| lead.status == s)
    }

    /// Filter, order newest first and truncate to the limit
    pub fn apply(&self, leads: impl IntoIterator<Item = Lead>) -> Vec<Lead> {
        let mut matched: Vec<Lead> = leads.into_iter().filter(|l| self.matches(l)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}
