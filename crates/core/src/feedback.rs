//! Feedback records and the scoring snapshot captured with them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lead::{LeadStatus, ScoreBreakdown};

/// Decision a sales user took on a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Approved,
    Rejected,
    Converted,
    Contacted,
}

impl FeedbackAction {
    pub const ALL: [FeedbackAction; 4] = [
        FeedbackAction::Approved,
        FeedbackAction::Rejected,
        FeedbackAction::Converted,
        FeedbackAction::Contacted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Converted => "converted",
            Self::Contacted => "contacted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "converted" => Some(Self::Converted),
            "contacted" => Some(Self::Contacted),
            _ => None,
        }
    }

    /// Counts as a positive training example
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Approved | Self::Converted)
    }

    /// Counts as a negative training example
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Workflow status the lead moves to after this action
    pub fn resulting_status(&self) -> LeadStatus {
        match self {
            Self::Approved => LeadStatus::InProgress,
            Self::Rejected => LeadStatus::Rejected,
            Self::Converted => LeadStatus::Converted,
            Self::Contacted => LeadStatus::InProgress,
        }
    }
}

/// Structured reason attached to a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NotRelevant,
    WrongIndustry,
    TooSmall,
    WrongGeography,
    Duplicate,
    BadTiming,
    ExistingCustomer,
    Other,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRelevant => "not_relevant",
            Self::WrongIndustry => "wrong_industry",
            Self::TooSmall => "too_small",
            Self::WrongGeography => "wrong_geography",
            Self::Duplicate => "duplicate",
            Self::BadTiming => "bad_timing",
            Self::ExistingCustomer => "existing_customer",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "not_relevant" => Some(Self::NotRelevant),
            "wrong_industry" => Some(Self::WrongIndustry),
            "too_small" => Some(Self::TooSmall),
            "wrong_geography" => Some(Self::WrongGeography),
            "duplicate" => Some(Self::Duplicate),
            "bad_timing" => Some(Self::BadTiming),
            "existing_customer" => Some(Self::ExistingCustomer),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Frozen copy of a lead's scoring inputs at feedback time
///
/// Decoupled from the live lead so later rescoring or edits cannot rewrite
/// historical training data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSnapshot {
    pub score: u32,
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub geo: Option<String>,
    #[serde(default)]
    pub trust: Option<f64>,
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Immutable feedback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: String,
    pub lead_id: String,
    pub user_id: String,
    pub action: FeedbackAction,
    #[serde(default)]
    pub rejection_reason: Option<RejectionReason>,
    #[serde(default)]
    pub notes: Option<String>,
    pub snapshot: LeadSnapshot,
    pub created_at: DateTime<Utc>,
}
