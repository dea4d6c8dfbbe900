//! Feedback recording
//!
//! Validates a feedback request and freezes the lead's scoring inputs into an
//! immutable snapshot, so later edits to the lead never rewrite training data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lead_intel_core::{
    Error, FeedbackAction, FeedbackRecord, Lead, LeadSnapshot, RejectionReason, Result,
};

/// Incoming feedback as submitted by a sales user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Feedback request after validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFeedback {
    pub lead_id: String,
    pub user_id: String,
    pub action: FeedbackAction,
    pub rejection_reason: Option<RejectionReason>,
    pub notes: Option<String>,
}

impl FeedbackRequest {
    pub fn new(lead_id: &str, user_id: &str, action: FeedbackAction) -> Self {
        Self {
            lead_id: Some(lead_id.to_string()),
            user_id: Some(user_id.to_string()),
            action: Some(action.as_str().to_string()),
            rejection_reason: None,
            notes: None,
        }
    }

    pub fn with_reason(mut self, reason: RejectionReason) -> Self {
        self.rejection_reason = Some(reason.as_str().to_string());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check required fields and parse the enumerations
    pub fn validate(&self) -> Result<ValidFeedback> {
        let lead_id = required(&self.lead_id, "leadId")?;
        let user_id = required(&self.user_id, "userId")?;
        let action_raw = required(&self.action, "action")?;

        let action = FeedbackAction::parse(&action_raw).ok_or_else(|| {
            Error::Validation(format!(
                "unknown action '{}', expected one of approved, rejected, converted, contacted",
                action_raw
            ))
        })?;

        let rejection_reason = match self
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
        {
            Some(raw) => Some(RejectionReason::parse(raw).ok_or_else(|| {
                Error::Validation(format!("unknown rejection reason '{}'", raw))
            })?),
            None => None,
        };

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(ValidFeedback {
            lead_id,
            user_id,
            action,
            rejection_reason,
            notes,
        })
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Validation(format!("{} is required", field)))
}

/// Importance-vocabulary terms found in the text, in vocabulary order
pub fn extract_keywords(text: &str, vocabulary: &[String]) -> Vec<String> {
    let text = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for term in vocabulary {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && text.contains(&term) && !found.contains(&term) {
            found.push(term);
        }
    }
    found
}

/// Freeze the lead's current scoring inputs
pub fn snapshot(lead: &Lead, vocabulary: &[String]) -> LeadSnapshot {
    LeadSnapshot {
        score: lead.score,
        source_type: lead.source_type.clone(),
        industry: lead.industry().map(str::to_string),
        geo: lead.geo.clone(),
        trust: lead.trust,
        breakdown: lead.breakdown,
        keywords: extract_keywords(&lead.signal, vocabulary),
    }
}

/// Build the immutable record for a validated request
pub fn build_record(
    lead: &Lead,
    feedback: &ValidFeedback,
    vocabulary: &[String],
    now: DateTime<Utc>,
) -> FeedbackRecord {
    FeedbackRecord {
        id: Uuid::new_v4().to_string(),
        lead_id: lead.id.clone(),
        user_id: feedback.user_id.clone(),
        action: feedback.action,
        rejection_reason: feedback.rejection_reason,
        notes: feedback.notes.clone(),
        snapshot: snapshot(lead, vocabulary),
        created_at: now,
    }
}
