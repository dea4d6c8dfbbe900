//! Storage traits

use async_trait::async_trait;
use chrono::Utc;

use crate::error::Result;
use crate::feedback::FeedbackRecord;
use crate::lead::{Lead, LeadFilter, LeadStatus};
use crate::weights::{LearnedWeights, WeightSuggestion};

/// Lead document store
///
/// Scores, breakdowns and explanations are overwritten on every scoring pass;
/// there is no versioning of lead documents.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Lead>>;

    /// Insert or overwrite a lead
    async fn upsert(&self, lead: &Lead) -> Result<()>;

    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>>;

    /// Set the workflow status; returns false when the lead does not exist
    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<bool>;
}

/// Append-only feedback history
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert(&self, record: &FeedbackRecord) -> Result<()>;

    /// Full history, oldest first
    async fn list_all(&self) -> Result<Vec<FeedbackRecord>>;

    async fn count(&self) -> Result<u64>;

    /// Admin purge of every record; returns how many were removed
    async fn purge(&self) -> Result<u64>;
}

/// Singleton learned-weights document
///
/// Writes are unconditional overwrites. Two concurrent `apply_update` calls
/// race and the last writer wins.
#[async_trait]
pub trait WeightsStore: Send + Sync {
    /// Stored weights, or neutral defaults when none were ever written
    async fn current(&self) -> Result<LearnedWeights>;

    async fn save(&self, weights: &LearnedWeights) -> Result<()>;

    /// Merge a partial suggestion over the current document and persist it
    async fn apply_update(
        &self,
        suggestion: &WeightSuggestion,
        sample_size: u64,
    ) -> Result<LearnedWeights> {
        let current = self.current().await?;
        let next = current.merged(suggestion, sample_size, Utc::now());
        self.save(&next).await?;
        tracing::info!(
            version = next.version,
            sample_size = next.sample_size,
            "Learned weights updated"
        );
        Ok(next)
    }
}
