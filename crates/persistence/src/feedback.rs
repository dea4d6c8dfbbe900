//! Append-only feedback history in ScyllaDB

use async_trait::async_trait;

use lead_intel_core::{FeedbackRecord, FeedbackStore, Result};

use crate::schema::FEEDBACK_BUCKET;
use crate::{PersistenceError, ScyllaClient};

/// ScyllaDB-backed feedback store
///
/// All records share one partition clustered by creation time, so a full read
/// returns the history oldest first.
#[derive(Clone)]
pub struct ScyllaFeedbackStore {
    client: ScyllaClient,
}

impl ScyllaFeedbackStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn append(&self, record: &FeedbackRecord) -> std::result::Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {} (bucket, created_at, feedback_id, lead_id, action, doc)
             VALUES (?, ?, ?, ?, ?, ?)",
            self.client.table("feedback")
        );
        let doc = serde_json::to_string(record)?;

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    FEEDBACK_BUCKET,
                    record.created_at.timestamp_millis(),
                    record.id.as_str(),
                    record.lead_id.as_str(),
                    record.action.as_str(),
                    doc,
                ),
            )
            .await?;

        tracing::info!(
            feedback_id = %record.id,
            lead_id = %record.lead_id,
            action = record.action.as_str(),
            "Feedback recorded"
        );
        Ok(())
    }

    async fn read_all(&self) -> std::result::Result<Vec<FeedbackRecord>, PersistenceError> {
        let query = format!(
            "SELECT doc FROM {} WHERE bucket = ?",
            self.client.table("feedback")
        );
        let result = self
            .client
            .session()
            .query_unpaged(query, (FEEDBACK_BUCKET,))
            .await?;

        let mut records = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (doc,): (String,) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                records.push(serde_json::from_str(&doc)?);
            }
        }
        Ok(records)
    }

    async fn row_count(&self) -> std::result::Result<u64, PersistenceError> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE bucket = ?",
            self.client.table("feedback")
        );
        let result = self
            .client
            .session()
            .query_unpaged(query, (FEEDBACK_BUCKET,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (count,): (i64,) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                return Ok(count.max(0) as u64);
            }
        }
        Ok(0)
    }

    async fn delete_all(&self) -> std::result::Result<(), PersistenceError> {
        let query = format!(
            "DELETE FROM {} WHERE bucket = ?",
            self.client.table("feedback")
        );
        self.client
            .session()
            .query_unpaged(query, (FEEDBACK_BUCKET,))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for ScyllaFeedbackStore {
    async fn insert(&self, record: &FeedbackRecord) -> Result<()> {
        Ok(self.append(record).await?)
    }

    async fn list_all(&self) -> Result<Vec<FeedbackRecord>> {
        Ok(self.read_all().await?)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.row_count().await?)
    }

    async fn purge(&self) -> Result<u64> {
        let removed = self.row_count().await?;
        self.delete_all().await?;
        tracing::warn!(removed, "Feedback history purged");
        Ok(removed)
    }
}
