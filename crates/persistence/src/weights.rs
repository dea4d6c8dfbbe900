//! Learned-weights document in ScyllaDB

use async_trait::async_trait;
use chrono::Utc;

use lead_intel_core::{LearnedWeights, Result, WeightsStore, LEARNED_WEIGHTS_ID};

use crate::{PersistenceError, ScyllaClient};

/// ScyllaDB-backed weights store holding the single weights row
#[derive(Clone)]
pub struct ScyllaWeightsStore {
    client: ScyllaClient,
}

impl ScyllaWeightsStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn load(&self) -> std::result::Result<Option<LearnedWeights>, PersistenceError> {
        let query = format!(
            "SELECT doc FROM {} WHERE weights_id = ?",
            self.client.table("learned_weights")
        );
        let result = self
            .client
            .session()
            .query_unpaged(query, (LEARNED_WEIGHTS_ID,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (doc,): (String,) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                return Ok(Some(serde_json::from_str(&doc)?));
            }
        }
        Ok(None)
    }

    async fn store(&self, weights: &LearnedWeights) -> std::result::Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {} (weights_id, version, doc, updated_at)
             VALUES (?, ?, ?, ?)",
            self.client.table("learned_weights")
        );
        let doc = serde_json::to_string(weights)?;
        let updated_at = weights.last_updated.unwrap_or_else(Utc::now);

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    LEARNED_WEIGHTS_ID,
                    weights.version as i64,
                    doc,
                    updated_at.timestamp_millis(),
                ),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WeightsStore for ScyllaWeightsStore {
    async fn current(&self) -> Result<LearnedWeights> {
        Ok(self.load().await?.unwrap_or_default())
    }

    async fn save(&self, weights: &LearnedWeights) -> Result<()> {
        Ok(self.store(weights).await?)
    }
}
