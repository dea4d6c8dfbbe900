//! Lead documents in ScyllaDB

use async_trait::async_trait;
use chrono::Utc;

use lead_intel_core::{Lead, LeadFilter, LeadStatus, LeadStore, Result};

use crate::{PersistenceError, ScyllaClient};

/// ScyllaDB-backed lead store
///
/// Each lead is one row keyed by id; `upsert` overwrites the whole document.
#[derive(Clone)]
pub struct ScyllaLeadStore {
    client: ScyllaClient,
}

impl ScyllaLeadStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn fetch(&self, id: &str) -> std::result::Result<Option<Lead>, PersistenceError> {
        let query = format!(
            "SELECT doc FROM {} WHERE lead_id = ?",
            self.client.table("leads")
        );
        let result = self.client.session().query_unpaged(query, (id,)).await?;

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

    async fn write(&self, lead: &Lead) -> std::result::Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {} (lead_id, status, score, doc, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            self.client.table("leads")
        );
        let doc = serde_json::to_string(lead)?;

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    lead.id.as_str(),
                    lead.status.as_str(),
                    lead.score as i32,
                    doc,
                    lead.created_at.timestamp_millis(),
                    lead.updated_at.timestamp_millis(),
                ),
            )
            .await?;

        tracing::debug!(lead_id = %lead.id, score = lead.score, "Lead persisted");
        Ok(())
    }

    async fn scan(&self) -> std::result::Result<Vec<Lead>, PersistenceError> {
        let query = format!("SELECT doc FROM {}", self.client.table("leads"));
        let result = self.client.session().query_unpaged(query, &[]).await?;

        let mut leads = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (doc,): (String,) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                match serde_json::from_str::<Lead>(&doc) {
                    Ok(lead) => leads.push(lead),
                    Err(e) => tracing::warn!(error = %e, "Skipping unreadable lead document"),
                }
            }
        }
        Ok(leads)
    }
}

#[async_trait]
impl LeadStore for ScyllaLeadStore {
    async fn get(&self, id: &str) -> Result<Option<Lead>> {
        Ok(self.fetch(id).await?)
    }

    async fn upsert(&self, lead: &Lead) -> Result<()> {
        Ok(self.write(lead).await?)
    }

    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        let leads = self.scan().await?;
        Ok(filter.apply(leads))
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<bool> {
        let Some(mut lead) = self.fetch(id).await? else {
            return Ok(false);
        };
        lead.status = status;
        lead.updated_at = Utc::now();
        self.write(&lead).await?;
        Ok(true)
    }
}
