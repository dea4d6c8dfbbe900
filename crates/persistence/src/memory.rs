//! In-memory backends
//!
//! Used when ScyllaDB persistence is disabled and in tests. Nothing survives a
//! restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use lead_intel_core::{
    FeedbackRecord, FeedbackStore, Lead, LeadFilter, LeadStatus, LeadStore, LearnedWeights,
    NotificationChannel, NotificationReceipt, NotificationStatus, Notifier, Result, SalesUser,
    WeightsStore,
};

use crate::notifications::{format_lead_alert, skipped_receipt};

#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    leads: RwLock<HashMap<String, Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn get(&self, id: &str) -> Result<Option<Lead>> {
        Ok(self.leads.read().get(id).cloned())
    }

    async fn upsert(&self, lead: &Lead) -> Result<()> {
        self.leads.write().insert(lead.id.clone(), lead.clone());
        Ok(())
    }

    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        let leads: Vec<Lead> = self.leads.read().values().cloned().collect();
        Ok(filter.apply(leads))
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<bool> {
        let mut leads = self.leads.write();
        match leads.get_mut(id) {
            Some(lead) => {
                lead.status = status;
                lead.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    records: RwLock<Vec<FeedbackRecord>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn insert(&self, record: &FeedbackRecord) -> Result<()> {
        self.records.write().push(record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FeedbackRecord>> {
        Ok(self.records.read().clone())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().len() as u64)
    }

    async fn purge(&self) -> Result<u64> {
        let removed = std::mem::take(&mut *self.records.write());
        Ok(removed.len() as u64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryWeightsStore {
    weights: RwLock<Option<LearnedWeights>>,
}

impl InMemoryWeightsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WeightsStore for InMemoryWeightsStore {
    async fn current(&self) -> Result<LearnedWeights> {
        Ok(self.weights.read().clone().unwrap_or_default())
    }

    async fn save(&self, weights: &LearnedWeights) -> Result<()> {
        *self.weights.write() = Some(weights.clone());
        Ok(())
    }
}

/// Notifier that only logs alerts and keeps the receipts
#[derive(Debug, Default)]
pub struct LogNotifier {
    sent: Mutex<Vec<NotificationReceipt>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every receipt issued so far
    pub fn sent(&self) -> Vec<NotificationReceipt> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        user: &SalesUser,
        lead: &Lead,
        channel: NotificationChannel,
    ) -> Result<NotificationReceipt> {
        let receipt = match user.address_for(channel) {
            Some(recipient) => {
                let message = format_lead_alert(user, lead, channel);
                tracing::info!(
                    user_id = %user.id,
                    lead_id = %lead.id,
                    channel = channel.as_str(),
                    recipient = %recipient,
                    "Lead alert (simulated)"
                );
                tracing::debug!(message = %message, "Alert content (simulated)");
                NotificationReceipt {
                    notification_id: Uuid::new_v4(),
                    user_id: user.id.clone(),
                    lead_id: lead.id.clone(),
                    channel,
                    status: NotificationStatus::SimulatedSent,
                    sent_at: Utc::now(),
                    simulated: true,
                }
            }
            None => skipped_receipt(user, lead, channel),
        };

        self.sent.lock().push(receipt.clone());
        Ok(receipt)
    }
}
