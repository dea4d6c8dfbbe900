//! Simulated lead alerts with ScyllaDB persistence
//!
//! Alerts are NOT actually delivered. Each one is rendered and written to the
//! notifications table as an audit trail.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use lead_intel_core::{
    Lead, NotificationChannel, NotificationReceipt, NotificationStatus, Notifier, Result,
    SalesUser,
};

use crate::{PersistenceError, ScyllaClient};

const SHORT_SIGNAL_CHARS: usize = 120;

/// Render the alert text for a channel
///
/// Email gets a subject line and the full explanation; SMS and WhatsApp get a
/// single line with the signal cut short.
pub fn format_lead_alert(user: &SalesUser, lead: &Lead, channel: NotificationChannel) -> String {
    let geo = lead.geo.as_deref().unwrap_or("unknown region");
    match channel {
        NotificationChannel::Email => {
            let mut body = format!(
                "Subject: New lead {}/100: {}\n\nHi {},\n\n{} ({}) scored {}/100.\n\nSignal: {}\n",
                lead.score,
                lead.company,
                display_name(user),
                lead.company,
                geo,
                lead.score,
                lead.signal.trim()
            );
            if !lead.explanation.is_empty() {
                body.push_str("\nWhy:\n");
                for line in &lead.explanation {
                    body.push_str("- ");
                    body.push_str(line);
                    body.push('\n');
                }
            }
            body.push_str(&format!("\nLead ID: {}\n", lead.id));
            body
        }
        NotificationChannel::Sms | NotificationChannel::WhatsApp => format!(
            "New lead {}/100: {} ({}). {} [{}]",
            lead.score,
            lead.company,
            geo,
            shorten(lead.signal.trim(), SHORT_SIGNAL_CHARS),
            lead.id
        ),
    }
}

fn display_name(user: &SalesUser) -> &str {
    if user.name.trim().is_empty() {
        &user.id
    } else {
        &user.name
    }
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Receipt for a channel the user has no address on
pub(crate) fn skipped_receipt(
    user: &SalesUser,
    lead: &Lead,
    channel: NotificationChannel,
) -> NotificationReceipt {
    NotificationReceipt {
        notification_id: Uuid::new_v4(),
        user_id: user.id.clone(),
        lead_id: lead.id.clone(),
        channel,
        status: NotificationStatus::Skipped,
        sent_at: Utc::now(),
        simulated: true,
    }
}

/// Simulated notifier that persists every alert to ScyllaDB
#[derive(Clone)]
pub struct SimulatedNotifier {
    client: ScyllaClient,
}

impl SimulatedNotifier {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn persist(
        &self,
        receipt: &NotificationReceipt,
        recipient: &str,
        message: &str,
    ) -> std::result::Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {} (
                user_id, notification_id, lead_id, channel,
                recipient, message_text, status, sent_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.table("notifications")
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    receipt.user_id.as_str(),
                    receipt.notification_id,
                    receipt.lead_id.as_str(),
                    receipt.channel.as_str(),
                    recipient,
                    message,
                    receipt.status.as_str(),
                    receipt.sent_at.timestamp_millis(),
                ),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SimulatedNotifier {
    async fn notify(
        &self,
        user: &SalesUser,
        lead: &Lead,
        channel: NotificationChannel,
    ) -> Result<NotificationReceipt> {
        let Some(recipient) = user.address_for(channel) else {
            tracing::warn!(
                user_id = %user.id,
                channel = channel.as_str(),
                "No address for channel, alert skipped"
            );
            return Ok(skipped_receipt(user, lead, channel));
        };

        let message = format_lead_alert(user, lead, channel);
        let receipt = NotificationReceipt {
            notification_id: Uuid::new_v4(),
            user_id: user.id.clone(),
            lead_id: lead.id.clone(),
            channel,
            status: NotificationStatus::SimulatedSent,
            sent_at: Utc::now(),
            simulated: true,
        };

        self.persist(&receipt, recipient, &message).await?;

        tracing::info!(
            user_id = %user.id,
            lead_id = %lead.id,
            channel = channel.as_str(),
            notification_id = %receipt.notification_id,
            "Lead alert simulated and persisted to ScyllaDB"
        );
        tracing::debug!(recipient = %recipient, message = %message, "Alert content (simulated)");

        Ok(receipt)
    }
}
