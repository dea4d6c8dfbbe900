//! Sales users and notification types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery channel for lead alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Sms,
    #[serde(alias = "whats_app")]
    WhatsApp,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "email" => Some(Self::Email),
            "sms" => Some(Self::Sms),
            "whatsapp" | "whats_app" => Some(Self::WhatsApp),
            _ => None,
        }
    }
}

/// Delivery status of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Queued,
    SimulatedSent,
    Skipped,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::SimulatedSent => "simulated_sent",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// A sales user and the region they own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub region: String,
    /// Channels this user wants alerts on; empty means the service default
    #[serde(default)]
    pub channels: Vec<NotificationChannel>,
}

impl SalesUser {
    /// Whether this user owns the given geography (trimmed, case-insensitive)
    pub fn covers(&self, geo: &str) -> bool {
        let geo = geo.trim();
        !geo.is_empty() && self.region.trim().eq_ignore_ascii_case(geo)
    }

    /// Delivery address for a channel, if the user has one
    pub fn address_for(&self, channel: NotificationChannel) -> Option<&str> {
        match channel {
            NotificationChannel::Email => self.email.as_deref(),
            NotificationChannel::Sms | NotificationChannel::WhatsApp => self.phone.as_deref(),
        }
        .filter(|a| !a.trim().is_empty())
    }
}

/// Result of handing a notification to a notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReceipt {
    pub notification_id: Uuid,
    pub user_id: String,
    pub lead_id: String,
    pub channel: NotificationChannel,
    pub status: NotificationStatus,
    pub sent_at: DateTime<Utc>,
    pub simulated: bool,
}
