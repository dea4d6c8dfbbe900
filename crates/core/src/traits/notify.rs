//! Routing and notification traits

use async_trait::async_trait;

use crate::error::Result;
use crate::lead::Lead;
use crate::notification::{NotificationChannel, NotificationReceipt, SalesUser};

/// Directory of sales users and their assigned regions
pub trait SalesDirectory: Send + Sync {
    fn sales_users(&self) -> Vec<SalesUser>;

    /// Assigned regions of every sales user
    fn regions(&self) -> Vec<String> {
        self.sales_users().into_iter().map(|u| u.region).collect()
    }

    /// First sales user owning the lead's geography
    fn owner_for(&self, geo: Option<&str>) -> Option<SalesUser> {
        let geo = geo?;
        self.sales_users().into_iter().find(|u| u.covers(geo))
    }
}

/// Lead alert delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        user: &SalesUser,
        lead: &Lead,
        channel: NotificationChannel,
    ) -> Result<NotificationReceipt>;
}
