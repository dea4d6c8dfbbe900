//! Sales directory backed by configuration

use lead_intel_core::{SalesDirectory, SalesUser};

/// Fixed list of sales users loaded at startup
#[derive(Debug, Clone, Default)]
pub struct StaticSalesDirectory {
    users: Vec<SalesUser>,
}

impl StaticSalesDirectory {
    pub fn new(users: Vec<SalesUser>) -> Self {
        Self { users }
    }
}

impl SalesDirectory for StaticSalesDirectory {
    fn sales_users(&self) -> Vec<SalesUser> {
        self.users.clone()
    }
}
