//! Storage backends for the lead intelligence service
//!
//! Provides:
//! - ScyllaDB stores for leads, feedback history and learned weights
//! - Simulated lead alerts, persisted for audit
//! - In-memory equivalents for local runs and tests
//! - A configuration-backed sales directory

pub mod client;
pub mod directory;
pub mod error;
pub mod feedback;
pub mod leads;
pub mod memory;
pub mod notifications;
pub mod schema;
pub mod weights;

pub use client::{ScyllaClient, ScyllaConfig};
pub use directory::StaticSalesDirectory;
pub use error::PersistenceError;
pub use feedback::ScyllaFeedbackStore;
pub use leads::ScyllaLeadStore;
pub use memory::{InMemoryFeedbackStore, InMemoryLeadStore, InMemoryWeightsStore, LogNotifier};
pub use notifications::{format_lead_alert, SimulatedNotifier};
pub use weights::ScyllaWeightsStore;

/// Connect to ScyllaDB, ensure the schema and build every store
pub async fn init(config: ScyllaConfig) -> Result<PersistenceLayer, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;

    Ok(PersistenceLayer {
        leads: ScyllaLeadStore::new(client.clone()),
        feedback: ScyllaFeedbackStore::new(client.clone()),
        weights: ScyllaWeightsStore::new(client.clone()),
        notifier: SimulatedNotifier::new(client),
    })
}

/// Combined persistence layer with all services
pub struct PersistenceLayer {
    pub leads: ScyllaLeadStore,
    /// Append-only, read in full on every learning run
    pub feedback: ScyllaFeedbackStore,
    pub weights: ScyllaWeightsStore,
    pub notifier: SimulatedNotifier,
}
