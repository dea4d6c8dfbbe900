//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use lead_intel_config::{DomainTables, Settings};
use lead_intel_core::{FeedbackStore, LeadStore, Notifier, SignalAnnotator, WeightsStore};
use lead_intel_persistence::{
    InMemoryFeedbackStore, InMemoryLeadStore, InMemoryWeightsStore, LogNotifier,
    PersistenceLayer, StaticSalesDirectory,
};
use lead_intel_scoring::LeadPipeline;

use crate::rate_limit::RateLimiter;

/// Storage and notification backends for the pipeline
#[derive(Clone)]
pub struct Backends {
    pub leads: Arc<dyn LeadStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub weights: Arc<dyn WeightsStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Backend name reported by `/health`
    pub storage: &'static str,
}

impl Backends {
    /// Process-local stores; nothing survives a restart
    pub fn in_memory() -> Self {
        Self {
            leads: Arc::new(InMemoryLeadStore::new()),
            feedback: Arc::new(InMemoryFeedbackStore::new()),
            weights: Arc::new(InMemoryWeightsStore::new()),
            notifier: Arc::new(LogNotifier::new()),
            storage: "memory",
        }
    }

    pub fn scylla(layer: PersistenceLayer) -> Self {
        Self {
            leads: Arc::new(layer.leads),
            feedback: Arc::new(layer.feedback),
            weights: Arc::new(layer.weights),
            notifier: Arc::new(layer.notifier),
            storage: "scylla",
        }
    }
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub pipeline: Arc<LeadPipeline>,
    pub rate_limiter: Arc<RateLimiter>,
    pub storage: &'static str,
}

impl AppState {
    /// Wire the pipeline from settings, tables and backends
    pub fn new(
        config: Settings,
        tables: DomainTables,
        backends: Backends,
        annotator: Option<Arc<dyn SignalAnnotator>>,
    ) -> Self {
        let directory = Arc::new(StaticSalesDirectory::new(config.sales_users.clone()));
        let mut pipeline = LeadPipeline::new(
            backends.leads,
            backends.feedback,
            backends.weights,
            directory,
        )
        .with_tables(tables)
        .with_notifier(backends.notifier)
        .with_learning(config.learning.clone())
        .with_notifications(config.notifications.clone());
        if let Some(annotator) = annotator {
            pipeline = pipeline.with_annotator(annotator);
        }

        Self {
            rate_limiter: Arc::new(RateLimiter::new(&config.server.rate_limit)),
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            storage: backends.storage,
        }
    }

    /// In-memory state with default tables and no annotator
    pub fn in_memory(config: Settings) -> Self {
        Self::new(config, DomainTables::default(), Backends::in_memory(), None)
    }
}
