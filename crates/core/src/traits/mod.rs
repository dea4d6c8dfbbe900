//! Core traits for the lead intelligence service
//!
//! All backends implement these traits to enable:
//! - Pluggable storage (ScyllaDB or in-memory)
//! - Testing with in-memory fakes
//! - Runtime switching based on configuration
//!
//! # Trait Hierarchy
//!
//! ```text
//! Storage:
//!   - LeadStore: lead documents (overwrite semantics)
//!   - FeedbackStore: append-only feedback history
//!   - WeightsStore: singleton learned-weights document
//!
//! Routing:
//!   - SalesDirectory: sales users and the regions they own
//!   - Notifier: email / SMS / WhatsApp lead alerts
//!
//! Annotation:
//!   - SignalAnnotator: language-model inference over signal text
//! ```

mod annotator;
mod notify;
mod stores;

pub use annotator::SignalAnnotator;
pub use notify::{Notifier, SalesDirectory};
pub use stores::{FeedbackStore, LeadStore, WeightsStore};
