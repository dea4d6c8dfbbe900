//! Core types and traits for the lead intelligence service
//!
//! This crate provides the foundational types shared by every other crate:
//! - Lead records and their score breakdown
//! - Feedback records with frozen scoring snapshots
//! - The versioned learned-weights document
//! - Store, directory, notifier and annotator traits for pluggable backends
//! - Error types

pub mod error;
pub mod feedback;
pub mod lead;
pub mod notification;
pub mod traits;
pub mod weights;

pub use error::{Error, Result};
pub use feedback::{FeedbackAction, FeedbackRecord, LeadSnapshot, RejectionReason};
pub use lead::{
    AiInference, Lead, LeadFilter, LeadStatus, ScoreBreakdown, ScoreComponent, UrgencyLevel,
};
pub use notification::{NotificationChannel, NotificationReceipt, NotificationStatus, SalesUser};
pub use weights::{BoostTable, LearnedWeights, WeightSuggestion, LEARNED_WEIGHTS_ID};

pub use traits::{FeedbackStore, LeadStore, Notifier, SalesDirectory, SignalAnnotator, WeightsStore};
