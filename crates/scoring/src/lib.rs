//! Lead scoring and feedback learning
//!
//! Components, leaf-first:
//! - [`scorer`]: rule-based base scorer over the scoring tables
//! - [`recorder`]: feedback validation and snapshotting
//! - [`analyzer`]: approval-rate pattern analysis producing weight suggestions
//! - [`learning`]: applies learned weights on top of a base score
//! - [`pipeline`]: orchestration over the store traits

pub mod analyzer;
pub mod learning;
pub mod pipeline;
pub mod recorder;
pub mod scorer;

pub use analyzer::{
    analyze, CategoryPattern, ComponentPattern, FeedbackAnalysis, FeedbackPatterns, ReasonCount,
};
pub use learning::{apply_learned_weights, score_with_learning, LearnedScore};
pub use pipeline::{
    FeedbackOutcome, FeedbackStats, IngestOutcome, LeadPipeline, LearningRun, NewLead,
    RescoreSummary,
};
pub use recorder::{build_record, extract_keywords, snapshot, FeedbackRequest, ValidFeedback};
pub use scorer::{days_since, LeadScorer, ScoreResult};
