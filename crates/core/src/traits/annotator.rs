//! Signal annotation trait

use async_trait::async_trait;

use crate::error::Result;
use crate::lead::AiInference;

/// Produces an AI inference (confidence, urgency, industry) for signal text
#[async_trait]
pub trait SignalAnnotator: Send + Sync {
    async fn annotate(&self, company: &str, signal: &str) -> Result<AiInference>;

    /// Backend name for logs and health output
    fn name(&self) -> &'static str;
}
