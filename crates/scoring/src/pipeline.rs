//! Lead pipeline
//!
//! Orchestrates ingestion, scoring, feedback and learning over the store
//! traits. Each operation is a single request/response pass; nothing here
//! schedules background work or serializes concurrent weight updates.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use lead_intel_config::{DomainTables, LearningPolicy, LearningSettings, NotificationSettings};
use lead_intel_core::{
    AiInference, Error, FeedbackAction, FeedbackRecord, FeedbackStore, Lead, LeadFilter, LeadStatus,
    LeadStore, LearnedWeights, NotificationReceipt, Notifier, Result, SalesDirectory, SalesUser,
    SignalAnnotator, WeightSuggestion, WeightsStore,
};

use crate::analyzer::{self, FeedbackAnalysis, ReasonCount};
use crate::learning::{score_with_learning, LearnedScore};
use crate::recorder::{build_record, FeedbackRequest};
use crate::scorer::LeadScorer;

/// Lead submitted for ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub geo: Option<String>,
    #[serde(default)]
    pub trust: Option<f64>,
    #[serde(default)]
    pub signal_at: Option<DateTime<Utc>>,
    /// Pre-computed annotation; skips the annotator when present
    #[serde(default)]
    pub ai_inference: Option<AiInference>,
}

impl NewLead {
    pub fn new(company: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            signal: signal.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            return Err(Error::Validation("company is required".to_string()));
        }
        if self.signal.trim().is_empty() {
            return Err(Error::Validation("signal is required".to_string()));
        }
        Ok(())
    }

    fn into_lead(self) -> Lead {
        let mut lead = Lead::new(self.company.trim(), self.signal.trim())
            .with_source(self.source, self.source_type);
        lead.geo = self.geo.filter(|g| !g.trim().is_empty());
        lead.trust = self.trust;
        lead.signal_at = self.signal_at;
        lead.ai_inference = self.ai_inference;
        lead
    }
}

/// Result of ingesting a lead
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub lead: Lead,
    pub notifications: Vec<NotificationReceipt>,
}

/// One analyzer run triggered by feedback or by an explicit retrain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningRun {
    /// Whether the weights document was updated
    pub applied: bool,
    pub sample_size: u64,
    pub weights_version: u64,
    pub suggestion: WeightSuggestion,
    pub insights: Vec<String>,
}

/// Result of recording feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackOutcome {
    pub record: FeedbackRecord,
    pub lead_status: LeadStatus,
    pub feedback_count: u64,
    /// Present when this feedback triggered the analyzer
    pub learning: Option<LearningRun>,
}

/// Feedback totals for dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStats {
    pub total: u64,
    pub by_action: BTreeMap<String, u64>,
    pub approval_rate: Option<f64>,
    pub top_rejection_reasons: Vec<ReasonCount>,
    pub weights_version: u64,
    pub weights_sample_size: u64,
    /// Whether learned weights currently affect scores
    pub learning_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescoreSummary {
    pub rescored: usize,
    pub failed: usize,
}

/// Scoring and learning pipeline over pluggable stores
pub struct LeadPipeline {
    leads: Arc<dyn LeadStore>,
    feedback: Arc<dyn FeedbackStore>,
    weights: Arc<dyn WeightsStore>,
    directory: Arc<dyn SalesDirectory>,
    annotator: Option<Arc<dyn SignalAnnotator>>,
    notifier: Option<Arc<dyn Notifier>>,
    scorer: LeadScorer,
    policy: LearningPolicy,
    learning: LearningSettings,
    notifications: NotificationSettings,
}

impl LeadPipeline {
    pub fn new(
        leads: Arc<dyn LeadStore>,
        feedback: Arc<dyn FeedbackStore>,
        weights: Arc<dyn WeightsStore>,
        directory: Arc<dyn SalesDirectory>,
    ) -> Self {
        Self {
            leads,
            feedback,
            weights,
            directory,
            annotator: None,
            notifier: None,
            scorer: LeadScorer::default(),
            policy: LearningPolicy::default(),
            learning: LearningSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }

    pub fn with_tables(mut self, tables: DomainTables) -> Self {
        self.scorer = LeadScorer::new(tables.scoring);
        self.policy = tables.learning;
        self
    }

    pub fn with_annotator(mut self, annotator: Arc<dyn SignalAnnotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_learning(mut self, learning: LearningSettings) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_notifications(mut self, notifications: NotificationSettings) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn annotator_name(&self) -> Option<&'static str> {
        self.annotator.as_ref().map(|a| a.name())
    }

    pub fn policy(&self) -> &LearningPolicy {
        &self.policy
    }

    /// Annotate, score, assign and persist a new lead, then alert its owner
    pub async fn ingest(&self, input: NewLead) -> Result<IngestOutcome> {
        input.validate()?;
        let mut lead = input.into_lead();

        if lead.ai_inference.is_none() {
            if let Some(annotator) = &self.annotator {
                match annotator.annotate(&lead.company, &lead.signal).await {
                    Ok(inference) => lead.ai_inference = Some(inference),
                    Err(e) => {
                        tracing::warn!(
                            lead_id = %lead.id,
                            annotator = annotator.name(),
                            error = %e,
                            "Annotation failed, scoring without inference"
                        );
                    }
                }
            }
        }

        let weights = self.weights.current().await?;
        let now = Utc::now();
        self.score_into(&mut lead, &weights, now);

        let owner = self.directory.owner_for(lead.geo.as_deref());
        lead.assigned_to = owner.as_ref().map(|u| u.id.clone());

        self.leads.upsert(&lead).await?;
        metrics::counter!("lead_intel_leads_ingested_total").increment(1);
        tracing::info!(
            lead_id = %lead.id,
            score = lead.score,
            ml_adjusted = lead.ml_adjusted,
            assigned_to = lead.assigned_to.as_deref().unwrap_or("unassigned"),
            "Lead ingested"
        );

        let notifications = match owner {
            Some(user) => self.notify_owner(&user, &lead).await,
            None => Vec::new(),
        };

        Ok(IngestOutcome {
            lead,
            notifications,
        })
    }

    async fn notify_owner(&self, user: &SalesUser, lead: &Lead) -> Vec<NotificationReceipt> {
        let notifier = match (&self.notifier, self.notifications.enabled) {
            (Some(notifier), true) => notifier,
            _ => return Vec::new(),
        };

        let channels = self.notifications.channels_for(user);
        let sends = channels
            .iter()
            .map(|channel| notifier.notify(user, lead, *channel));

        join_all(sends)
            .await
            .into_iter()
            .zip(channels.iter())
            .filter_map(|(result, channel)| match result {
                Ok(receipt) => {
                    metrics::counter!("lead_intel_notifications_total", "channel" => channel.as_str())
                        .increment(1);
                    Some(receipt)
                }
                Err(e) => {
                    tracing::warn!(
                        lead_id = %lead.id,
                        user_id = %user.id,
                        channel = channel.as_str(),
                        error = %e,
                        "Notification failed"
                    );
                    None
                }
            })
            .collect()
    }

    fn score_into(&self, lead: &mut Lead, weights: &LearnedWeights, now: DateTime<Utc>) {
        let regions = self.directory.regions();
        let scored = score_with_learning(&self.scorer, lead, &regions, weights, &self.policy, now);
        scored.apply_to(lead, now);
        metrics::counter!("lead_intel_scores_total").increment(1);
        metrics::histogram!("lead_intel_score").record(scored.score as f64);
    }

    /// Score an ad-hoc lead without persisting it
    pub async fn score_preview(&self, lead: &Lead) -> Result<LearnedScore> {
        let weights = self.weights.current().await?;
        let regions = self.directory.regions();
        let scored = score_with_learning(
            &self.scorer,
            lead,
            &regions,
            &weights,
            &self.policy,
            Utc::now(),
        );
        metrics::counter!("lead_intel_scores_total").increment(1);
        Ok(scored)
    }

    /// Score submitted lead fields without annotating or persisting them
    ///
    /// Missing fields fall back to the scorer's neutral defaults.
    pub async fn score_input(&self, input: NewLead) -> Result<LearnedScore> {
        self.score_preview(&input.into_lead()).await
    }

    /// Rescore a stored lead and overwrite its score, breakdown and explanation
    pub async fn rescore(&self, lead_id: &str) -> Result<Lead> {
        let mut lead = self.lead(lead_id).await?;
        let weights = self.weights.current().await?;
        self.score_into(&mut lead, &weights, Utc::now());
        self.leads.upsert(&lead).await?;
        tracing::debug!(lead_id = %lead.id, score = lead.score, "Lead rescored");
        Ok(lead)
    }

    /// Rescore every stored lead with the current weights
    pub async fn rescore_all(&self) -> Result<RescoreSummary> {
        let leads = self.leads.list(&LeadFilter::default()).await?;
        let weights = self.weights.current().await?;
        let now = Utc::now();

        let mut summary = RescoreSummary::default();
        for mut lead in leads {
            self.score_into(&mut lead, &weights, now);
            match self.leads.upsert(&lead).await {
                Ok(()) => summary.rescored += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(lead_id = %lead.id, error = %e, "Failed to persist rescored lead");
                }
            }
        }

        tracing::info!(
            rescored = summary.rescored,
            failed = summary.failed,
            weights_version = weights.version,
            "Batch rescore complete"
        );
        Ok(summary)
    }

    pub async fn lead(&self, lead_id: &str) -> Result<Lead> {
        self.leads
            .get(lead_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Lead {}", lead_id)))
    }

    pub async fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        self.leads.list(filter).await
    }

    /// Record feedback, update the lead status and run learning when due
    pub async fn record_feedback(&self, request: FeedbackRequest) -> Result<FeedbackOutcome> {
        let feedback = request.validate()?;
        let lead = self.lead(&feedback.lead_id).await?;

        let record = build_record(
            &lead,
            &feedback,
            &self.scorer.config().importance_keywords,
            Utc::now(),
        );
        self.feedback.insert(&record).await?;

        let lead_status = feedback.action.resulting_status();
        if !self.leads.update_status(&lead.id, lead_status).await? {
            tracing::warn!(
                lead_id = %lead.id,
                status = lead_status.as_str(),
                "Lead vanished before its status update; feedback kept"
            );
        }

        metrics::counter!("lead_intel_feedback_total", "action" => feedback.action.as_str())
            .increment(1);

        let feedback_count = self.feedback.count().await?;
        tracing::info!(
            lead_id = %lead.id,
            user_id = %feedback.user_id,
            action = feedback.action.as_str(),
            feedback_count,
            "Feedback recorded"
        );

        let converted = feedback.action == FeedbackAction::Converted;
        let learning = if self.learning.should_retrain(feedback_count, converted) {
            Some(self.retrain().await?)
        } else {
            None
        };

        Ok(FeedbackOutcome {
            record,
            lead_status,
            feedback_count,
            learning,
        })
    }

    /// Analyze the full feedback history without touching the weights
    pub async fn analyze(&self) -> Result<FeedbackAnalysis> {
        let records = self.feedback.list_all().await?;
        Ok(analyzer::analyze(&records, &self.policy))
    }

    /// Run the analyzer and apply any suggestion to the weights store
    pub async fn retrain(&self) -> Result<LearningRun> {
        let records = self.feedback.list_all().await?;
        let analysis = analyzer::analyze(&records, &self.policy);
        let sample_size = records.len() as u64;

        if analysis.suggested_weights.is_empty() {
            let current = self.weights.current().await?;
            tracing::debug!(sample_size, "Learning run produced no suggestion");
            return Ok(LearningRun {
                applied: false,
                sample_size,
                weights_version: current.version,
                suggestion: analysis.suggested_weights,
                insights: analysis.insights,
            });
        }

        let updated = self
            .weights
            .apply_update(&analysis.suggested_weights, sample_size)
            .await?;
        metrics::counter!("lead_intel_learning_updates_total").increment(1);

        Ok(LearningRun {
            applied: true,
            sample_size,
            weights_version: updated.version,
            suggestion: analysis.suggested_weights,
            insights: analysis.insights,
        })
    }

    pub async fn feedback_stats(&self) -> Result<FeedbackStats> {
        let records = self.feedback.list_all().await?;
        let weights = self.weights.current().await?;

        let mut by_action: BTreeMap<String, u64> = FeedbackAction::ALL
            .iter()
            .map(|a| (a.as_str().to_string(), 0))
            .collect();
        for record in &records {
            *by_action.entry(record.action.as_str().to_string()).or_default() += 1;
        }

        let approved = records.iter().filter(|r| r.action.is_positive()).count();
        let rejected = records.iter().filter(|r| r.action.is_negative()).count();
        let approval_rate =
            (approved + rejected > 0).then(|| approved as f64 / (approved + rejected) as f64);

        let mut top_rejection_reasons = analyzer::rejection_reasons(&records);
        top_rejection_reasons.truncate(self.policy.top_rejection_reasons);

        Ok(FeedbackStats {
            total: records.len() as u64,
            by_action,
            approval_rate,
            top_rejection_reasons,
            weights_version: weights.version,
            weights_sample_size: weights.sample_size,
            learning_active: weights.sample_size >= self.policy.min_sample_size,
        })
    }

    /// Admin purge of the feedback history; learned weights are left as they are
    pub async fn purge_feedback(&self) -> Result<u64> {
        let removed = self.feedback.purge().await?;
        tracing::warn!(removed, "Feedback history purged");
        Ok(removed)
    }

    pub async fn current_weights(&self) -> Result<LearnedWeights> {
        self.weights.current().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lead_intel_core::{NotificationChannel, RejectionReason};
    use lead_intel_persistence::{
        InMemoryFeedbackStore, InMemoryLeadStore, InMemoryWeightsStore, LogNotifier,
        StaticSalesDirectory,
    };

    struct FixedAnnotator;

    #[async_trait]
    impl SignalAnnotator for FixedAnnotator {
        async fn annotate(&self, _company: &str, _signal: &str) -> Result<AiInference> {
            Ok(AiInference {
                confidence_score: 0.8,
                industry: Some("Cement".to_string()),
                ..AiInference::default()
            })
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingAnnotator;

    #[async_trait]
    impl SignalAnnotator for FailingAnnotator {
        async fn annotate(&self, _company: &str, _signal: &str) -> Result<AiInference> {
            Err(Error::Annotation("upstream timeout".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn sales_team() -> Vec<SalesUser> {
        vec![SalesUser {
            id: "priya".to_string(),
            name: "Priya".to_string(),
            email: Some("priya@example.com".to_string()),
            phone: Some("+919800000000".to_string()),
            region: "Gujarat".to_string(),
            channels: vec![NotificationChannel::Email, NotificationChannel::Sms],
        }]
    }

    fn pipeline() -> (LeadPipeline, Arc<LogNotifier>) {
        let notifier = Arc::new(LogNotifier::new());
        let pipeline = LeadPipeline::new(
            Arc::new(InMemoryLeadStore::new()),
            Arc::new(InMemoryFeedbackStore::new()),
            Arc::new(InMemoryWeightsStore::new()),
            Arc::new(StaticSalesDirectory::new(sales_team())),
        )
        .with_notifier(notifier.clone());
        (pipeline, notifier)
    }

    fn strong_lead() -> NewLead {
        NewLead {
            geo: Some("Gujarat".to_string()),
            trust: Some(90.0),
            source_type: "tender_portal".to_string(),
            ..NewLead::new(
                "UltraTech",
                "Urgent tender for diesel supply contract worth 500 crore",
            )
        }
    }

    fn weak_lead() -> NewLead {
        NewLead {
            geo: Some("Gujarat".to_string()),
            trust: Some(40.0),
            source_type: "tender_portal".to_string(),
            ..NewLead::new("Small Traders", "Company profile updated")
        }
    }

    #[tokio::test]
    async fn test_ingest_scores_assigns_and_notifies() {
        let (pipeline, notifier) = pipeline();
        let pipeline = pipeline.with_annotator(Arc::new(FixedAnnotator));

        let outcome = pipeline.ingest(strong_lead()).await.unwrap();
        let lead = outcome.lead;
        assert!(lead.score >= 85);
        assert_eq!(lead.breakdown.intent_strength, 35);
        assert_eq!(lead.assigned_to.as_deref(), Some("priya"));
        assert_eq!(lead.industry(), Some("Cement"));
        assert_eq!(lead.status, LeadStatus::New);
        assert!(!lead.ml_adjusted);

        assert_eq!(outcome.notifications.len(), 2);
        assert_eq!(notifier.sent().len(), 2);

        let stored = pipeline.lead(&lead.id).await.unwrap();
        assert_eq!(stored.score, lead.score);
    }

    #[tokio::test]
    async fn test_ingest_survives_annotation_failure() {
        let (pipeline, _) = pipeline();
        let pipeline = pipeline.with_annotator(Arc::new(FailingAnnotator));

        let outcome = pipeline.ingest(strong_lead()).await.unwrap();
        assert!(outcome.lead.ai_inference.is_none());
        assert_eq!(outcome.lead.breakdown.intent_strength, 28);
    }

    #[tokio::test]
    async fn test_ingest_outside_regions_is_unassigned() {
        let (pipeline, notifier) = pipeline();
        let mut input = strong_lead();
        input.geo = Some("Kerala".to_string());

        let outcome = pipeline.ingest(input).await.unwrap();
        assert!(outcome.lead.assigned_to.is_none());
        assert_eq!(outcome.lead.breakdown.geo_match, 5);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_requires_signal() {
        let (pipeline, _) = pipeline();
        let err = pipeline.ingest(NewLead::new("Acme", "  ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_feedback_updates_status() {
        let (pipeline, _) = pipeline();
        let lead = pipeline.ingest(strong_lead()).await.unwrap().lead;

        let expectations = [
            (FeedbackAction::Approved, LeadStatus::InProgress),
            (FeedbackAction::Contacted, LeadStatus::InProgress),
            (FeedbackAction::Rejected, LeadStatus::Rejected),
        ];
        for (action, status) in expectations {
            let mut request = FeedbackRequest::new(&lead.id, "priya", action);
            if action == FeedbackAction::Rejected {
                request = request.with_reason(RejectionReason::BadTiming);
            }
            let outcome = pipeline.record_feedback(request).await.unwrap();
            assert_eq!(outcome.lead_status, status);
            assert_eq!(pipeline.lead(&lead.id).await.unwrap().status, status);
        }
    }

    /// Lead store whose leads disappear before any status update lands
    struct VanishingLeads(InMemoryLeadStore);

    #[async_trait]
    impl LeadStore for VanishingLeads {
        async fn get(&self, id: &str) -> Result<Option<Lead>> {
            self.0.get(id).await
        }

        async fn upsert(&self, lead: &Lead) -> Result<()> {
            self.0.upsert(lead).await
        }

        async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
            self.0.list(filter).await
        }

        async fn update_status(&self, _id: &str, _status: LeadStatus) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_feedback_kept_when_status_update_misses() {
        let pipeline = LeadPipeline::new(
            Arc::new(VanishingLeads(InMemoryLeadStore::new())),
            Arc::new(InMemoryFeedbackStore::new()),
            Arc::new(InMemoryWeightsStore::new()),
            Arc::new(StaticSalesDirectory::new(sales_team())),
        );
        let lead = pipeline.ingest(strong_lead()).await.unwrap().lead;

        let outcome = pipeline
            .record_feedback(FeedbackRequest::new(&lead.id, "priya", FeedbackAction::Approved))
            .await
            .unwrap();
        assert_eq!(outcome.lead_status, LeadStatus::InProgress);
        assert_eq!(pipeline.feedback_stats().await.unwrap().total, 1);
        assert_eq!(pipeline.lead(&lead.id).await.unwrap().status, LeadStatus::New);
    }

    #[tokio::test]
    async fn test_feedback_on_unknown_lead() {
        let (pipeline, _) = pipeline();
        let err = pipeline
            .record_feedback(FeedbackRequest::new("missing", "priya", FeedbackAction::Approved))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(pipeline.feedback_stats().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_learning_triggers_and_applies() {
        let (pipeline, _) = pipeline();

        let mut outcomes = Vec::new();
        for _ in 0..6 {
            let lead = pipeline.ingest(strong_lead()).await.unwrap().lead;
            outcomes.push(
                pipeline
                    .record_feedback(FeedbackRequest::new(&lead.id, "priya", FeedbackAction::Approved))
                    .await
                    .unwrap(),
            );
        }
        for _ in 0..6 {
            let lead = pipeline.ingest(weak_lead()).await.unwrap().lead;
            outcomes.push(
                pipeline
                    .record_feedback(
                        FeedbackRequest::new(&lead.id, "priya", FeedbackAction::Rejected)
                            .with_reason(RejectionReason::TooSmall),
                    )
                    .await
                    .unwrap(),
            );
        }

        // Cadence of five: runs at 5 (insufficient) and 10 (applied)
        let fifth = outcomes[4].learning.as_ref().unwrap();
        assert!(!fifth.applied);
        let tenth = outcomes[9].learning.as_ref().unwrap();
        assert!(tenth.applied);
        assert_eq!(tenth.sample_size, 10);
        assert!(outcomes[10].learning.is_none());

        let weights = pipeline.current_weights().await.unwrap();
        assert_eq!(weights.version, 1);
        assert_eq!(weights.sample_size, 10);
        assert!(weights.intent_strength_multiplier > 1.0);

        // New leads now carry learned adjustments
        let scored = pipeline.ingest(strong_lead()).await.unwrap().lead;
        assert!(scored.ml_adjusted);
        assert!(!scored.ml_adjustments.is_empty());

        let stats = pipeline.feedback_stats().await.unwrap();
        assert_eq!(stats.total, 12);
        assert_eq!(stats.by_action["approved"], 6);
        assert_eq!(stats.by_action["converted"], 0);
        assert_eq!(stats.top_rejection_reasons[0].reason, RejectionReason::TooSmall);
        assert!(stats.learning_active);
    }

    #[tokio::test]
    async fn test_conversion_triggers_learning_run() {
        let (pipeline, _) = pipeline();
        let lead = pipeline.ingest(strong_lead()).await.unwrap().lead;
        let outcome = pipeline
            .record_feedback(FeedbackRequest::new(&lead.id, "priya", FeedbackAction::Converted))
            .await
            .unwrap();
        let run = outcome.learning.unwrap();
        assert!(!run.applied);
        assert_eq!(run.weights_version, 0);
        assert_eq!(run.insights.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_resets_analysis_but_keeps_weights() {
        let (pipeline, _) = pipeline();
        for i in 0..10 {
            let input = if i % 2 == 0 { strong_lead() } else { weak_lead() };
            let action = if i % 2 == 0 {
                FeedbackAction::Approved
            } else {
                FeedbackAction::Rejected
            };
            let lead = pipeline.ingest(input).await.unwrap().lead;
            pipeline
                .record_feedback(FeedbackRequest::new(&lead.id, "priya", action))
                .await
                .unwrap();
        }
        let before = pipeline.current_weights().await.unwrap();
        assert_eq!(before.version, 1);
        assert!(pipeline.analyze().await.unwrap().is_sufficient());

        assert_eq!(pipeline.purge_feedback().await.unwrap(), 10);

        let analysis = pipeline.analyze().await.unwrap();
        assert!(!analysis.is_sufficient());
        assert!(analysis.suggested_weights.is_empty());
        assert_eq!(analysis.insights.len(), 1);
        assert!(analysis.insights[0].starts_with("Need at least 10"));

        assert_eq!(pipeline.feedback_stats().await.unwrap().total, 0);
        assert_eq!(pipeline.current_weights().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_rescore_all_and_preview() {
        let (pipeline, _) = pipeline();
        pipeline.ingest(strong_lead()).await.unwrap();
        pipeline.ingest(weak_lead()).await.unwrap();

        let summary = pipeline.rescore_all().await.unwrap();
        assert_eq!(summary.rescored, 2);
        assert_eq!(summary.failed, 0);

        let preview = pipeline
            .score_preview(&Lead::new("Acme", "urgent tender").with_geo("gujarat"))
            .await
            .unwrap();
        assert_eq!(preview.breakdown.geo_match, 10);
        assert!(pipeline.list_leads(&LeadFilter::default()).await.unwrap().len() == 2);
    }

    #[tokio::test]
    async fn test_score_input_is_not_persisted() {
        let (pipeline, notifier) = pipeline();
        let scored = pipeline.score_input(strong_lead()).await.unwrap();
        assert!(scored.score >= 70);
        assert!(!scored.ml_adjusted);
        assert!(pipeline.list_leads(&LeadFilter::default()).await.unwrap().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_rescore_unknown_lead() {
        let (pipeline, _) = pipeline();
        assert!(matches!(
            pipeline.rescore("nope").await,
            Err(Error::NotFound(_))
        ));
    }
}
