//! Keyword heuristic annotator
//!
//! Offline fallback when no language model is configured. Deterministic:
//! the same text always yields the same inference.

use async_trait::async_trait;

use lead_intel_core::{AiInference, Result, SignalAnnotator, UrgencyLevel};

/// Industry label and the terms that indicate it
#[derive(Debug, Clone)]
pub struct IndustryRule {
    pub label: String,
    pub terms: Vec<String>,
}

impl IndustryRule {
    fn new(label: &str, terms: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Annotator that guesses confidence, urgency and industry from keywords
#[derive(Debug, Clone)]
pub struct KeywordAnnotator {
    industries: Vec<IndustryRule>,
    intent_terms: Vec<String>,
    urgency_terms: Vec<String>,
    base_confidence: f64,
    per_term: f64,
    max_confidence: f64,
}

impl Default for KeywordAnnotator {
    fn default() -> Self {
        let industries = vec![
            IndustryRule::new("Cement", &["cement", "clinker", "grinding unit"]),
            IndustryRule::new("Steel", &["steel", "blast furnace", "rolling mill", "sponge iron"]),
            IndustryRule::new("Power", &["power plant", "thermal", "megawatt", " mw ", "solar"]),
            IndustryRule::new("Mining", &["mining", "coal", "mine ", "quarry"]),
            IndustryRule::new("Construction", &["construction", "highway", "infrastructure", "epc"]),
            IndustryRule::new("Logistics", &["logistics", "fleet", "warehouse", "trucks"]),
            IndustryRule::new("Oil & Gas", &["refinery", "petroleum", "oil and gas", "pipeline"]),
            IndustryRule::new("Chemicals", &["chemical", "fertilizer", "pharma"]),
            IndustryRule::new("Manufacturing", &["manufacturing", "factory", "plant"]),
        ];
        let intent_terms = [
            "tender", "rfq", "procurement", "expansion", "new plant", "capacity", "contract",
            "supply", "order", "commission", "investment", "crore",
        ];
        let urgency_terms = [
            "urgent", "immediate", "asap", "deadline", "closing date", "last date", "within days",
        ];

        Self {
            industries,
            intent_terms: intent_terms.iter().map(|t| t.to_string()).collect(),
            urgency_terms: urgency_terms.iter().map(|t| t.to_string()).collect(),
            base_confidence: 0.2,
            per_term: 0.1,
            max_confidence: 0.9,
        }
    }
}

impl KeywordAnnotator {
    pub fn infer(&self, company: &str, signal: &str) -> AiInference {
        let text = format!(" {} {} ", company, signal).to_lowercase();

        let intent_hits: Vec<&str> = self
            .intent_terms
            .iter()
            .filter(|t| text.contains(t.as_str()))
            .map(String::as_str)
            .collect();
        let confidence = (self.base_confidence + self.per_term * intent_hits.len() as f64)
            .min(self.max_confidence);

        let urgent = self.urgency_terms.iter().any(|t| text.contains(t.as_str()));
        let urgency_level = if urgent {
            UrgencyLevel::High
        } else if intent_hits.is_empty() {
            UrgencyLevel::Low
        } else {
            UrgencyLevel::Medium
        };

        let industry = self
            .industries
            .iter()
            .find(|rule| rule.terms.iter().any(|t| text.contains(t.as_str())))
            .map(|rule| rule.label.clone());

        let summary = if intent_hits.is_empty() {
            None
        } else {
            Some(format!("Keyword match: {}", intent_hits.join(", ")))
        };

        AiInference {
            confidence_score: confidence,
            urgency_level,
            industry,
            summary,
        }
    }
}

#[async_trait]
impl SignalAnnotator for KeywordAnnotator {
    async fn annotate(&self, company: &str, signal: &str) -> Result<AiInference> {
        Ok(self.infer(company, signal))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
