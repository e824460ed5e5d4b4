//! Refine pipeline: generate candidates, then score and rank them.
//!
//! Flow: reject empty prompt → generate (one candidate per strategy) →
//!       score each candidate → stable rank → recommend the top entry.
//!
//! Always returns a complete, fixed-size ranking for any non-empty prompt;
//! backend failures show up as degraded candidates, never as errors.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::refine::generator::{Candidate, Generator};
use crate::refine::ranker::{evaluate_and_rank, RankedResult};
use crate::refine::scoring::CandidateScorer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefineError {
    #[error("prompt cannot be empty")]
    EmptyPrompt,
}

/// Result of one refine request.
#[derive(Debug, Clone, Serialize)]
pub struct RefineOutcome {
    pub request_id: Uuid,
    pub original_prompt: String,
    /// Candidates in generation order.
    pub candidates: Vec<Candidate>,
    /// Text of the highest-ranked candidate.
    pub recommendation: String,
    pub ranked: RankedResult,
    pub scorer: String,
    pub generated_at: DateTime<Utc>,
}

pub struct Refiner {
    generator: Generator,
    scorer: Arc<dyn CandidateScorer>,
}

impl Refiner {
    pub fn new(generator: Generator, scorer: Arc<dyn CandidateScorer>) -> Self {
        Self { generator, scorer }
    }

    pub fn backend_name(&self) -> &str {
        self.generator.backend_name()
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    pub async fn refine(&self, prompt: &str) -> Result<RefineOutcome, RefineError> {
        if prompt.trim().is_empty() {
            return Err(RefineError::EmptyPrompt);
        }

        let request_id = Uuid::new_v4();
        let candidates = self.generator.generate(prompt).await;
        let ranked = evaluate_and_rank(&candidates, prompt, self.scorer.as_ref());

        // The strategy set is never empty, so neither is the ranking.
        let recommendation = ranked
            .first()
            .map(|top| top.candidate.text.clone())
            .unwrap_or_default();

        info!(
            %request_id,
            candidates = candidates.len(),
            top_score = ranked.first().map(|s| s.score).unwrap_or_default(),
            "Refined prompt"
        );

        Ok(RefineOutcome {
            request_id,
            original_prompt: prompt.to_string(),
            candidates,
            recommendation,
            ranked,
            scorer: self.scorer.name().to_string(),
            generated_at: Utc::now(),
        })
    }
}
