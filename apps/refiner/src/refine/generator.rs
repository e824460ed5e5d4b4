//! Candidate generation: one rewrite per strategy, issued concurrently.
//!
//! A failing, empty, hung or panicked call never fails the batch: the slot is
//! filled with a degraded placeholder so the output length always equals the
//! number of strategies.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::llm_client::ServiceError;
use crate::refine::strategy::{Instruction, RewriteStrategy, StrategyOrder};

// ────────────────────────────────────────────────────────────────────────────
// Backend trait
// ────────────────────────────────────────────────────────────────────────────

/// The text-generation capability. Implement this to swap backends without
/// touching the generator or the handlers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, instruction: &Instruction) -> Result<String, ServiceError>;

    fn name(&self) -> &str;
}

/// Offline backend: answers each instruction with the strategy's templated
/// rephrasing of the source prompt. Used when no API key is configured.
pub struct TemplateGenerator;

#[async_trait]
impl TextGenerator for TemplateGenerator {
    async fn complete(&self, instruction: &Instruction) -> Result<String, ServiceError> {
        Ok(instruction
            .strategy
            .local_rephrasing(&instruction.source_prompt))
    }

    fn name(&self) -> &str {
        "template"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub strategy: RewriteStrategy,
    pub text: String,
    /// True when `text` is a placeholder rather than a generated rewrite.
    pub degraded: bool,
}

impl Candidate {
    pub fn generated(strategy: RewriteStrategy, text: String) -> Self {
        Self {
            strategy,
            text,
            degraded: false,
        }
    }

    /// Deterministic placeholder: the instruction text plus a failure marker.
    pub fn degraded(instruction: &Instruction, reason: &str) -> Self {
        Self {
            strategy: instruction.strategy,
            text: format!("{} (Refinement failed: {reason})", instruction.text),
            degraded: true,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub order: StrategyOrder,
    /// Upper bound for a single backend call, retries included.
    pub call_timeout: Duration,
    pub max_output_tokens: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            order: StrategyOrder::Shuffled { seed: None },
            call_timeout: Duration::from_secs(20),
            max_output_tokens: 256,
        }
    }
}

pub struct Generator {
    backend: Arc<dyn TextGenerator>,
    settings: GeneratorSettings,
}

impl Generator {
    pub fn new(backend: Arc<dyn TextGenerator>, settings: GeneratorSettings) -> Self {
        Self { backend, settings }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Instructions for one invocation, in application order.
    pub fn instructions(&self, prompt: &str) -> Vec<Instruction> {
        self.settings
            .order
            .arrange(&RewriteStrategy::ALL)
            .into_iter()
            .map(|strategy| Instruction::new(strategy, prompt, self.settings.max_output_tokens))
            .collect()
    }

    /// Generates one candidate per strategy. Position `i` of the output always
    /// corresponds to instruction `i`, whatever order the calls complete in.
    pub async fn generate(&self, prompt: &str) -> Vec<Candidate> {
        let instructions = self.instructions(prompt);
        let call_timeout = self.settings.call_timeout;

        let mut join_set = JoinSet::new();
        for (index, instruction) in instructions.iter().cloned().enumerate() {
            let backend = Arc::clone(&self.backend);
            join_set.spawn(async move {
                let outcome =
                    match tokio::time::timeout(call_timeout, backend.complete(&instruction)).await {
                        Ok(result) => result,
                        Err(_) => Err(ServiceError::Timeout(call_timeout)),
                    };
                (index, into_candidate(&instruction, outcome))
            });
        }

        let mut slots: Vec<Option<Candidate>> = vec![None; instructions.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, candidate)) => slots[index] = Some(candidate),
                Err(e) => warn!("Generation task aborted: {e}"),
            }
        }

        let candidates: Vec<Candidate> = slots
            .into_iter()
            .zip(&instructions)
            .map(|(slot, instruction)| {
                slot.unwrap_or_else(|| Candidate::degraded(instruction, "task aborted"))
            })
            .collect();

        let degraded = candidates.iter().filter(|c| c.degraded).count();
        info!(
            backend = self.backend.name(),
            total = candidates.len(),
            degraded,
            "Generated candidates"
        );

        candidates
    }
}

fn into_candidate(instruction: &Instruction, outcome: Result<String, ServiceError>) -> Candidate {
    match outcome {
        Ok(text) if !text.trim().is_empty() => {
            Candidate::generated(instruction.strategy, text.trim().to_string())
        }
        Ok(_) => {
            warn!(strategy = ?instruction.strategy, "Generation returned empty text");
            Candidate::degraded(instruction, &ServiceError::EmptyResponse.reason())
        }
        Err(e) => {
            warn!(strategy = ?instruction.strategy, "Generation failed: {e}");
            Candidate::degraded(instruction, &e.reason())
        }
    }
}
