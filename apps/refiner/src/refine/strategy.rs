//! Rewrite strategies: the fixed set of instruction templates, one candidate each.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::refine::prompts::{
    CONVERT_LOCAL, CONVERT_TEMPLATE, PARAPHRASE_LOCAL, PARAPHRASE_TEMPLATE, RECAST_LOCAL,
    RECAST_TEMPLATE, REFORMULATE_LOCAL, REFORMULATE_TEMPLATE, REGENERATE_LOCAL,
    REGENERATE_TEMPLATE,
};

/// Sampling temperature for every generation call. The strategies only
/// differ in wording; most of the variety comes from sampling.
pub const TEMPERATURE: f32 = 0.9;

const PROMPT_PLACEHOLDER: &str = "{user_prompt}";

// ────────────────────────────────────────────────────────────────────────────
// Strategy set
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteStrategy {
    Paraphrase,
    Recast,
    Reformulate,
    Convert,
    Regenerate,
}

impl RewriteStrategy {
    /// Declaration order. The number of candidates per request equals `ALL.len()`.
    pub const ALL: [RewriteStrategy; 5] = [
        RewriteStrategy::Paraphrase,
        RewriteStrategy::Recast,
        RewriteStrategy::Reformulate,
        RewriteStrategy::Convert,
        RewriteStrategy::Regenerate,
    ];

    fn template(self) -> &'static str {
        match self {
            RewriteStrategy::Paraphrase => PARAPHRASE_TEMPLATE,
            RewriteStrategy::Recast => RECAST_TEMPLATE,
            RewriteStrategy::Reformulate => REFORMULATE_TEMPLATE,
            RewriteStrategy::Convert => CONVERT_TEMPLATE,
            RewriteStrategy::Regenerate => REGENERATE_TEMPLATE,
        }
    }

    fn local_template(self) -> &'static str {
        match self {
            RewriteStrategy::Paraphrase => PARAPHRASE_LOCAL,
            RewriteStrategy::Recast => RECAST_LOCAL,
            RewriteStrategy::Reformulate => REFORMULATE_LOCAL,
            RewriteStrategy::Convert => CONVERT_LOCAL,
            RewriteStrategy::Regenerate => REGENERATE_LOCAL,
        }
    }

    /// Builds the instruction sent to the generation service. Contains `prompt` verbatim.
    pub fn instruction_text(self, prompt: &str) -> String {
        self.template().replace(PROMPT_PLACEHOLDER, prompt)
    }

    /// Templated rephrasing used by the offline backend.
    pub fn local_rephrasing(self, prompt: &str) -> String {
        self.local_template().replace(PROMPT_PLACEHOLDER, prompt)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Instruction
// ────────────────────────────────────────────────────────────────────────────

/// One request to the generation capability.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub strategy: RewriteStrategy,
    pub source_prompt: String,
    pub text: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Instruction {
    pub fn new(strategy: RewriteStrategy, prompt: &str, max_output_tokens: u32) -> Self {
        Self {
            strategy,
            source_prompt: prompt.to_string(),
            text: strategy.instruction_text(prompt),
            temperature: TEMPERATURE,
            max_output_tokens,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Application order
// ────────────────────────────────────────────────────────────────────────────

/// How the strategy set is ordered for a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOrder {
    /// Declaration order of `RewriteStrategy::ALL`.
    Declared,
    /// Shuffled per invocation. A fixed seed makes every shuffle identical.
    Shuffled { seed: Option<u64> },
}

impl StrategyOrder {
    pub fn arrange(&self, strategies: &[RewriteStrategy]) -> Vec<RewriteStrategy> {
        let mut arranged = strategies.to_vec();
        if let StrategyOrder::Shuffled { seed } = self {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            arranged.shuffle(&mut rng);
        }
        arranged
    }
}
