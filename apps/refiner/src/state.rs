use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::export::font_metrics::{default_page_config, PageConfig};
use crate::llm_client::GeminiClient;
use crate::refine::generator::{Generator, GeneratorSettings, TemplateGenerator, TextGenerator};
use crate::refine::pipeline::Refiner;
use crate::refine::scoring::{CandidateScorer, HeuristicScorer, RandomScorer, ScorerKind};
use crate::refine::strategy::StrategyOrder;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only immutable collaborators; every request builds its own results.
#[derive(Clone)]
pub struct AppState {
    pub refiner: Arc<Refiner>,
    /// Page geometry for PDF export.
    pub page_config: PageConfig,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Arc<dyn TextGenerator> = match &config.generation_api_key {
            Some(api_key) => Arc::new(
                GeminiClient::new(
                    config.generation_api_url.clone(),
                    api_key.clone(),
                    config.generation_timeout,
                    config.generation_max_attempts,
                )
                .context("Failed to build generation client")?,
            ),
            None => Arc::new(TemplateGenerator),
        };

        let scorer: Arc<dyn CandidateScorer> = match config.scorer {
            ScorerKind::Heuristic => Arc::new(HeuristicScorer::default()),
            ScorerKind::Random => Arc::new(RandomScorer::new(config.scorer_seed)),
        };

        let order = if config.shuffle_strategies {
            StrategyOrder::Shuffled {
                seed: config.strategy_seed,
            }
        } else {
            StrategyOrder::Declared
        };

        let generator = Generator::new(
            backend,
            GeneratorSettings {
                order,
                call_timeout: config.generation_timeout,
                max_output_tokens: config.generation_max_output_tokens,
            },
        );

        Ok(Self {
            refiner: Arc::new(Refiner::new(generator, scorer)),
            page_config: default_page_config(),
        })
    }
}
