use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_API_URL;
use crate::refine::scoring::ScorerKind;

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values; every variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub generation_api_url: String,
    /// When unset, candidates come from the offline template backend.
    pub generation_api_key: Option<String>,
    pub generation_max_output_tokens: u32,
    pub generation_max_attempts: u32,
    pub generation_timeout: Duration,
    pub request_timeout: Duration,
    pub scorer: ScorerKind,
    pub scorer_seed: Option<u64>,
    pub shuffle_strategies: bool,
    pub strategy_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            generation_api_url: var("GENERATION_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            generation_api_key: var("GENERATION_API_KEY"),
            generation_max_output_tokens: parse_or(&var, "GENERATION_MAX_OUTPUT_TOKENS", 256)?,
            generation_max_attempts: parse_or(&var, "GENERATION_MAX_ATTEMPTS", 2)?,
            generation_timeout: Duration::from_secs(parse_or(&var, "GENERATION_TIMEOUT_SECS", 20)?),
            request_timeout: Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", 60)?),
            scorer: match var("SCORER") {
                Some(raw) => raw
                    .parse::<ScorerKind>()
                    .map_err(anyhow::Error::msg)
                    .context("SCORER must be 'heuristic' or 'random'")?,
                None => ScorerKind::Heuristic,
            },
            scorer_seed: parse_opt(&var, "SCORER_SEED")?,
            shuffle_strategies: parse_or(&var, "SHUFFLE_STRATEGIES", true)?,
            strategy_seed: parse_opt(&var, "STRATEGY_SEED")?,
        };

        // Generation must degrade before the HTTP layer gives up on the request.
        if config.generation_timeout >= config.request_timeout {
            bail!(
                "GENERATION_TIMEOUT_SECS ({}) must be lower than REQUEST_TIMEOUT_SECS ({})",
                config.generation_timeout.as_secs(),
                config.request_timeout.as_secs()
            );
        }

        Ok(config)
    }
}

fn parse_opt<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value: '{raw}'"))
        })
        .transpose()
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_opt(var, key)?.unwrap_or(default))
}
