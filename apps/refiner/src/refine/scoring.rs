//! Candidate scoring: pluggable metrics for a rewritten prompt.
//!
//! Default: `HeuristicScorer` (pure-Rust, deterministic, fully testable).
//! `RandomScorer` reproduces the uniform stand-in metrics, optionally seeded.
//!
//! `Refiner` holds an `Arc<dyn CandidateScorer>`, chosen at startup via config.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Word count at which the token cost saturates at 1.0.
const DEFAULT_TOKEN_BUDGET: usize = 64;

// ────────────────────────────────────────────────────────────────────────────
// Metric vector
// ────────────────────────────────────────────────────────────────────────────

/// Four per-candidate metrics, each in [0, 1].
///
/// The two costs are lower-is-better; the two quality scores are higher-is-better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricVector {
    pub faithfulness_cost: f64,
    pub token_cost: f64,
    pub lexical_overlap: f64,
    pub semantic_similarity: f64,
}

impl MetricVector {
    /// Maximal costs, zero quality. Composite is 0.
    pub const WORST: MetricVector = MetricVector {
        faithfulness_cost: 1.0,
        token_cost: 1.0,
        lexical_overlap: 0.0,
        semantic_similarity: 0.0,
    };

    /// Clamps every component into [0, 1]; NaN becomes 0.
    pub fn new(
        faithfulness_cost: f64,
        token_cost: f64,
        lexical_overlap: f64,
        semantic_similarity: f64,
    ) -> Self {
        Self {
            faithfulness_cost: unit(faithfulness_cost),
            token_cost: unit(token_cost),
            lexical_overlap: unit(lexical_overlap),
            semantic_similarity: unit(semantic_similarity),
        }
    }

    /// Unweighted mean of the four metrics after inverting the two costs.
    pub fn composite(&self) -> f64 {
        ((1.0 - self.faithfulness_cost)
            + (1.0 - self.token_cost)
            + self.lexical_overlap
            + self.semantic_similarity)
            / 4.0
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Scores one candidate against the prompt it was derived from.
pub trait CandidateScorer: Send + Sync {
    fn score(&self, candidate: &str, original_prompt: &str) -> MetricVector;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    Heuristic,
    Random,
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(ScorerKind::Heuristic),
            "random" => Ok(ScorerKind::Random),
            other => Err(format!("unknown scorer '{other}' (expected heuristic or random)")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicScorer (default)
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic text-statistics scorer.
///
/// - faithfulness_cost = 1 − share of distinct prompt words kept in the candidate
/// - token_cost = candidate word count / token budget, capped at 1
/// - lexical_overlap = ROUGE-1 F1 between candidate and prompt words
/// - semantic_similarity = Dice coefficient over character trigrams
pub struct HeuristicScorer {
    pub token_budget: usize,
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }
}

impl CandidateScorer for HeuristicScorer {
    fn score(&self, candidate: &str, original_prompt: &str) -> MetricVector {
        let candidate_words = words(candidate);
        let prompt_words = words(original_prompt);

        let token_cost = candidate_words.len() as f64 / self.token_budget.max(1) as f64;

        MetricVector::new(
            1.0 - prompt_recall(&candidate_words, &prompt_words),
            token_cost,
            rouge1_f1(&candidate_words, &prompt_words),
            trigram_dice(candidate, original_prompt),
        )
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Share of distinct prompt words that also appear in the candidate.
fn prompt_recall(candidate: &[String], prompt: &[String]) -> f64 {
    let prompt_set: HashSet<&str> = prompt.iter().map(String::as_str).collect();
    if prompt_set.is_empty() {
        return 1.0;
    }
    let candidate_set: HashSet<&str> = candidate.iter().map(String::as_str).collect();
    let kept = prompt_set.intersection(&candidate_set).count();
    kept as f64 / prompt_set.len() as f64
}

fn counts(words: &[String]) -> HashMap<&str, usize> {
    let mut map = HashMap::new();
    for w in words {
        *map.entry(w.as_str()).or_insert(0) += 1;
    }
    map
}

fn rouge1_f1(candidate: &[String], prompt: &[String]) -> f64 {
    if candidate.is_empty() || prompt.is_empty() {
        return 0.0;
    }
    let candidate_counts = counts(candidate);
    let prompt_counts = counts(prompt);
    let overlap: usize = candidate_counts
        .iter()
        .map(|(w, n)| (*n).min(prompt_counts.get(w).copied().unwrap_or(0)))
        .sum();
    if overlap == 0 {
        return 0.0;
    }
    let precision = overlap as f64 / candidate.len() as f64;
    let recall = overlap as f64 / prompt.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

fn trigrams(text: &str) -> HashSet<String> {
    let normalized: Vec<char> = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .collect();
    if normalized.is_empty() {
        return HashSet::new();
    }
    if normalized.len() < 3 {
        return HashSet::from([normalized.iter().collect()]);
    }
    normalized.windows(3).map(|w| w.iter().collect()).collect()
}

fn trigram_dice(a: &str, b: &str) -> f64 {
    let a = trigrams(a);
    let b = trigrams(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    2.0 * a.intersection(&b).count() as f64 / (a.len() + b.len()) as f64
}

// ────────────────────────────────────────────────────────────────────────────
// RandomScorer: uniform stand-in metrics
// ────────────────────────────────────────────────────────────────────────────

/// Draws each metric uniformly from [0, 1]. With a seed, the draw sequence is
/// reproducible across a process lifetime.
pub struct RandomScorer {
    seeded: Option<Mutex<StdRng>>,
}

impl RandomScorer {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seeded: seed.map(|s| Mutex::new(StdRng::seed_from_u64(s))),
        }
    }

    fn draw(rng: &mut impl Rng) -> MetricVector {
        MetricVector::new(
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
        )
    }
}

impl CandidateScorer for RandomScorer {
    fn score(&self, _candidate: &str, _original_prompt: &str) -> MetricVector {
        match &self.seeded {
            Some(rng) => {
                let mut rng = match rng.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                Self::draw(&mut *rng)
            }
            None => Self::draw(&mut rand::thread_rng()),
        }
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_composite_matches_formula() {
        let m = MetricVector::new(0.2, 0.4, 0.7, 0.9);
        // (0.8 + 0.6 + 0.7 + 0.9) / 4 = 0.75
        assert!(approx(m.composite(), 0.75), "got {}", m.composite());
    }

    #[test]
    fn test_composite_extremes() {
        assert!(approx(MetricVector::new(0.0, 0.0, 1.0, 1.0).composite(), 1.0));
        assert!(approx(MetricVector::new(1.0, 1.0, 0.0, 0.0).composite(), 0.0));
    }

    #[test]
    fn test_metric_vector_clamps_out_of_range_and_nan() {
        let m = MetricVector::new(-0.5, 1.5, f64::NAN, 0.3);
        assert_eq!(m.faithfulness_cost, 0.0);
        assert_eq!(m.token_cost, 1.0);
        assert_eq!(m.lexical_overlap, 0.0);
        assert_eq!(m.semantic_similarity, 0.3);
        let score = m.composite();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_heuristic_is_deterministic() {
        let scorer = HeuristicScorer::default();
        let a = scorer.score("How is climate change reshaping coastlines?", "climate change");
        let b = scorer.score("How is climate change reshaping coastlines?", "climate change");
        assert_eq!(a, b);
    }

    #[test]
    fn test_heuristic_rewards_keeping_prompt_words() {
        let scorer = HeuristicScorer::default();
        let keeps = scorer.score("What drives climate change today?", "climate change");
        let drops = scorer.score("What drives global warming today?", "climate change");
        assert!(keeps.faithfulness_cost < drops.faithfulness_cost);
        assert!(keeps.lexical_overlap > drops.lexical_overlap);
        assert!(keeps.composite() > drops.composite());
    }

    #[test]
    fn test_heuristic_identical_text_is_perfect_overlap() {
        let m = HeuristicScorer::default().score("climate change", "climate change");
        assert_eq!(m.faithfulness_cost, 0.0);
        assert!(approx(m.lexical_overlap, 1.0));
        assert!(approx(m.semantic_similarity, 1.0));
    }

    #[test]
    fn test_token_cost_saturates_at_budget() {
        let scorer = HeuristicScorer { token_budget: 4 };
        let m = scorer.score("one two three four five six", "one");
        assert_eq!(m.token_cost, 1.0);
        let m = scorer.score("one two", "one");
        assert!(approx(m.token_cost, 0.5));
    }

    #[test]
    fn test_heuristic_handles_empty_candidate() {
        let m = HeuristicScorer::default().score("", "climate change");
        assert_eq!(m.faithfulness_cost, 1.0);
        assert_eq!(m.token_cost, 0.0);
        assert_eq!(m.lexical_overlap, 0.0);
        assert_eq!(m.semantic_similarity, 0.0);
    }

    #[test]
    fn test_rouge1_counts_clipped_overlap() {
        let candidate = words("the the the cat");
        let prompt = words("the cat sat");
        // overlap = min(3,1) + min(1,1) = 2; p = 2/4, r = 2/3 → f1 = 4/7
        assert!(approx(rouge1_f1(&candidate, &prompt), 4.0 / 7.0));
    }

    #[test]
    fn test_random_scorer_stays_in_unit_interval() {
        let scorer = RandomScorer::new(None);
        for _ in 0..200 {
            let m = scorer.score("a", "b");
            for v in [
                m.faithfulness_cost,
                m.token_cost,
                m.lexical_overlap,
                m.semantic_similarity,
                m.composite(),
            ] {
                assert!((0.0..=1.0).contains(&v), "out of range: {v}");
            }
        }
    }

    #[test]
    fn test_seeded_random_scorer_replays() {
        let a = RandomScorer::new(Some(11));
        let b = RandomScorer::new(Some(11));
        for _ in 0..5 {
            assert_eq!(a.score("x", "y"), b.score("x", "y"));
        }
    }

    #[test]
    fn test_scorer_kind_parses_case_insensitively() {
        assert_eq!("Heuristic".parse::<ScorerKind>(), Ok(ScorerKind::Heuristic));
        assert_eq!(" random ".parse::<ScorerKind>(), Ok(ScorerKind::Random));
        assert!("bert".parse::<ScorerKind>().is_err());
    }

    #[test]
    fn test_scorer_names() {
        assert_eq!(HeuristicScorer::default().name(), "heuristic");
        assert_eq!(RandomScorer::new(None).name(), "random");
    }
}
