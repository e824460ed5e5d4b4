//! Evaluation and ranking of generated candidates.

use serde::Serialize;
use tracing::debug;

use crate::refine::generator::Candidate;
use crate::refine::scoring::{CandidateScorer, MetricVector};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub metrics: MetricVector,
    pub score: f64,
}

/// Candidates sorted by descending composite score, ties in input order.
pub type RankedResult = Vec<ScoredCandidate>;

/// Scores every candidate independently, preserving input order. Degraded
/// placeholders get the worst metric vector and so always rank last.
pub fn evaluate(
    candidates: &[Candidate],
    original_prompt: &str,
    scorer: &dyn CandidateScorer,
) -> Vec<ScoredCandidate> {
    candidates
        .iter()
        .map(|candidate| {
            let metrics = if candidate.degraded {
                MetricVector::WORST
            } else {
                scorer.score(&candidate.text, original_prompt)
            };
            ScoredCandidate {
                candidate: candidate.clone(),
                score: metrics.composite(),
                metrics,
            }
        })
        .collect()
}

/// Stable descending sort: equal scores never swap places.
pub fn rank(mut scored: Vec<ScoredCandidate>) -> RankedResult {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

pub fn evaluate_and_rank(
    candidates: &[Candidate],
    original_prompt: &str,
    scorer: &dyn CandidateScorer,
) -> RankedResult {
    let ranked = rank(evaluate(candidates, original_prompt, scorer));
    if let Some(top) = ranked.first() {
        debug!(
            scorer = scorer.name(),
            strategy = ?top.candidate.strategy,
            score = top.score,
            "Ranked candidates"
        );
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::strategy::RewriteStrategy;
    use std::collections::HashMap;

    /// Returns a preset metric vector per candidate text.
    struct FixedScorer(HashMap<String, MetricVector>);

    impl FixedScorer {
        /// Builds vectors whose composite equals `score`: costs 1−s, qualities s.
        fn with_scores(entries: &[(&str, f64)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(text, s)| (text.to_string(), MetricVector::new(1.0 - s, 1.0 - s, *s, *s)))
                    .collect(),
            )
        }
    }

    impl CandidateScorer for FixedScorer {
        fn score(&self, candidate: &str, _original_prompt: &str) -> MetricVector {
            self.0
                .get(candidate)
                .copied()
                .unwrap_or(MetricVector::new(1.0, 1.0, 0.0, 0.0))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn candidate(text: &str, strategy: RewriteStrategy) -> Candidate {
        Candidate::generated(strategy, text.to_string())
    }

    fn five_candidates() -> Vec<Candidate> {
        RewriteStrategy::ALL
            .iter()
            .zip(["A", "B", "C", "D", "E"])
            .map(|(s, t)| candidate(t, *s))
            .collect()
    }

    #[test]
    fn test_ranking_example_keeps_tied_entries_in_input_order() {
        let scorer = FixedScorer::with_scores(&[
            ("A", 0.81),
            ("B", 0.81),
            ("C", 0.40),
            ("D", 0.95),
            ("E", 0.10),
        ]);

        let ranked = evaluate_and_rank(&five_candidates(), "climate change", &scorer);

        let order: Vec<&str> = ranked.iter().map(|s| s.candidate.text.as_str()).collect();
        assert_eq!(order, vec!["D", "A", "B", "C", "E"]);
        assert!((ranked[0].score - 0.95).abs() < 1e-9);
        assert!((ranked[1].score - 0.81).abs() < 1e-9);
        assert_eq!(ranked[1].score, ranked[2].score);
    }

    #[test]
    fn test_all_equal_scores_preserve_input_order() {
        let scorer = FixedScorer::with_scores(&[
            ("A", 0.5),
            ("B", 0.5),
            ("C", 0.5),
            ("D", 0.5),
            ("E", 0.5),
        ]);

        let ranked = evaluate_and_rank(&five_candidates(), "p", &scorer);

        let strategies: Vec<_> = ranked.iter().map(|s| s.candidate.strategy).collect();
        assert_eq!(strategies, RewriteStrategy::ALL.to_vec());
    }

    #[test]
    fn test_evaluate_preserves_input_order_and_uses_composite() {
        let scorer = FixedScorer::with_scores(&[("A", 0.2), ("B", 0.9)]);
        let candidates = vec![
            candidate("A", RewriteStrategy::Paraphrase),
            candidate("B", RewriteStrategy::Recast),
        ];

        let scored = evaluate(&candidates, "p", &scorer);

        assert_eq!(scored[0].candidate.text, "A");
        assert_eq!(scored[0].score, scored[0].metrics.composite());
        assert_eq!(scored[1].candidate.text, "B");
    }

    #[test]
    fn test_rank_on_prebuilt_scores() {
        let make = |text: &str, score: f64| ScoredCandidate {
            candidate: candidate(text, RewriteStrategy::Convert),
            metrics: MetricVector::new(0.0, 0.0, 0.0, 0.0),
            score,
        };
        let ranked = rank(vec![make("low", 0.1), make("high", 0.9), make("mid", 0.5)]);
        let order: Vec<&str> = ranked.iter().map(|s| s.candidate.text.as_str()).collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let scorer = crate::refine::scoring::HeuristicScorer::default();
        let ranked = evaluate_and_rank(&five_candidates(), "climate change", &scorer);
        assert!(ranked.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    }

    #[test]
    fn test_degraded_candidates_rank_last_in_input_order() {
        let scorer = FixedScorer::with_scores(&[("A", 0.9), ("B", 0.3), ("C", 0.2), ("D", 0.1)]);
        let candidates = vec![
            Candidate {
                degraded: true,
                ..candidate("A", RewriteStrategy::Paraphrase)
            },
            candidate("B", RewriteStrategy::Recast),
            Candidate {
                degraded: true,
                ..candidate("C", RewriteStrategy::Reformulate)
            },
            candidate("D", RewriteStrategy::Convert),
        ];

        let ranked = evaluate_and_rank(&candidates, "p", &scorer);

        let order: Vec<&str> = ranked.iter().map(|s| s.candidate.text.as_str()).collect();
        assert_eq!(order, vec!["B", "D", "A", "C"]);
        assert_eq!(ranked[2].metrics, MetricVector::WORST);
        assert_eq!(ranked[2].score, 0.0);
        assert_eq!(ranked[3].score, 0.0);
    }

    #[test]
    fn test_empty_input_yields_empty_ranking() {
        let ranked = evaluate_and_rank(&[], "p", &FixedScorer::with_scores(&[]));
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_scored_candidate_serializes_flat() {
        let scored = ScoredCandidate {
            candidate: candidate("A", RewriteStrategy::Paraphrase),
            metrics: MetricVector::new(0.1, 0.2, 0.3, 0.4),
            score: 0.6,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["text"], "A");
        assert_eq!(json["strategy"], "paraphrase");
        assert_eq!(json["degraded"], false);
        assert_eq!(json["score"], 0.6);
        assert_eq!(json["metrics"]["token_cost"], 0.2);
    }
}
