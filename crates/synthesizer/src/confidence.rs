use core_types::{AnalysisArtifact, RawMetricsInput};

const HEURISTIC_BASE: f64 = 0.7;
const AI_BASE: f64 = 0.8;
const SAMPLE_SIZE_BONUS: f64 = 0.05;
const RECOMMENDATIONS_BONUS: f64 = 0.05;
const DATA_SOURCE_BONUS: f64 = 0.03;
const INSIGHTS_BONUS: f64 = 0.02;

/// Heuristic trust score for an artifact.
///
/// Starts from a fixed base and only ever adds, so every extra corroborating
/// signal keeps the score the same or raises it. The result is clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    min_sample_size: usize,
}

impl ConfidenceScorer {
    pub fn new(min_sample_size: usize) -> Self {
        Self { min_sample_size }
    }

    pub fn score(&self, input: &RawMetricsInput, artifact: &AnalysisArtifact) -> f64 {
        let mut score = if artifact.is_ai_derived() { AI_BASE } else { HEURISTIC_BASE };

        if input.sample_size() >= self.min_sample_size && input.sample_size() > 0 {
            score += SAMPLE_SIZE_BONUS;
        }
        if !artifact.recommendations.is_empty() {
            score += RECOMMENDATIONS_BONUS;
        }
        if !input.trades.is_empty() {
            score += DATA_SOURCE_BONUS;
        }
        if !input.returns.is_empty() {
            score += DATA_SOURCE_BONUS;
        }
        if input.summary.is_some() {
            score += DATA_SOURCE_BONUS;
        }
        if !artifact.educational_insights.is_empty() {
            score += INSIGHTS_BONUS;
        }

        score.clamp(0.0, 1.0)
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(30)
    }
}
