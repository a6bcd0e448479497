use crate::confidence::ConfidenceScorer;
use crate::heuristics;
use crate::partial::PartialArtifact;
use analytics::{AnalyticsEngine, MetricsReport};
use chrono::Utc;
use core_types::{
    AnalysisArtifact, ArtifactMetadata, ArtifactSource, ConfidenceLevel, OverallAssessment,
    PerformanceAnalysis, RawMetricsInput, RiskAnalysis, RiskLevel, SectionKind, TradeAnalysis,
};

/// Builds a complete artifact from whatever a model supplied plus the metrics engine.
///
/// Pure apart from `metadata.generated_at`: the same input and partial
/// extraction always yield the same sections and the same confidence.
#[derive(Debug, Clone, Copy)]
pub struct FallbackSynthesizer {
    engine: AnalyticsEngine,
    scorer: ConfidenceScorer,
    min_sample_size: usize,
}

impl FallbackSynthesizer {
    pub fn new(min_sample_size: usize) -> Self {
        Self {
            engine: AnalyticsEngine::new(),
            scorer: ConfidenceScorer::new(min_sample_size),
            min_sample_size,
        }
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    /// Sections present in `partial` are used verbatim; every other section is
    /// computed from `input`.
    pub fn synthesize(&self, input: &RawMetricsInput, partial: Option<&PartialArtifact>) -> AnalysisArtifact {
        let report = self.engine.calculate(input);
        let empty = PartialArtifact::default();
        let partial = partial.unwrap_or(&empty);
        let ai_sections = partial.supplied_sections();

        let source = match ai_sections.len() {
            0 => ArtifactSource::Heuristic,
            n if n == SectionKind::ALL.len() => ArtifactSource::Ai,
            _ => ArtifactSource::Hybrid,
        };
        tracing::debug!(?source, ai_sections = ai_sections.len(), "Synthesizing analysis artifact.");

        let mut artifact = AnalysisArtifact {
            overall_assessment: partial
                .overall_assessment
                .clone()
                .unwrap_or_else(|| self.overall_assessment(input, &report)),
            performance_analysis: partial
                .performance_analysis
                .clone()
                .unwrap_or_else(|| self.performance_analysis(&report)),
            risk_analysis: partial
                .risk_analysis
                .clone()
                .unwrap_or_else(|| self.risk_analysis(&report)),
            trade_analysis: partial
                .trade_analysis
                .clone()
                .unwrap_or_else(|| self.trade_analysis(&report)),
            recommendations: partial.recommendations.clone().unwrap_or_else(|| {
                heuristics::recommendations(&report, input.sample_size(), self.min_sample_size)
            }),
            educational_insights: partial
                .educational_insights
                .clone()
                .unwrap_or_else(|| heuristics::educational_insights(&report)),
            confidence: 0.0,
            metadata: ArtifactMetadata {
                generated_at: Utc::now().timestamp_millis(),
                source,
                ai_sections,
                sample_size: input.sample_size(),
                confidence_level: ConfidenceLevel::Low,
                degraded: false,
            },
        };
        artifact.confidence = self.scorer.score(input, &artifact);
        artifact.metadata.confidence_level = ConfidenceLevel::from_score(artifact.confidence);
        artifact
    }

    fn overall_assessment(&self, input: &RawMetricsInput, report: &MetricsReport) -> OverallAssessment {
        let sample_size = input.sample_size();
        let (summary, weaknesses) = if input.is_empty() {
            (
                format!("Grade {} with no data to analyze.", report.grade),
                vec!["No trades, returns or summary were supplied, so there is nothing to evaluate".to_string()],
            )
        } else {
            (
                format!(
                    "Grade {} (score {:.2}) from {} observations, with a {:.2}% total return and a {:.2}% maximum drawdown.",
                    report.grade,
                    report.grade_score,
                    sample_size,
                    report.total_return * 100.0,
                    report.max_drawdown * 100.0
                ),
                heuristics::weaknesses(report, sample_size, self.min_sample_size),
            )
        };

        OverallAssessment {
            grade: report.grade,
            score: report.grade_score,
            summary,
            strengths: heuristics::strengths(report),
            weaknesses,
        }
    }

    fn performance_analysis(&self, report: &MetricsReport) -> PerformanceAnalysis {
        let basis = if report.returns_derived_from_trades {
            "per-trade returns"
        } else {
            "the return series"
        };
        PerformanceAnalysis {
            total_return: report.total_return,
            annualized_return: report.annualized_return,
            sharpe_ratio: report.sharpe_ratio,
            sortino_ratio: report.sortino_ratio,
            calmar_ratio: report.calmar_ratio,
            volatility: report.volatility,
            commentary: format!(
                "Computed from {} ({} periods): {:.2}% total, {:.2}% annualized, Sharpe {:.2}, Sortino {:.2}, Calmar {:.2}, annualized volatility {:.2}%.",
                basis,
                report.periods,
                report.total_return * 100.0,
                report.annualized_return * 100.0,
                report.sharpe_ratio,
                report.sortino_ratio,
                report.calmar_ratio,
                report.volatility * 100.0
            ),
        }
    }

    fn risk_analysis(&self, report: &MetricsReport) -> RiskAnalysis {
        let risk_level = heuristics::risk_level(report);
        RiskAnalysis {
            risk_level,
            max_drawdown: report.max_drawdown,
            value_at_risk_95: report.value_at_risk_95,
            expected_shortfall: report.expected_shortfall,
            tail_risk: report.tail_risk,
            commentary: format!(
                "Risk is {}: maximum drawdown {:.2}%, 95% VaR {:.2}%, expected shortfall {:.2}%.",
                risk_label(risk_level),
                report.max_drawdown * 100.0,
                report.value_at_risk_95 * 100.0,
                report.expected_shortfall * 100.0
            ),
        }
    }

    fn trade_analysis(&self, report: &MetricsReport) -> TradeAnalysis {
        let t = &report.trades;
        TradeAnalysis {
            total_trades: t.total_trades,
            win_rate: t.win_rate_f64(),
            profit_factor: t.profit_factor_f64(),
            expectancy: t.expectancy_f64(),
            max_consecutive_losses: t.max_consecutive_losses,
            behavioral_flags: heuristics::behavioral_flags(report),
            commentary: if t.total_trades == 0 {
                "No trades were supplied.".to_string()
            } else {
                format!(
                    "{} trades, {:.1}% winners, profit factor {:.2}, expectancy {:.2} per trade, longest losing streak {}.",
                    t.total_trades,
                    t.win_rate_f64() * 100.0,
                    t.profit_factor_f64(),
                    t.expectancy_f64(),
                    t.max_consecutive_losses
                )
            },
        }
    }
}

fn risk_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "low",
        RiskLevel::Moderate => "moderate",
        RiskLevel::High => "high",
        RiskLevel::Extreme => "extreme",
    }
}

impl Default for FallbackSynthesizer {
    fn default() -> Self {
        Self::new(30)
    }
}
