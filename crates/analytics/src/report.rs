use crate::trades::TradeStatistics;
use core_types::LetterGrade;
use serde::{Deserialize, Serialize};

/// Everything the metrics engine knows about one strategy run.
///
/// This struct is the final output of the `AnalyticsEngine` and the only
/// numeric input the fallback synthesizer works from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    // I. Return Series
    pub periods: usize,
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub returns_derived_from_trades: bool, // no series was supplied, per-trade returns stand in

    // II. Risk
    pub max_drawdown: f64, // fraction of peak equity
    pub value_at_risk_95: f64,
    pub expected_shortfall: f64,
    pub tail_risk: f64,

    // III. Trade-Level Statistics
    pub trades: TradeStatistics,

    // IV. Grade
    pub grade_score: f64,
    pub grade: LetterGrade,
}

impl MetricsReport {
    /// Creates a zeroed-out report graded at the lowest band.
    pub fn new() -> Self {
        Self {
            periods: 0,
            total_return: 0.0,
            annualized_return: 0.0,
            volatility: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            calmar_ratio: 0.0,
            returns_derived_from_trades: false,
            max_drawdown: 0.0,
            value_at_risk_95: 0.0,
            expected_shortfall: 0.0,
            tail_risk: 0.0,
            trades: TradeStatistics::new(),
            grade_score: 0.0,
            grade: LetterGrade::LOWEST,
        }
    }

}

impl Default for MetricsReport {
    fn default() -> Self {
        Self::new()
    }
}
