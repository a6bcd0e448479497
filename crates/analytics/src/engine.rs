use crate::grade::{grade_score, letter_grade};
use crate::report::MetricsReport;
use crate::stats;
use crate::trades::{TradeStatistics, trade_returns};
use core_types::{LetterGrade, RawMetricsInput, SummaryMetrics};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// A stateless calculator for deriving performance metrics from a strategy run.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// Total over every input, including the empty one: missing data yields
    /// zeroed metrics and an `F`, never an error.
    ///
    /// When a `summary` is present its headline figures (total return, Sharpe,
    /// max drawdown) take precedence over what the series implies, since the
    /// summary was produced with knowledge the series does not carry
    /// (initial capital, fees, position sizing).
    pub fn calculate(&self, input: &RawMetricsInput) -> MetricsReport {
        let mut report = MetricsReport::new();
        if input.is_empty() {
            return report;
        }

        report.trades = TradeStatistics::from_trades(&input.trades);

        let derived;
        let returns: &[f64] = if input.returns.is_empty() {
            derived = trade_returns(&input.trades);
            report.returns_derived_from_trades = !derived.is_empty();
            &derived
        } else {
            &input.returns
        };

        self.calculate_series(returns, &mut report);
        if let Some(summary) = &input.summary {
            self.apply_summary(summary, &mut report);
        }
        self.calculate_ratios(&mut report);
        self.calculate_grade(input, &mut report);

        report
    }

    /// Return-series statistics: moments, tail measures and drawdown.
    fn calculate_series(&self, returns: &[f64], report: &mut MetricsReport) {
        report.periods = returns.len();
        report.total_return = stats::total_return(returns);
        report.volatility = stats::volatility(returns);
        report.sharpe_ratio = stats::sharpe(returns);
        report.sortino_ratio = stats::sortino(returns);
        report.max_drawdown = stats::max_drawdown_pct(returns);
        report.value_at_risk_95 = stats::value_at_risk_95(returns);
        report.expected_shortfall = stats::expected_shortfall(returns);
        report.tail_risk = stats::tail_risk(returns);
    }

    fn apply_summary(&self, summary: &SummaryMetrics, report: &mut MetricsReport) {
        report.total_return = summary.total_return;
        report.sharpe_ratio = summary.sharpe_ratio;
        report.max_drawdown = summary.max_drawdown.abs();

        // Without a ledger the summary is the only source of trade-level figures.
        if report.trades.total_trades == 0 {
            let trades = &mut report.trades;
            trades.total_trades = summary.total_trades;
            trades.win_rate = Decimal::from_f64(summary.win_rate).unwrap_or(Decimal::ZERO);
            trades.profit_factor = Decimal::from_f64(summary.profit_factor).unwrap_or(Decimal::ZERO);
        }
    }

    /// Ratios that depend on figures the summary may have overridden.
    fn calculate_ratios(&self, report: &mut MetricsReport) {
        report.annualized_return = stats::annualized_return(report.total_return, report.periods);
        report.calmar_ratio = stats::calmar(report.annualized_return, report.max_drawdown);
    }

    fn calculate_grade(&self, input: &RawMetricsInput, report: &mut MetricsReport) {
        let has_evidence = input.summary.is_some() || report.periods > 0 || report.trades.total_trades > 0;
        if !has_evidence {
            report.grade_score = 0.0;
            report.grade = LetterGrade::LOWEST;
            return;
        }
        report.grade_score = grade_score(report.total_return, report.sharpe_ratio, report.max_drawdown);
        report.grade = letter_grade(report.grade_score);
    }
}
