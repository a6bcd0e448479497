//! Fixed-threshold rules that turn a `MetricsReport` into plain-language findings.

use analytics::MetricsReport;
use core_types::{EducationalInsight, Recommendation, RecommendationPriority, RiskLevel};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

pub const GOOD_SHARPE: f64 = 1.0;
pub const WEAK_SHARPE: f64 = 0.5;
pub const GOOD_SORTINO: f64 = 1.5;
pub const GOOD_WIN_RATE: f64 = 0.55;
pub const LOW_WIN_RATE: f64 = 0.40;
pub const GOOD_PROFIT_FACTOR: f64 = 1.5;
pub const SHALLOW_DRAWDOWN: f64 = 0.10;
pub const DEEP_DRAWDOWN: f64 = 0.20;
pub const LOSING_STREAK: usize = 5;
pub const CONCENTRATION_SHARE: f64 = 0.70;
pub const CONCENTRATION_MIN_TRADES: usize = 5;

fn pct(fraction: f64) -> f64 {
    fraction * 100.0
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn has_trades(report: &MetricsReport) -> bool {
    report.trades.total_trades > 0
}

fn has_series(report: &MetricsReport) -> bool {
    report.periods > 0
}

fn is_concentrated(report: &MetricsReport) -> bool {
    report.trades.total_trades >= CONCENTRATION_MIN_TRADES
        && report.trades.distinct_symbols > 0
        && to_f64(report.trades.top_symbol_share) > CONCENTRATION_SHARE
}

fn losers_outsize_winners(report: &MetricsReport) -> bool {
    let t = &report.trades;
    t.average_win > Decimal::ZERO && t.average_loss > t.average_win.saturating_mul(Decimal::from(2))
}

pub fn strengths(report: &MetricsReport) -> Vec<String> {
    let mut out = Vec::new();
    if report.sharpe_ratio > GOOD_SHARPE {
        out.push(format!("Good risk-adjusted returns (Sharpe {:.2})", report.sharpe_ratio));
    }
    if report.sortino_ratio > GOOD_SORTINO {
        out.push(format!(
            "Downside volatility is well contained (Sortino {:.2})",
            report.sortino_ratio
        ));
    }
    if report.total_return > 0.0 {
        out.push(format!("Positive total return of {:.2}%", pct(report.total_return)));
    }
    if has_trades(report) && report.trades.win_rate_f64() >= GOOD_WIN_RATE {
        out.push(format!(
            "Consistent hit rate: {:.1}% of trades are profitable",
            pct(report.trades.win_rate_f64())
        ));
    }
    if has_trades(report) && report.trades.profit_factor_f64() >= GOOD_PROFIT_FACTOR {
        out.push(format!(
            "Winners outweigh losers (profit factor {:.2})",
            report.trades.profit_factor_f64()
        ));
    }
    if (has_series(report) || has_trades(report)) && report.max_drawdown < SHALLOW_DRAWDOWN {
        out.push(format!("Shallow drawdowns (max {:.2}%)", pct(report.max_drawdown)));
    }
    out
}

pub fn weaknesses(report: &MetricsReport, sample_size: usize, min_sample_size: usize) -> Vec<String> {
    let mut out = Vec::new();
    if report.sharpe_ratio < WEAK_SHARPE {
        out.push(format!("Weak risk-adjusted returns (Sharpe {:.2})", report.sharpe_ratio));
    }
    if report.total_return < 0.0 {
        out.push(format!("Negative total return of {:.2}%", pct(report.total_return)));
    }
    if report.max_drawdown > DEEP_DRAWDOWN {
        out.push(format!("Deep drawdown of {:.2}% from peak", pct(report.max_drawdown)));
    }
    if has_trades(report) && report.trades.win_rate_f64() < LOW_WIN_RATE {
        out.push(format!(
            "Low win rate of {:.1}%",
            pct(report.trades.win_rate_f64())
        ));
    }
    if has_trades(report) && report.trades.profit_factor_f64() < 1.0 {
        out.push(format!(
            "Losing trades outweigh winners (profit factor {:.2})",
            report.trades.profit_factor_f64()
        ));
    }
    if sample_size < min_sample_size {
        out.push(format!(
            "Small sample of {sample_size} observations; results may not be statistically meaningful"
        ));
    }
    out
}

pub fn risk_level(report: &MetricsReport) -> RiskLevel {
    let dd = report.max_drawdown;
    let vol = report.volatility;
    if dd > 0.40 || vol > 0.60 {
        RiskLevel::Extreme
    } else if dd > DEEP_DRAWDOWN || vol > 0.35 {
        RiskLevel::High
    } else if dd > SHALLOW_DRAWDOWN || vol > 0.20 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

pub fn behavioral_flags(report: &MetricsReport) -> Vec<String> {
    let t = &report.trades;
    let mut out = Vec::new();
    if t.max_consecutive_losses >= LOSING_STREAK {
        out.push(format!(
            "Losing streak of {} trades in a row; watch for revenge trading",
            t.max_consecutive_losses
        ));
    }
    if is_concentrated(report) {
        out.push(format!(
            "{:.0}% of trades are in {}; the result depends on a single instrument",
            pct(to_f64(t.top_symbol_share)),
            t.top_symbol.as_deref().unwrap_or("one symbol")
        ));
    }
    if losers_outsize_winners(report) {
        out.push("Average loss is more than twice the average win; losers are held too long".to_string());
    }
    if t.profit_factor_capped {
        out.push("No losing trades recorded; the profit factor is capped and likely optimistic".to_string());
    }
    out
}

pub fn recommendations(
    report: &MetricsReport,
    sample_size: usize,
    min_sample_size: usize,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if report.max_drawdown > DEEP_DRAWDOWN {
        out.push(recommendation(
            RecommendationPriority::High,
            "Reduce position size",
            format!(
                "A {:.2}% drawdown is hard to recover from. Risk a smaller fraction of equity per trade.",
                pct(report.max_drawdown)
            ),
        ));
    }
    if sample_size > 0 && report.sharpe_ratio < WEAK_SHARPE {
        out.push(recommendation(
            RecommendationPriority::High,
            "Improve risk-adjusted returns",
            "Returns are small relative to their volatility. Filter out low-conviction setups.".to_string(),
        ));
    }
    if has_trades(report) && report.trades.win_rate_f64() < LOW_WIN_RATE
        && report.trades.profit_factor_f64() < GOOD_PROFIT_FACTOR
    {
        out.push(recommendation(
            RecommendationPriority::Medium,
            "Revisit entry criteria",
            "Too few trades work out and the winners do not make up for it.".to_string(),
        ));
    }
    if losers_outsize_winners(report) {
        out.push(recommendation(
            RecommendationPriority::Medium,
            "Tighten stop losses",
            "Cap the loss per trade so that one loser cannot erase several winners.".to_string(),
        ));
    }
    if sample_size < min_sample_size {
        out.push(recommendation(
            RecommendationPriority::Medium,
            "Collect more data",
            format!("At least {min_sample_size} observations are needed before drawing firm conclusions."),
        ));
    }
    if is_concentrated(report) {
        out.push(recommendation(
            RecommendationPriority::Low,
            "Diversify instruments",
            "Test the strategy on other symbols to make sure the edge is not specific to one market.".to_string(),
        ));
    }
    if out.is_empty() {
        out.push(recommendation(
            RecommendationPriority::Low,
            "Keep the current discipline",
            "No rule flagged a problem. Keep tracking the same metrics as the sample grows.".to_string(),
        ));
    }
    out
}

fn recommendation(priority: RecommendationPriority, title: &str, description: String) -> Recommendation {
    Recommendation { title: title.to_string(), description, priority }
}

pub fn educational_insights(report: &MetricsReport) -> Vec<EducationalInsight> {
    let insight = |concept: &str, explanation: String| EducationalInsight {
        concept: concept.to_string(),
        explanation,
    };

    let mut out = vec![
        insight(
            "Sharpe ratio",
            format!(
                "Average return divided by its volatility. Yours is {:.2}; above 1.0 is generally considered good.",
                report.sharpe_ratio
            ),
        ),
        insight(
            "Maximum drawdown",
            format!(
                "The largest fall from a peak. A {:.2}% drawdown needs a {:.2}% gain to recover.",
                pct(report.max_drawdown),
                pct(recovery_gain(report.max_drawdown))
            ),
        ),
    ];
    if has_series(report) {
        out.push(insight(
            "Value at Risk",
            format!(
                "On 95% of periods the return was better than {:.2}%. Expected shortfall, the average of the worse days, is {:.2}%.",
                pct(report.value_at_risk_95),
                pct(report.expected_shortfall)
            ),
        ));
    }
    if has_trades(report) {
        out.push(insight(
            "Expectancy",
            format!(
                "The average profit or loss per trade, {:.2}. A positive expectancy is what makes a strategy worth repeating.",
                report.trades.expectancy_f64()
            ),
        ));
        out.push(insight(
            "Profit factor",
            format!(
                "Gross profit divided by gross loss, {:.2} here. Below 1.0 the strategy loses money overall.",
                report.trades.profit_factor_f64()
            ),
        ));
    }
    out
}

/// Gain needed to get back to the peak after losing `drawdown` of it.
fn recovery_gain(drawdown: f64) -> f64 {
    if drawdown <= 0.0 || drawdown >= 1.0 {
        return 0.0;
    }
    drawdown / (1.0 - drawdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(sharpe: f64, max_drawdown: f64, volatility: f64) -> MetricsReport {
        MetricsReport {
            periods: 50,
            sharpe_ratio: sharpe,
            max_drawdown,
            volatility,
            ..MetricsReport::new()
        }
    }

    #[test]
    fn sharpe_above_one_is_a_strength() {
        let report = report_with(1.4, 0.05, 0.1);
        let found = strengths(&report);
        assert!(found.iter().any(|s| s.starts_with("Good risk-adjusted returns")));
        assert!(found.iter().any(|s| s.starts_with("Shallow drawdowns")));
    }

    #[test]
    fn risk_levels_follow_drawdown_and_volatility() {
        assert_eq!(risk_level(&report_with(1.0, 0.05, 0.1)), RiskLevel::Low);
        assert_eq!(risk_level(&report_with(1.0, 0.15, 0.1)), RiskLevel::Moderate);
        assert_eq!(risk_level(&report_with(1.0, 0.05, 0.4)), RiskLevel::High);
        assert_eq!(risk_level(&report_with(1.0, 0.5, 0.1)), RiskLevel::Extreme);
    }

    #[test]
    fn recommendations_are_never_empty() {
        let clean = report_with(2.0, 0.02, 0.1);
        let recs = recommendations(&clean, 100, 30);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, RecommendationPriority::Low);
    }

    #[test]
    fn deep_drawdown_gets_a_high_priority_recommendation() {
        let recs = recommendations(&report_with(0.2, 0.35, 0.3), 10, 30);
        assert_eq!(recs[0].title, "Reduce position size");
        assert_eq!(recs[0].priority, RecommendationPriority::High);
        assert!(recs.iter().any(|r| r.title == "Collect more data"));
    }

    #[test]
    fn recovery_gain_is_asymmetric() {
        assert!((recovery_gain(0.5) - 1.0).abs() < 1e-12);
        assert_eq!(recovery_gain(0.0), 0.0);
    }
}
