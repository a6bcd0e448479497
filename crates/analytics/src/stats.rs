//! Pure statistics over periodic return series.
//!
//! Every function here is total: empty or degenerate input yields `0.0`
//! instead of `NaN`, infinity or a panic.

/// Trading periods per year used to annualize daily figures.
pub const TRADING_PERIODS_PER_YEAR: f64 = 252.0;

/// Confidence level of the historical value-at-risk.
pub const VAR_CONFIDENCE: f64 = 0.95;

/// Share of the sorted return distribution that counts as the tail.
pub const TAIL_FRACTION: f64 = 0.10;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Compounded return of the whole series.
pub fn total_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// `(1 + total_return)^(252 / periods) - 1`.
pub fn annualized_return(total_return: f64, periods: usize) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if total_return <= -1.0 {
        return -1.0;
    }
    (1.0 + total_return).powf(TRADING_PERIODS_PER_YEAR / periods as f64) - 1.0
}

pub fn volatility(returns: &[f64]) -> f64 {
    sample_std_dev(returns) * TRADING_PERIODS_PER_YEAR.sqrt()
}

/// Per-period Sharpe ratio with a zero risk-free rate.
pub fn sharpe(returns: &[f64]) -> f64 {
    let sd = sample_std_dev(returns);
    if sd == 0.0 {
        return 0.0;
    }
    mean(returns) / sd
}

/// Mean return over the deviation of the losing periods only.
pub fn sortino(returns: &[f64]) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_sd = sample_std_dev(&downside);
    if downside_sd == 0.0 {
        return 0.0;
    }
    mean(returns) / downside_sd
}

pub fn calmar(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown == 0.0 {
        return 0.0;
    }
    annualized_return / max_drawdown.abs()
}

/// Largest decline of the compounded equity curve, as a fraction of its peak.
pub fn max_drawdown_pct(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;

    for r in returns {
        equity *= 1.0 + r;
        peak = peak.max(equity);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - equity) / peak);
        }
    }
    max_dd
}

fn sorted(returns: &[f64]) -> Vec<f64> {
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Historical 95% value-at-risk: the 5th percentile return.
pub fn value_at_risk_95(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sorted = sorted(returns);
    let index = ((1.0 - VAR_CONFIDENCE) * sorted.len() as f64).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

/// Mean of the returns at or below the 95% value-at-risk.
pub fn expected_shortfall(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let var = value_at_risk_95(returns);
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    mean(&tail)
}

/// Dispersion of the worst decile around the mean of the whole series.
pub fn tail_risk(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let overall_mean = mean(returns);
    let sorted = sorted(returns);
    let count = ((sorted.len() as f64 * TAIL_FRACTION).floor() as usize).max(1);
    let tail = &sorted[..count];
    tail.iter()
        .map(|r| (r - overall_mean) * (r - overall_mean))
        .sum::<f64>()
        / tail.len() as f64
}
