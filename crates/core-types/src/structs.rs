use crate::enums::TradeSide;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single fill reported by an external backtest or a live account.
///
/// `pnl` is only present on fills that close (part of) a position; opening
/// fills leave it empty and are treated as break-even by the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<Decimal>,
}

impl TradeRecord {
    /// Realized P&L of the fill, zero when the fill did not close anything.
    pub fn realized_pnl(&self) -> Decimal {
        self.pnl.unwrap_or(Decimal::ZERO)
    }

    pub fn notional(&self) -> Decimal {
        self.quantity.saturating_mul(self.price)
    }

    fn validate(&self, index: usize) -> Result<(), CoreError> {
        let field = |name: &str| format!("trades[{index}].{name}");

        if self.symbol.trim().is_empty() {
            return Err(CoreError::InvalidInput(field("symbol"), "symbol must not be empty".to_string()));
        }
        if self.price <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                field("price"),
                format!("price must be positive, got {}", self.price),
            ));
        }
        if self.quantity.is_sign_negative() {
            return Err(CoreError::InvalidInput(
                field("quantity"),
                format!("quantity must not be negative, got {}", self.quantity),
            ));
        }
        if let Some(fees) = self.fees {
            if fees.is_sign_negative() && !fees.is_zero() {
                return Err(CoreError::InvalidInput(
                    field("fees"),
                    format!("fees must not be negative, got {fees}"),
                ));
            }
        }
        Ok(())
    }
}

/// A backtest summary computed by someone else. Ratios are fractions
/// (`0.12` is a 12% return, `0.55` a 55% win rate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_trades: usize,
}

impl SummaryMetrics {
    fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("summary.totalReturn", self.total_return),
            ("summary.sharpeRatio", self.sharpe_ratio),
            ("summary.maxDrawdown", self.max_drawdown),
            ("summary.winRate", self.win_rate),
            ("summary.profitFactor", self.profit_factor),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(CoreError::InvalidInput(
                    name.to_string(),
                    format!("value must be finite, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Everything the caller knows numerically about a strategy run.
///
/// Any of the three parts may be missing; the metrics engine is total over
/// all combinations, including the fully empty input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetricsInput {
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
    #[serde(default)]
    pub returns: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryMetrics>,
}

impl RawMetricsInput {
    pub fn new(trades: Vec<TradeRecord>, returns: Vec<f64>, summary: Option<SummaryMetrics>) -> Self {
        Self { trades, returns, summary }
    }

    pub fn from_trades(trades: Vec<TradeRecord>) -> Self {
        Self { trades, ..Self::default() }
    }

    pub fn from_returns(returns: Vec<f64>) -> Self {
        Self { returns, ..Self::default() }
    }

    /// True when there is no evidence at all to analyze.
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty() && self.returns.is_empty() && self.summary.is_none()
    }

    /// The number of independent observations backing the analysis.
    pub fn sample_size(&self) -> usize {
        let summary_trades = self.summary.as_ref().map(|s| s.total_trades).unwrap_or(0);
        self.trades.len().max(self.returns.len()).max(summary_trades)
    }

    /// Rejects input the metrics engine would silently turn into garbage.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (index, trade) in self.trades.iter().enumerate() {
            trade.validate(index)?;
        }
        if let Some(index) = self.returns.iter().position(|r| !r.is_finite()) {
            return Err(CoreError::InvalidInput(
                format!("returns[{index}]"),
                "return observations must be finite".to_string(),
            ));
        }
        if let Some(summary) = &self.summary {
            summary.validate()?;
        }
        Ok(())
    }
}
