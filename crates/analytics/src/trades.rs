use core_types::{TradeRecord, TradeSide};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Profit factor reported when there are wins but no losses at all.
pub const PROFIT_FACTOR_CAP: Decimal = dec!(100);

/// Trade-level and behavioral statistics, computed in exact decimal arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStatistics {
    // I. Profitability
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: Decimal, // fraction of all trades
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub net_profit: Decimal,
    pub profit_factor: Decimal,
    pub profit_factor_capped: bool, // true when losses were zero and the cap was applied
    pub expectancy: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub total_fees: Decimal,

    // II. Drawdown of the cumulative P&L
    pub max_drawdown: Decimal,

    // III. Behavior
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub distinct_symbols: usize,
    pub top_symbol: Option<String>,
    pub top_symbol_share: Decimal,
}

impl TradeStatistics {
    /// Creates a zeroed-out set of statistics, which is also the result for no trades.
    pub fn new() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
            profit_factor_capped: false,
            expectancy: Decimal::ZERO,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            largest_win: Decimal::ZERO,
            largest_loss: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            buy_count: 0,
            sell_count: 0,
            distinct_symbols: 0,
            top_symbol: None,
            top_symbol_share: Decimal::ZERO,
        }
    }

    /// Computes every statistic in one pass over the trades, in order.
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let mut stats = Self::new();
        if trades.is_empty() {
            return stats;
        }

        stats.calculate_profitability(trades);
        stats.calculate_drawdown(trades);
        stats.calculate_behavior(trades);
        stats
    }

    pub fn win_rate_f64(&self) -> f64 {
        self.win_rate.to_f64().unwrap_or(0.0)
    }

    pub fn profit_factor_f64(&self) -> f64 {
        self.profit_factor.to_f64().unwrap_or(0.0)
    }

    pub fn expectancy_f64(&self) -> f64 {
        self.expectancy.to_f64().unwrap_or(0.0)
    }

    fn calculate_profitability(&mut self, trades: &[TradeRecord]) {
        self.total_trades = trades.len();

        for trade in trades {
            let pnl = trade.realized_pnl();
            self.net_profit = self.net_profit.saturating_add(pnl);
            self.total_fees = self.total_fees.saturating_add(trade.fees.unwrap_or(Decimal::ZERO));

            if pnl > Decimal::ZERO {
                self.gross_profit = self.gross_profit.saturating_add(pnl);
                self.winning_trades += 1;
                self.largest_win = self.largest_win.max(pnl);
            } else if pnl < Decimal::ZERO {
                self.gross_loss = self.gross_loss.saturating_add(pnl.abs());
                self.losing_trades += 1;
                self.largest_loss = self.largest_loss.max(pnl.abs());
            }
        }

        let total = Decimal::from(self.total_trades);
        self.win_rate = Decimal::from(self.winning_trades) / total;
        self.expectancy = self.net_profit / total;

        // --- Profit factor ---
        // Sums saturate at `Decimal::MAX`; a ratio that does not fit is capped like the no-loss case.
        let ratio = if self.gross_loss > Decimal::ZERO {
            self.gross_profit.checked_div(self.gross_loss)
        } else {
            None
        };
        if let Some(ratio) = ratio {
            self.profit_factor = ratio;
        } else if self.gross_profit > Decimal::ZERO {
            self.profit_factor = PROFIT_FACTOR_CAP;
            self.profit_factor_capped = true;
        }

        if self.winning_trades > 0 {
            self.average_win = self.gross_profit / Decimal::from(self.winning_trades);
        }
        if self.losing_trades > 0 {
            self.average_loss = self.gross_loss / Decimal::from(self.losing_trades);
        }
    }

    fn calculate_drawdown(&mut self, trades: &[TradeRecord]) {
        let mut cumulative = Decimal::ZERO;
        let mut peak = Decimal::ZERO;
        let mut max_drawdown = Decimal::ZERO;

        for trade in trades {
            cumulative = cumulative.saturating_add(trade.realized_pnl());
            if cumulative > peak {
                peak = cumulative;
            }
            let drawdown = peak.saturating_sub(cumulative);
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }

        self.max_drawdown = max_drawdown;
    }

    fn calculate_behavior(&mut self, trades: &[TradeRecord]) {
        let mut wins_in_row = 0;
        let mut losses_in_row = 0;
        let mut per_symbol: BTreeMap<&str, usize> = BTreeMap::new();

        for trade in trades {
            match trade.side {
                TradeSide::Buy => self.buy_count += 1,
                TradeSide::Sell => self.sell_count += 1,
            }
            *per_symbol.entry(trade.symbol.as_str()).or_insert(0) += 1;

            let pnl = trade.realized_pnl();
            if pnl > Decimal::ZERO {
                wins_in_row += 1;
                losses_in_row = 0;
            } else if pnl < Decimal::ZERO {
                losses_in_row += 1;
                wins_in_row = 0;
            }
            self.max_consecutive_wins = self.max_consecutive_wins.max(wins_in_row);
            self.max_consecutive_losses = self.max_consecutive_losses.max(losses_in_row);
        }

        self.distinct_symbols = per_symbol.len();
        // BTreeMap iteration keeps ties deterministic (alphabetically first wins).
        if let Some((symbol, count)) = per_symbol
            .iter()
            .fold(None::<(&str, usize)>, |best, (s, c)| match best {
                Some((_, bc)) if bc >= *c => best,
                _ => Some((*s, *c)),
            })
        {
            self.top_symbol = Some(symbol.to_string());
            self.top_symbol_share = Decimal::from(count) / Decimal::from(self.total_trades);
        }
    }
}

impl Default for TradeStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-trade returns (`pnl / notional`) of the fills that realized something.
///
/// Used as a stand-in return series when the caller supplied trades only.
pub fn trade_returns(trades: &[TradeRecord]) -> Vec<f64> {
    trades
        .iter()
        .filter_map(|t| {
            let pnl = t.pnl?;
            let notional = t.quantity.checked_mul(t.price)?;
            if notional <= Decimal::ZERO {
                return None;
            }
            // A ratio too large for `Decimal` says nothing useful about the strategy.
            pnl.checked_div(notional)?.to_f64()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn trade(symbol: &str, side: TradeSide, pnl: Option<Decimal>) -> TradeRecord {
        TradeRecord {
            symbol: symbol.to_string(),
            side,
            quantity: dec!(2),
            price: dec!(50),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap(),
            pnl,
            fees: Some(dec!(0.5)),
        }
    }

    #[test]
    fn no_trades_is_all_zero() {
        let stats = TradeStatistics::from_trades(&[]);
        assert_eq!(stats.win_rate, Decimal::ZERO);
        assert_eq!(stats.profit_factor, Decimal::ZERO);
        assert_eq!(stats.expectancy, Decimal::ZERO);
        assert_eq!(stats.max_drawdown, Decimal::ZERO);
        assert!(stats.top_symbol.is_none());
    }

    #[test]
    fn profitability_metrics() {
        let trades = vec![
            trade("AAPL", TradeSide::Sell, Some(dec!(30))),
            trade("AAPL", TradeSide::Sell, Some(dec!(-10))),
            trade("MSFT", TradeSide::Sell, Some(dec!(20))),
            trade("AAPL", TradeSide::Buy, None),
        ];
        let stats = TradeStatistics::from_trades(&trades);

        assert_eq!(stats.total_trades, 4);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 1);
        assert_eq!(stats.win_rate, dec!(0.5));
        assert_eq!(stats.profit_factor, dec!(5));
        assert!(!stats.profit_factor_capped);
        assert_eq!(stats.expectancy, dec!(10));
        assert_eq!(stats.average_win, dec!(25));
        assert_eq!(stats.average_loss, dec!(10));
        assert_eq!(stats.largest_win, dec!(30));
        assert_eq!(stats.total_fees, dec!(2.0));
        assert_eq!(stats.max_drawdown, dec!(10));
    }

    #[test]
    fn profit_factor_is_capped_without_losses() {
        let stats = TradeStatistics::from_trades(&[trade("AAPL", TradeSide::Sell, Some(dec!(5)))]);
        assert_eq!(stats.profit_factor, PROFIT_FACTOR_CAP);
        assert!(stats.profit_factor_capped);
    }

    #[test]
    fn profit_factor_is_zero_without_wins() {
        let stats = TradeStatistics::from_trades(&[trade("AAPL", TradeSide::Sell, Some(dec!(-5)))]);
        assert_eq!(stats.profit_factor, Decimal::ZERO);
        assert_eq!(stats.max_drawdown, dec!(5));
    }

    #[test]
    fn streaks_and_symbol_concentration() {
        let trades = vec![
            trade("ETH", TradeSide::Buy, Some(dec!(-1))),
            trade("ETH", TradeSide::Sell, Some(dec!(-1))),
            trade("BTC", TradeSide::Buy, None),
            trade("ETH", TradeSide::Sell, Some(dec!(-1))),
            trade("BTC", TradeSide::Sell, Some(dec!(4))),
        ];
        let stats = TradeStatistics::from_trades(&trades);

        // the break-even fill does not interrupt the losing streak
        assert_eq!(stats.max_consecutive_losses, 3);
        assert_eq!(stats.max_consecutive_wins, 1);
        assert_eq!(stats.buy_count, 2);
        assert_eq!(stats.sell_count, 3);
        assert_eq!(stats.distinct_symbols, 2);
        assert_eq!(stats.top_symbol.as_deref(), Some("ETH"));
        assert_eq!(stats.top_symbol_share, dec!(0.6));
    }

    #[test]
    fn trade_returns_skip_unrealized_fills() {
        let trades = vec![
            trade("AAPL", TradeSide::Sell, Some(dec!(10))),
            trade("AAPL", TradeSide::Buy, None),
        ];
        assert_eq!(trade_returns(&trades), vec![0.1]);
    }

    #[test]
    fn huge_pnl_saturates_instead_of_overflowing() {
        let trades = vec![
            trade("AAPL", TradeSide::Sell, Some(dec!(60000000000000000000000000000))),
            trade("AAPL", TradeSide::Sell, Some(dec!(60000000000000000000000000000))),
            trade("AAPL", TradeSide::Sell, Some(-Decimal::MAX)),
        ];
        let stats = TradeStatistics::from_trades(&trades);

        assert_eq!(stats.gross_profit, Decimal::MAX);
        assert_eq!(stats.gross_loss, Decimal::MAX);
        assert_eq!(stats.profit_factor, Decimal::ONE);
        assert!(stats.max_drawdown >= Decimal::ZERO);
        assert_eq!(stats.max_consecutive_wins, 2);
    }

    #[test]
    fn ratio_past_the_decimal_range_is_capped() {
        let mut loser = trade("AAPL", TradeSide::Sell, Some(dec!(-0.0000000000000000000000000001)));
        loser.fees = None;
        let trades = vec![trade("AAPL", TradeSide::Sell, Some(dec!(60000000000000000000000000000))), loser];
        let stats = TradeStatistics::from_trades(&trades);

        assert_eq!(stats.profit_factor, PROFIT_FACTOR_CAP);
        assert!(stats.profit_factor_capped);
    }

    #[test]
    fn tiny_notional_returns_are_skipped() {
        let mut tiny = trade("AAPL", TradeSide::Sell, Some(dec!(100000000000)));
        tiny.quantity = dec!(0.0000000001);
        tiny.price = dec!(0.0000000001);
        let trades = vec![tiny, trade("AAPL", TradeSide::Sell, Some(dec!(10)))];

        assert_eq!(trade_returns(&trades), vec![0.1]);
    }
}
