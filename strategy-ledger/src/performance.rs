use crate::drawdown::max_drawdown_pct;
use crate::model::Trade;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strategy_types::Side;

/// Query window for [`build_performance`], spec §6 `performance(strategyId,
/// range)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "7d")]
    Day7,
    All,
}

impl TimeRange {
    fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Hour1 => Some(now - Duration::hours(1)),
            Self::Hour4 => Some(now - Duration::hours(4)),
            Self::Day1 => Some(now - Duration::days(1)),
            Self::Day7 => Some(now - Duration::days(7)),
            Self::All => None,
        }
    }
}

/// One point on an equity curve, spec §4.D: bracketed by a synthetic
/// origin and a synthetic "now" point around the run's actual trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub at: DateTime<Utc>,
    pub cumulative: Decimal,
}

/// Aggregate statistics over a performance window, spec §6. Win rate,
/// average, best, and worst are computed over sell trades only — buys are
/// inventory acquisition, not P/L events (spec §4.D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_pnl: Decimal,
    pub total_pnl_pct: Decimal,
    pub win_rate: Decimal,
    pub max_drawdown_pct: Decimal,
    pub avg: Decimal,
    pub best: Decimal,
    pub worst: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub summary: PerformanceSummary,
}

/// Builds a bracketed equity curve and summary over `all_trades` — the
/// full ordered trade history of one run — narrowed to `range`.
pub fn build_performance(all_trades: &[Trade], range: TimeRange, now: DateTime<Utc>) -> Performance {
    let range_start = range.start(now);
    let trades: Vec<Trade> = all_trades
        .iter()
        .filter(|trade| range_start.map_or(true, |start| trade.timestamp >= start))
        .cloned()
        .collect();

    let origin_at = range_start.unwrap_or_else(|| trades.first().map(|t| t.timestamp).unwrap_or(now));
    let mut equity_curve = vec![EquityPoint {
        at: origin_at,
        cumulative: Decimal::ZERO,
    }];
    equity_curve.extend(trades.iter().map(|trade| EquityPoint {
        at: trade.timestamp,
        cumulative: trade.cumulative,
    }));
    let last_cumulative = trades.last().map(|t| t.cumulative).unwrap_or(Decimal::ZERO);
    equity_curve.push(EquityPoint {
        at: now,
        cumulative: last_cumulative,
    });

    let sells: Vec<&Trade> = trades.iter().filter(|t| t.side == Side::Sell).collect();
    let total_pnl: Decimal = sells.iter().map(|t| t.pnl).sum();
    let total_cost_basis: Decimal = sells.iter().map(|t| t.eth_amount.as_decimal() - t.pnl).sum();
    let total_pnl_pct = if total_cost_basis > Decimal::ZERO {
        total_pnl / total_cost_basis * Decimal::from(100)
    } else {
        Decimal::ZERO
    };

    let win_rate = if sells.is_empty() {
        Decimal::ZERO
    } else {
        let wins = sells.iter().filter(|t| t.pnl > Decimal::ZERO).count();
        Decimal::from(wins) / Decimal::from(sells.len()) * Decimal::from(100)
    };

    let (avg, best, worst) = if sells.is_empty() {
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    } else {
        let count = Decimal::from(sells.len());
        let best = sells.iter().map(|t| t.pnl).fold(Decimal::MIN, Decimal::max);
        let worst = sells.iter().map(|t| t.pnl).fold(Decimal::MAX, Decimal::min);
        (total_pnl / count, best, worst)
    };

    let cumulative_series: Vec<Decimal> = equity_curve.iter().map(|point| point.cumulative).collect();

    Performance {
        equity_curve,
        trades,
        summary: PerformanceSummary {
            total_pnl,
            total_pnl_pct,
            win_rate,
            max_drawdown_pct: max_drawdown_pct(&cumulative_series),
            avg,
            best,
            worst,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RunId;
    use rust_decimal_macros::dec;
    use strategy_types::{Address, EthAmount, TokenAmount};

    fn pair() -> Address {
        "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap()
    }

    fn trade(idx: u64, at: DateTime<Utc>, side: Side, pnl: Decimal, cumulative: Decimal) -> Trade {
        Trade {
            run_id: RunId("r1".into()),
            idx,
            timestamp: at,
            side,
            pair: pair(),
            eth_amount: EthAmount::from_decimal(dec!(1) + pnl.max(Decimal::ZERO)),
            token_amount: TokenAmount::from_decimal(dec!(100)),
            pnl,
            pnl_pct: Decimal::ZERO,
            cumulative,
            tx_hash: format!("0x{idx:064x}"),
        }
    }

    #[test]
    fn win_rate_only_counts_sells() {
        let t0 = DateTime::<Utc>::MIN_UTC;
        let trades = vec![
            trade(0, t0, Side::Buy, Decimal::ZERO, Decimal::ZERO),
            trade(1, t0 + Duration::seconds(1), Side::Sell, dec!(1), dec!(1)),
        ];
        let perf = build_performance(&trades, TimeRange::All, t0 + Duration::seconds(2));
        assert_eq!(perf.summary.win_rate, dec!(100));
    }

    #[test]
    fn equity_curve_is_bracketed_by_origin_and_now() {
        let t0 = DateTime::<Utc>::MIN_UTC;
        let trades = vec![trade(0, t0, Side::Sell, dec!(2), dec!(2))];
        let now = t0 + Duration::seconds(10);
        let perf = build_performance(&trades, TimeRange::All, now);

        assert_eq!(perf.equity_curve.len(), 3);
        assert_eq!(perf.equity_curve[0].cumulative, Decimal::ZERO);
        assert_eq!(perf.equity_curve[1].cumulative, dec!(2));
        assert_eq!(perf.equity_curve[2].at, now);
        assert_eq!(perf.equity_curve[2].cumulative, dec!(2));
    }

    #[test]
    fn range_filters_out_trades_before_the_window_start() {
        let t0 = DateTime::<Utc>::MIN_UTC;
        let old_trade = trade(0, t0, Side::Sell, dec!(1), dec!(1));
        let recent_trade = trade(1, t0 + Duration::days(10), Side::Sell, dec!(2), dec!(3));
        let now = t0 + Duration::days(10) + Duration::hours(1);

        let perf = build_performance(&[old_trade, recent_trade], TimeRange::Day7, now);
        assert_eq!(perf.trades.len(), 1);
        assert_eq!(perf.summary.total_pnl, dec!(2));
    }

    #[test]
    fn no_trades_yields_a_flat_zero_summary() {
        let now = DateTime::<Utc>::MIN_UTC;
        let perf = build_performance(&[], TimeRange::All, now);
        assert_eq!(perf.equity_curve.len(), 2);
        assert_eq!(perf.summary.total_pnl, Decimal::ZERO);
        assert_eq!(perf.summary.win_rate, Decimal::ZERO);
    }
}
