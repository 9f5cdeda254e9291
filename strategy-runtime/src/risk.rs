use rust_decimal::Decimal;

/// Risk ceilings layered above the Trade Executor's own per-trade cap,
/// scoped per Run and per rolling day rather than per trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskCeilings {
    pub max_eth_per_run: Decimal,
    pub max_eth_per_day: Decimal,
    pub max_trades_per_run: u32,
}
