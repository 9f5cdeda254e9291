use rust_decimal::Decimal;

/// Largest peak-to-trough decline along a cumulative PnL series, as a
/// percent of the peak — spec §4.D: "zero if the peak is non-positive."
///
/// Generalizes `MaxDrawdownGenerator`'s running-peak scan to a one-shot
/// pass over an already-materialized series, since the Ledger recomputes
/// this per `performance` query rather than maintaining it incrementally.
pub fn max_drawdown_pct(cumulative_series: &[Decimal]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;

    for &cumulative in cumulative_series {
        if cumulative > peak {
            peak = cumulative;
        }
        if peak > Decimal::ZERO {
            let drawdown = (peak - cumulative) / peak * Decimal::from(100);
            if drawdown > worst {
                worst = drawdown;
            }
        }
    }

    worst
}
