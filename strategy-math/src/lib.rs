//! Pure constant-product pool math — Component A of the Strategy Execution
//! Core (spec §4.A). No I/O, no async, no persistence: a pure-function
//! crate in the shape of `jackbot-ta`, which keeps its indicator math free
//! of the rest of the workspace's async/storage machinery.
//!
//! All arithmetic uses [`Decimal`] rather than floating point, and every
//! division is explicitly floored — `Decimal` has enough precision (up to
//! 28 significant digits) for the reserve magnitudes this system deals
//! with, and floor-at-wei-scale stands in for the spec's "unbounded or
//! at-least-256-bit integers, always floor" rule.

use rust_decimal::Decimal;
use std::cmp::max;

/// Platform fee factor applied to the input side before the constant
/// product invariant, spec §4.A: `φ = 9900, B = 10000`.
pub const FEE_NUMERATOR: i64 = 9900;
pub const FEE_DENOMINATOR: i64 = 10000;

/// Number of fractional digits treated as the smallest on-chain unit
/// ("wei"), matching the 18-fractional-digit amounts validated elsewhere
/// in the core (`strategy_types::amount`).
const WEI_SCALE: u32 = 18;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolMathError {
    #[error("pool reserves must both be positive")]
    EmptyReserves,
    #[error("slippage must be expressed in basis points in [0, 10000]")]
    SlippageOutOfRange,
}

/// An ephemeral read of pool reserves, spec §3 "Pool Snapshot" — never
/// persisted, only used during quote computation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub eth_reserve: Decimal,
    pub token_reserve: Decimal,
}

impl PoolSnapshot {
    pub fn new(eth_reserve: Decimal, token_reserve: Decimal) -> Self {
        Self {
            eth_reserve,
            token_reserve,
        }
    }

    fn validate(&self) -> Result<(), PoolMathError> {
        if self.eth_reserve <= Decimal::ZERO || self.token_reserve <= Decimal::ZERO {
            return Err(PoolMathError::EmptyReserves);
        }
        Ok(())
    }
}

/// Result of a buy or sell quote: the expected output at current reserves,
/// and the slippage-bounded minimum the trade will accept on-chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Quote {
    pub expected_out: Decimal,
    pub min_out: Decimal,
}

fn floor_to_wei(value: Decimal) -> Decimal {
    value.trunc_with_scale(WEI_SCALE)
}

fn validate_slippage_bps(slippage_bps: u32) -> Result<(), PoolMathError> {
    if slippage_bps > FEE_DENOMINATOR as u32 {
        return Err(PoolMathError::SlippageOutOfRange);
    }
    Ok(())
}

/// Generalized constant-product quote: `input_reserve`/`output_reserve`
/// are ETH/token for a buy, token/ETH for a sell.
fn quote(
    input_reserve: Decimal,
    output_reserve: Decimal,
    input_amount: Decimal,
    slippage_bps: u32,
) -> Result<Quote, PoolMathError> {
    validate_slippage_bps(slippage_bps)?;

    let phi = Decimal::from(FEE_NUMERATOR);
    let b = Decimal::from(FEE_DENOMINATOR);

    let effective_input = floor_to_wei(input_amount * phi / b);
    let new_input_reserve = input_reserve + effective_input;
    let k = input_reserve * output_reserve;
    let new_output_reserve = floor_to_wei(k / new_input_reserve);

    let expected_out = max(output_reserve - new_output_reserve, Decimal::ZERO);

    let haircut = b - Decimal::from(slippage_bps);
    let after_slippage = floor_to_wei(expected_out * haircut / b);
    let one_wei = Decimal::new(1, WEI_SCALE);
    let min_out = after_slippage - one_wei;

    Ok(Quote {
        expected_out,
        min_out,
    })
}

/// Buy quote: spend `eth_in` (already net of any custody-level fee) for
/// tokens. `slippage_bps` is the caller's configured slippage tolerance.
pub fn buy_quote(
    reserves: &PoolSnapshot,
    eth_in: Decimal,
    slippage_bps: u32,
) -> Result<Quote, PoolMathError> {
    reserves.validate()?;
    quote(reserves.eth_reserve, reserves.token_reserve, eth_in, slippage_bps)
}

/// Sell quote: spend `token_in` tokens for ETH. Symmetric with tokens as
/// input and ETH as output.
pub fn sell_quote(
    reserves: &PoolSnapshot,
    token_in: Decimal,
    slippage_bps: u32,
) -> Result<Quote, PoolMathError> {
    reserves.validate()?;
    quote(reserves.token_reserve, reserves.eth_reserve, token_in, slippage_bps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reserves() -> PoolSnapshot {
        PoolSnapshot::new(dec!(1000), dec!(1000000))
    }

    #[test]
    fn zero_slippage_equals_expected_output_within_one_wei() {
        let q = buy_quote(&reserves(), dec!(1), 0).unwrap();
        let one_wei = Decimal::new(1, WEI_SCALE);
        assert_eq!(q.expected_out - q.min_out, one_wei);
    }

    #[test]
    fn positive_slippage_is_strictly_less_than_zero_slippage() {
        let zero = buy_quote(&reserves(), dec!(1), 0).unwrap();
        let some = buy_quote(&reserves(), dec!(1), 100).unwrap();
        assert!(zero.expected_out > Decimal::ZERO);
        assert!(some.min_out < zero.min_out);
    }

    #[test]
    fn buy_and_sell_are_symmetric_in_shape() {
        let buy = buy_quote(&reserves(), dec!(1), 100).unwrap();
        assert!(buy.expected_out > Decimal::ZERO);

        let sell = sell_quote(&reserves(), dec!(1000), 100).unwrap();
        assert!(sell.expected_out > Decimal::ZERO);
    }

    #[test]
    fn rejects_empty_reserves() {
        let empty = PoolSnapshot::new(Decimal::ZERO, dec!(1000000));
        assert!(buy_quote(&empty, dec!(1), 100).is_err());
    }

    #[test]
    fn rejects_slippage_above_100_pct() {
        assert!(buy_quote(&reserves(), dec!(1), 20000).is_err());
    }

    #[test]
    fn larger_input_moves_price_against_the_trader() {
        let small = buy_quote(&reserves(), dec!(1), 0).unwrap();
        let large = buy_quote(&reserves(), dec!(100), 0).unwrap();
        // price per ETH in tokens should worsen (fewer tokens per ETH) as size grows
        let small_rate = small.expected_out / dec!(1);
        let large_rate = large.expected_out / dec!(100);
        assert!(large_rate < small_rate);
    }
}
