use rust_decimal::Decimal;
use std::collections::VecDeque;
use strategy_types::{EthAmount, TokenAmount};

/// One FIFO inventory lot, spec §3 "Position": a buy pushes `(tokenAmount,
/// ethCostBasis)`; `eth_cost_basis` is the gross pre-fee ETH spent to
/// acquire the lot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lot {
    pub token_amount: TokenAmount,
    pub eth_cost_basis: EthAmount,
}

/// Per `(run, token)` FIFO inventory, spec §3 "Position" / §4.D step 2-3.
/// Generalizes `PositionTracker`'s per-key running-total map to a queue of
/// cost-basis lots, since realized PnL needs the *acquisition* price, not
/// just net size.
#[derive(Debug, Clone, Default)]
pub struct Position {
    lots: VecDeque<Lot>,
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token_amount(&self) -> TokenAmount {
        self.lots.iter().map(|lot| lot.token_amount).sum()
    }

    pub fn push_buy(&mut self, token_amount: TokenAmount, eth_cost_basis: EthAmount) {
        self.lots.push_back(Lot {
            token_amount,
            eth_cost_basis,
        });
    }

    /// Consume lots oldest-first for a sell of `token_amount`, returning
    /// the total cost basis of the consumed portion. Errs with the
    /// currently available amount if the position is insufficient.
    pub fn consume_sell(&mut self, token_amount: TokenAmount) -> Result<EthAmount, TokenAmount> {
        let available = self.token_amount();
        if token_amount > available {
            return Err(available);
        }

        let mut remaining = token_amount.as_decimal();
        let mut cost_basis = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let lot = self.lots.front_mut().expect("available checked above covers this loop");
            let lot_qty = lot.token_amount.as_decimal();

            if lot_qty <= remaining {
                cost_basis += lot.eth_cost_basis.as_decimal();
                remaining -= lot_qty;
                self.lots.pop_front();
            } else {
                let fraction = remaining / lot_qty;
                let consumed_cost = lot.eth_cost_basis.as_decimal() * fraction;
                cost_basis += consumed_cost;
                lot.token_amount = TokenAmount::from_decimal(lot_qty - remaining);
                lot.eth_cost_basis = EthAmount::from_decimal(lot.eth_cost_basis.as_decimal() - consumed_cost);
                remaining = Decimal::ZERO;
            }
        }

        Ok(EthAmount::from_decimal(cost_basis))
    }
}
