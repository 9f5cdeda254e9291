use crate::error::CustodyError;
use crate::event::CustodyEvent;
use crate::pair::PairMarket;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use strategy_types::{Address, EthAmount, TokenAmount};

/// Hard ceiling on the operator fee, spec §4.B: "bounded by a hard
/// ceiling, 1000 bps".
pub const FEE_CEILING_BPS: u32 = 1000;

struct Inner {
    owner: Address,
    guardian: Address,
    operator: Address,
    fee_receiver: Address,
    fee_bps: u32,
    paused: bool,
    /// Single-slot reentrancy latch, spec §4.B invariant 4.
    entered: bool,
    eth_balances: HashMap<Address, EthAmount>,
    token_balances: HashMap<(Address, Address), TokenAmount>,
    pair_allowlist: HashSet<Address>,
    events: Vec<CustodyEvent>,
}

/// The Custody Contract (spec §4.B): a contract-enforced split between an
/// operator that may trade and a user that may withdraw.
///
/// Modeled as an in-process state machine rather than bytecode — the
/// same "state + guarded transitions" shape `jackbot-execution`'s mock
/// exchange clients use, generalized to this system's deposit/withdraw/
/// trade/admin surface. `strategy-execution`'s delegate-mode path treats
/// this as the chain: every state-changing method corresponds 1:1 to an
/// entry in spec §6's Custody interface.
pub struct CustodyContract<M> {
    inner: Mutex<Inner>,
    pair_market: M,
}

impl<M: PairMarket> CustodyContract<M> {
    pub fn new(
        owner: Address,
        guardian: Address,
        operator: Address,
        fee_receiver: Address,
        fee_bps: u32,
        pair_market: M,
    ) -> Result<Self, CustodyError> {
        if fee_bps > FEE_CEILING_BPS {
            return Err(CustodyError::FeeCeilingExceeded);
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                owner,
                guardian,
                operator,
                fee_receiver,
                fee_bps,
                paused: false,
                entered: false,
                eth_balances: HashMap::new(),
                token_balances: HashMap::new(),
                pair_allowlist: HashSet::new(),
                events: Vec::new(),
            }),
            pair_market,
        })
    }

    /// Acquire the reentrancy latch for the duration of `f`, releasing it
    /// afterwards regardless of outcome (spec §4.B invariant 4: "every
    /// external-call path is guarded by a single-slot reentrancy latch").
    fn with_latch<T>(
        &self,
        f: impl FnOnce(&mut Inner) -> Result<T, CustodyError>,
    ) -> Result<T, CustodyError> {
        let _guard = self.acquire_latch()?;
        let mut inner = self.inner.lock();
        f(&mut inner)
    }

    /// Acquire the latch and hold it across an entire multi-step call —
    /// including the external `PairMarket` call in `execute_buy`/
    /// `execute_sell` — releasing it on drop so a reentrant call anywhere
    /// in that window reverts with [`CustodyError::Reentrancy`].
    fn acquire_latch(&self) -> Result<ReentrancyGuard<'_, M>, CustodyError> {
        let mut inner = self.inner.lock();
        if inner.entered {
            return Err(CustodyError::Reentrancy);
        }
        inner.entered = true;
        Ok(ReentrancyGuard { contract: self })
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    pub fn balance_of(&self, user: &Address) -> EthAmount {
        self.inner
            .lock()
            .eth_balances
            .get(user)
            .copied()
            .unwrap_or(EthAmount::ZERO)
    }

    pub fn token_balance_of(&self, user: &Address, token: &Address) -> TokenAmount {
        self.inner
            .lock()
            .token_balances
            .get(&(user.clone(), token.clone()))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn is_pair_allowed(&self, pair: &Address) -> bool {
        self.inner.lock().pair_allowlist.contains(pair)
    }

    pub fn events(&self) -> Vec<CustodyEvent> {
        self.inner.lock().events.clone()
    }

    pub fn fee_bps(&self) -> u32 {
        self.inner.lock().fee_bps
    }

    pub fn operator(&self) -> Address {
        self.inner.lock().operator.clone()
    }

    // --- Depositor surface -------------------------------------------------

    pub fn deposit(&self, caller: &Address, amount: EthAmount, now: DateTime<Utc>) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            if inner.paused {
                return Err(CustodyError::Paused);
            }
            *inner.eth_balances.entry(caller.clone()).or_insert(EthAmount::ZERO) += amount;
            inner.events.push(CustodyEvent::Deposited {
                at: now,
                depositor: caller.clone(),
                amount,
            });
            Ok(())
        })
    }

    /// Withdraws must succeed even when paused — the escape hatch (spec
    /// §4.B invariant 3 exempts `withdraw*` explicitly).
    pub fn withdraw(&self, caller: &Address, amount: EthAmount, now: DateTime<Utc>) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            let balance = inner.eth_balances.entry(caller.clone()).or_insert(EthAmount::ZERO);
            if *balance < amount {
                return Err(CustodyError::InsufficientBalance);
            }
            *balance = *balance - amount;
            inner.events.push(CustodyEvent::Withdrawn {
                at: now,
                depositor: caller.clone(),
                amount,
            });
            Ok(())
        })
    }

    pub fn withdraw_all(&self, caller: &Address, now: DateTime<Utc>) -> Result<EthAmount, CustodyError> {
        self.with_latch(|inner| {
            let balance = inner
                .eth_balances
                .insert(caller.clone(), EthAmount::ZERO)
                .unwrap_or(EthAmount::ZERO);
            inner.events.push(CustodyEvent::Withdrawn {
                at: now,
                depositor: caller.clone(),
                amount: balance,
            });
            Ok(balance)
        })
    }

    pub fn withdraw_tokens(
        &self,
        caller: &Address,
        token: &Address,
    ) -> Result<TokenAmount, CustodyError> {
        self.with_latch(|inner| {
            let balance = inner
                .token_balances
                .insert((caller.clone(), token.clone()), TokenAmount::ZERO)
                .unwrap_or(TokenAmount::ZERO);
            Ok(balance)
        })
    }

    // --- Operator surface ----------------------------------------------------

    pub fn execute_buy(
        &self,
        caller: &Address,
        user: &Address,
        pair: &Address,
        eth_in: EthAmount,
        min_tokens_out: TokenAmount,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<TokenAmount, CustodyError> {
        let _guard = self.acquire_latch()?;

        let (fee, net_in) = {
            let mut inner = self.inner.lock();
            if caller != &inner.operator {
                return Err(CustodyError::NotAuthorized);
            }
            if inner.paused {
                return Err(CustodyError::Paused);
            }
            if !inner.pair_allowlist.contains(pair) {
                return Err(CustodyError::PairNotAllowed);
            }
            if deadline < now {
                return Err(CustodyError::DeadlineExpired);
            }
            let balance = inner.eth_balances.entry(user.clone()).or_insert(EthAmount::ZERO);
            if *balance < eth_in {
                return Err(CustodyError::InsufficientBalance);
            }
            *balance = *balance - eth_in;

            let fee = fee_amount(eth_in, inner.fee_bps);
            let net_in = eth_in - fee;
            *inner
                .eth_balances
                .entry(inner.fee_receiver.clone())
                .or_insert(EthAmount::ZERO) += fee;
            (fee, net_in)
        };

        let tokens_out = match self.pair_market.buy(pair, net_in, min_tokens_out) {
            Ok(tokens_out) => tokens_out,
            Err(e) => {
                // The call reverted atomically on a real chain; undo the
                // debit so no partial state survives here either.
                let mut inner = self.inner.lock();
                *inner.eth_balances.entry(user.clone()).or_insert(EthAmount::ZERO) += eth_in;
                *inner
                    .eth_balances
                    .entry(inner.fee_receiver.clone())
                    .or_insert(EthAmount::ZERO) -= fee;
                return Err(e);
            }
        };

        let mut inner = self.inner.lock();
        *inner
            .token_balances
            .entry((user.clone(), pair.clone()))
            .or_insert(TokenAmount::ZERO) += tokens_out;
        inner.events.push(CustodyEvent::BuyExecuted {
            at: now,
            user: user.clone(),
            pair: pair.clone(),
            eth_in,
            tokens_out,
            fee,
        });
        Ok(tokens_out)
    }

    pub fn execute_sell(
        &self,
        caller: &Address,
        user: &Address,
        pair: &Address,
        token_in: TokenAmount,
        min_eth_out: EthAmount,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<EthAmount, CustodyError> {
        let _guard = self.acquire_latch()?;

        {
            let mut inner = self.inner.lock();
            if caller != &inner.operator {
                return Err(CustodyError::NotAuthorized);
            }
            if inner.paused {
                return Err(CustodyError::Paused);
            }
            if !inner.pair_allowlist.contains(pair) {
                return Err(CustodyError::PairNotAllowed);
            }
            if deadline < now {
                return Err(CustodyError::DeadlineExpired);
            }
            let token_balance = inner
                .token_balances
                .entry((user.clone(), pair.clone()))
                .or_insert(TokenAmount::ZERO);
            if *token_balance < token_in {
                return Err(CustodyError::InsufficientBalance);
            }
            *token_balance = *token_balance - token_in;
        }

        let eth_out = match self.pair_market.sell(pair, token_in, min_eth_out) {
            Ok(eth_out) => eth_out,
            Err(e) => {
                let mut inner = self.inner.lock();
                *inner
                    .token_balances
                    .entry((user.clone(), pair.clone()))
                    .or_insert(TokenAmount::ZERO) += token_in;
                return Err(e);
            }
        };

        let mut inner = self.inner.lock();
        let fee = fee_amount(eth_out, inner.fee_bps);
        let net_out = eth_out - fee;
        *inner.eth_balances.entry(user.clone()).or_insert(EthAmount::ZERO) += net_out;
        *inner
            .eth_balances
            .entry(inner.fee_receiver.clone())
            .or_insert(EthAmount::ZERO) += fee;
        inner.events.push(CustodyEvent::SellExecuted {
            at: now,
            user: user.clone(),
            pair: pair.clone(),
            token_in,
            eth_out: net_out,
            fee,
        });
        Ok(net_out)
    }

    // --- Admin surface ---------------------------------------------------

    pub fn set_operator(&self, caller: &Address, operator: Address, now: DateTime<Utc>) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            if caller != &inner.owner {
                return Err(CustodyError::NotAuthorized);
            }
            inner.operator = operator.clone();
            inner.events.push(CustodyEvent::OperatorChanged { at: now, operator });
            Ok(())
        })
    }

    pub fn set_fee(&self, caller: &Address, fee_bps: u32, now: DateTime<Utc>) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            if caller != &inner.owner {
                return Err(CustodyError::NotAuthorized);
            }
            if fee_bps > FEE_CEILING_BPS {
                return Err(CustodyError::FeeCeilingExceeded);
            }
            inner.fee_bps = fee_bps;
            inner.events.push(CustodyEvent::FeeChanged { at: now, fee_bps });
            Ok(())
        })
    }

    pub fn set_fee_receiver(&self, caller: &Address, fee_receiver: Address) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            if caller != &inner.owner {
                return Err(CustodyError::NotAuthorized);
            }
            inner.fee_receiver = fee_receiver;
            Ok(())
        })
    }

    /// Owner or guardian may pause — the guardian exists precisely so an
    /// emergency halt does not require the (possibly slower, multisig)
    /// owner path.
    pub fn pause(&self, caller: &Address, now: DateTime<Utc>) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            if caller != &inner.owner && caller != &inner.guardian {
                return Err(CustodyError::NotAuthorized);
            }
            inner.paused = true;
            inner.events.push(CustodyEvent::Paused { at: now });
            Ok(())
        })
    }

    pub fn unpause(&self, caller: &Address, now: DateTime<Utc>) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            if caller != &inner.owner && caller != &inner.guardian {
                return Err(CustodyError::NotAuthorized);
            }
            inner.paused = false;
            inner.events.push(CustodyEvent::Unpaused { at: now });
            Ok(())
        })
    }

    pub fn allow_pair(&self, caller: &Address, pair: Address) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            if caller != &inner.owner {
                return Err(CustodyError::NotAuthorized);
            }
            inner.pair_allowlist.insert(pair);
            Ok(())
        })
    }

    pub fn disallow_pair(&self, caller: &Address, pair: &Address) -> Result<(), CustodyError> {
        self.with_latch(|inner| {
            if caller != &inner.owner {
                return Err(CustodyError::NotAuthorized);
            }
            inner.pair_allowlist.remove(pair);
            Ok(())
        })
    }
}

struct ReentrancyGuard<'a, M> {
    contract: &'a CustodyContract<M>,
}

impl<'a, M> Drop for ReentrancyGuard<'a, M> {
    fn drop(&mut self) {
        self.contract.inner.lock().entered = false;
    }
}

/// Fee taken by the custody contract on a trade, spec §4.B: `f = ⌊ethIn ·
/// feeBps / B⌋`. Exposed so `strategy-execution` can compute the pool-side
/// quote net of the custody fee before calling `execute_buy`.
pub fn fee_amount(amount: EthAmount, fee_bps: u32) -> EthAmount {
    let bps = rust_decimal::Decimal::from(fee_bps);
    let ten_k = rust_decimal::Decimal::from(10_000);
    EthAmount::from_decimal((amount.as_decimal() * bps / ten_k).trunc_with_scale(18))
}
