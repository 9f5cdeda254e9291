use crate::chain::{CustodyGateway, DirectSubmitter, PairReader};
use crate::config::{ExecutorConfig, VenueCredential, VenueKey};
use crate::error::ExecutorError;
use crate::intent::{Receipt, TradeIntent, TxStatus};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use strategy_types::{Address, EthAmount, Side, TokenAmount};

/// One-hour on-chain trade deadline, spec §4.C step 5 "an hour-long
/// deadline" and §6's custody `executeBuy`/`executeSell` deadline.
pub const TRADE_DEADLINE: ChronoDuration = ChronoDuration::hours(1);

/// Component C: the Trade Executor (spec §4.C). Generalizes
/// `jackbot-execution`'s client-selection-by-venue-credential pattern —
/// there, a client is picked per exchange; here, a *mode* (direct vs.
/// delegate) is picked per the configured credential and custody wiring.
pub struct TradeExecutor {
    reader: Arc<dyn PairReader>,
    direct: Option<Arc<dyn DirectSubmitter>>,
    custody: Option<Arc<dyn CustodyGateway>>,
    config: ExecutorConfig,
    credential: VenueCredential,
}

impl TradeExecutor {
    pub fn new(
        reader: Arc<dyn PairReader>,
        direct: Option<Arc<dyn DirectSubmitter>>,
        custody: Option<Arc<dyn CustodyGateway>>,
        config: ExecutorConfig,
        credential: VenueCredential,
    ) -> Self {
        Self {
            reader,
            direct,
            custody,
            config,
            credential,
        }
    }

    /// Wraps a direct-mode submission in the configured receipt deadline
    /// (spec §5: "every on-chain await respects a receipt deadline,
    /// default one hour"), surfacing an expired wait as a retryable
    /// [`ExecutorError::Timeout`].
    async fn await_receipt(
        &self,
        fut: impl std::future::Future<Output = Result<Receipt, ExecutorError>>,
    ) -> Result<Receipt, ExecutorError> {
        tokio::time::timeout(self.config.receipt_deadline, fut)
            .await
            .map_err(|_| ExecutorError::Timeout)?
    }

    fn select_mode(&self) -> Result<Mode, ExecutorError> {
        if self.config.delegate_is_configured(&self.credential) {
            let VenueKey::DelegateUser(user) = &self.credential.key else {
                unreachable!("delegate_is_configured already checked the key variant");
            };
            return Ok(Mode::Delegate {
                user: user.clone(),
            });
        }
        if matches!(self.credential.key, VenueKey::DirectPrivateKey(_)) && self.direct.is_some() {
            return Ok(Mode::Direct);
        }
        Err(ExecutorError::VenueNotConfigured)
    }

    /// Execute a validated [`TradeIntent`], spec §4.C steps 1-6.
    pub async fn execute(&self, intent: TradeIntent, now: DateTime<Utc>) -> Result<Receipt, ExecutorError> {
        // Step 1: validate.
        let parsed_amount = match intent.side {
            Side::Buy => {
                let eth_in = EthAmount::parse_positive(&intent.amount)?;
                if eth_in > self.config.max_eth_per_trade {
                    return Err(ExecutorError::RiskLimitExceeded {
                        amount: eth_in.to_string(),
                        limit: self.config.max_eth_per_trade.to_string(),
                    });
                }
                Amount::Eth(eth_in)
            }
            Side::Sell => Amount::Token(TokenAmount::parse_positive(&intent.amount)?),
        };

        // Step 2: dry-run short-circuit.
        if self.config.dry_run {
            return Ok(Receipt::simulated());
        }

        // Step 3: select mode.
        let mode = self.select_mode()?;
        let deadline = now + TRADE_DEADLINE;

        // Step 4: quote against fresh reserves.
        let reserves = self.reader.reserves(&intent.pair).await?;

        match (intent.side, mode) {
            (Side::Buy, Mode::Direct) => {
                let Amount::Eth(eth_in) = parsed_amount else {
                    unreachable!("buy validated to an EthAmount above")
                };
                let quote = strategy_math::buy_quote(
                    &reserves,
                    eth_in.as_decimal(),
                    self.config.default_slippage_bps,
                )?;
                let min_out = TokenAmount::from_decimal(quote.min_out);
                let direct = self.direct.as_ref().expect("Mode::Direct implies direct submitter is set");
                self.await_receipt(direct.submit_buy(&intent.pair, eth_in, min_out, deadline)).await
            }
            (Side::Sell, Mode::Direct) => {
                let Amount::Token(token_in) = parsed_amount else {
                    unreachable!("sell validated to a TokenAmount above")
                };
                let quote = strategy_math::sell_quote(
                    &reserves,
                    token_in.as_decimal(),
                    self.config.default_slippage_bps,
                )?;
                let min_out = EthAmount::from_decimal(quote.min_out);
                let direct = self.direct.as_ref().expect("Mode::Direct implies direct submitter is set");
                self.await_receipt(direct.submit_sell(&intent.pair, token_in, min_out, deadline)).await
            }
            (Side::Buy, Mode::Delegate { user }) => {
                let Amount::Eth(eth_in) = parsed_amount else {
                    unreachable!("buy validated to an EthAmount above")
                };
                let custody = self.custody.as_ref().ok_or(ExecutorError::DelegateNotConfigured)?;
                let operator = self
                    .config
                    .operator_address
                    .clone()
                    .ok_or(ExecutorError::DelegateNotConfigured)?;

                // The pool never sees the custody fee portion (spec §4.C
                // step 4): quote against `eth_in` net of the custody fee.
                let fee = strategy_custody::fee_amount(eth_in, custody.fee_bps());
                let net_in = eth_in - fee;
                let quote = strategy_math::buy_quote(
                    &reserves,
                    net_in.as_decimal(),
                    self.config.default_slippage_bps,
                )?;
                let min_out = TokenAmount::from_decimal(quote.min_out);

                let tokens_out = custody.execute_buy(
                    &operator,
                    &user,
                    &intent.pair,
                    eth_in,
                    min_out,
                    deadline,
                    now,
                )?;
                Ok(delegate_receipt(tokens_out.to_string(), now))
            }
            (Side::Sell, Mode::Delegate { user }) => {
                let Amount::Token(token_in) = parsed_amount else {
                    unreachable!("sell validated to a TokenAmount above")
                };
                let custody = self.custody.as_ref().ok_or(ExecutorError::DelegateNotConfigured)?;
                let operator = self
                    .config
                    .operator_address
                    .clone()
                    .ok_or(ExecutorError::DelegateNotConfigured)?;

                let quote = strategy_math::sell_quote(
                    &reserves,
                    token_in.as_decimal(),
                    self.config.default_slippage_bps,
                )?;
                let min_out = EthAmount::from_decimal(quote.min_out);

                let eth_out = custody.execute_sell(
                    &operator,
                    &user,
                    &intent.pair,
                    token_in,
                    min_out,
                    deadline,
                    now,
                )?;
                Ok(delegate_receipt(eth_out.to_string(), now))
            }
        }
    }
}

enum Amount {
    Eth(EthAmount),
    Token(TokenAmount),
}

#[derive(Debug, Clone)]
enum Mode {
    Direct,
    Delegate { user: Address },
}

/// Delegate-mode trades don't produce a transaction hash the Executor can
/// see directly (the custody contract call is the transaction); a
/// content-derived pseudo-hash keeps the receipt shape uniform for the
/// Ledger, which only needs a stable, non-zero identifier to distinguish
/// this fill from a dry run.
fn delegate_receipt(seed: String, now: DateTime<Utc>) -> Receipt {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    now.timestamp_nanos_opt().unwrap_or_default().hash(&mut hasher);
    Receipt {
        hash: format!("0x{:064x}", hasher.finish()),
        status: TxStatus::Confirmed,
    }
}
