//! Process configuration, read once at startup from the environment —
//! generalizes `jackbot-execution`'s per-venue credential loading to this
//! binary's single top-level config.

use crate::error::CoreError;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use strategy_execution::{ExecutorConfig, VenueCredential, VenueKey};
use strategy_runtime::RiskCeilings;
use strategy_types::Address;

const DEFAULT_RPC_URL: &str = "https://eth.public-rpc.example";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_rpc_url: String,
    pub custody_address: Option<Address>,
    pub operator_private_key: Option<String>,
    pub operator_address: Option<Address>,
    pub admin_token: Option<String>,
    pub max_eth_per_trade: Decimal,
    pub risk_ceilings: RiskCeilings,
    pub default_slippage_bps: u32,
    pub dry_run: bool,
    pub strategy_store_path: std::path::PathBuf,
}

impl Config {
    /// Loads the full environment-variable surface this binary reads.
    /// `TRAD_ADMIN_TOKEN` unset is only accepted when `dry_run` is true —
    /// a production process with a state-changing HTTP surface and no
    /// bearer token is refused outright rather than left open.
    pub fn from_env() -> Result<Self, CoreError> {
        let base_rpc_url = env_or("BASE_RPC_URL", DEFAULT_RPC_URL);
        let custody_address = optional_parsed::<Address>("TRAD_DELEGATE_ADDRESS")?;
        let operator_private_key = std::env::var("OPERATOR_PRIVATE_KEY").ok();
        let operator_address = optional_parsed::<Address>("OPERATOR_ADDRESS")?;
        let admin_token = std::env::var("TRAD_ADMIN_TOKEN").ok();
        let dry_run = env_bool("DRY_RUN", true);

        if admin_token.is_none() && !dry_run {
            return Err(CoreError::Config(
                "TRAD_ADMIN_TOKEN must be set before running with DRY_RUN=false".to_string(),
            ));
        }

        let max_eth_per_trade = env_decimal("MAX_ETH_PER_TRADE", Decimal::new(1, 1))?;
        let risk_ceilings = RiskCeilings {
            max_eth_per_run: env_decimal("MAX_ETH_PER_RUN", Decimal::new(10, 0))?,
            max_eth_per_day: env_decimal("MAX_ETH_PER_DAY", Decimal::new(50, 0))?,
            max_trades_per_run: env_u32("MAX_TRADES_PER_RUN", 200)?,
        };
        let default_slippage_bps = env_u32("DEFAULT_SLIPPAGE_BPS", 100)?;
        let strategy_store_path = std::path::PathBuf::from(env_or("STRATEGY_STORE_PATH", "strategies.json"));

        Ok(Self {
            base_rpc_url,
            custody_address,
            operator_private_key,
            operator_address,
            admin_token,
            max_eth_per_trade,
            risk_ceilings,
            default_slippage_bps,
            dry_run,
            strategy_store_path,
        })
    }

    /// Builds the credential the Trade Executor is configured with:
    /// delegate mode if a custody address and operator key are both
    /// present, direct mode from the operator's own key otherwise.
    pub fn venue_credential(&self, now: chrono::DateTime<chrono::Utc>) -> VenueCredential {
        let key = match (&self.custody_address, &self.operator_address) {
            (Some(_), Some(user)) => VenueKey::DelegateUser(user.clone()),
            _ => VenueKey::DirectPrivateKey(self.operator_private_key.clone().unwrap_or_default()),
        };
        VenueCredential {
            key,
            network_endpoint: self.base_rpc_url.clone(),
            last_updated: now,
        }
    }

    pub fn executor_config(&self) -> Result<ExecutorConfig, CoreError> {
        Ok(ExecutorConfig {
            custody_address: self.custody_address.clone(),
            operator_private_key: self.operator_private_key.clone(),
            operator_address: self.operator_address.clone(),
            max_eth_per_trade: strategy_types::EthAmount::parse_positive(&self.max_eth_per_trade.to_string())
                .map_err(|e| CoreError::Config(e.to_string()))?,
            default_slippage_bps: self.default_slippage_bps,
            dry_run: self.dry_run,
            receipt_deadline: Duration::from_secs(3600),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

fn env_decimal(name: &str, default: Decimal) -> Result<Decimal, CoreError> {
    match std::env::var(name) {
        Ok(v) => Decimal::from_str(&v).map_err(|_| CoreError::Config(format!("{name} is not a valid decimal: {v}"))),
        Err(_) => Ok(default),
    }
}

fn env_u32(name: &str, default: u32) -> Result<u32, CoreError> {
    match std::env::var(name) {
        Ok(v) => v.parse().map_err(|_| CoreError::Config(format!("{name} is not a valid integer: {v}"))),
        Err(_) => Ok(default),
    }
}

fn optional_parsed<T: FromStr>(name: &str) -> Result<Option<T>, CoreError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(v) if v.is_empty() => Ok(None),
        Ok(v) => v
            .parse()
            .map(Some)
            .map_err(|e: T::Err| CoreError::Config(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}
