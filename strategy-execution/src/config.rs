use chrono::{DateTime, Utc};
use std::time::Duration;
use strategy_types::{Address, EthAmount};

/// Persistent credential for one venue, spec §3 "Exchange Secret": a key
/// (either a hex private key, or — in delegate mode — merely a user
/// wallet address), a network endpoint, and a last-updated timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueCredential {
    pub key: VenueKey,
    pub network_endpoint: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueKey {
    /// Direct mode: sign transactions with this hex-encoded private key.
    DirectPrivateKey(String),
    /// Delegate mode: the user whose custody balance the operator trades
    /// against. The operator's own signing key lives in
    /// [`ExecutorConfig::operator_private_key`], since it authorizes
    /// every delegate call regardless of which user it is made for.
    DelegateUser(Address),
}

/// Configuration surface consumed by the Trade Executor, spec §6's env
/// table narrowed to what Component C needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub custody_address: Option<Address>,
    pub operator_private_key: Option<String>,
    pub operator_address: Option<Address>,
    pub max_eth_per_trade: EthAmount,
    pub default_slippage_bps: u32,
    pub dry_run: bool,
    pub receipt_deadline: Duration,
}

impl ExecutorConfig {
    pub fn delegate_is_configured(&self, credential: &VenueCredential) -> bool {
        self.custody_address.is_some()
            && self.operator_private_key.is_some()
            && matches!(credential.key, VenueKey::DelegateUser(_))
    }
}
