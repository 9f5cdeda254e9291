//! Disk-backed persistence for the strategy registry: a user-driven
//! store of draft and active strategies, keyed by id.
//! The Ledger's run/trade history is kept process-lifetime only — see
//! `DESIGN.md` for why that boundary was drawn here rather than
//! extending `strategy_ledger::Ledger` with its own snapshot format.

use crate::error::CoreError;
use std::path::Path;
use strategy_runtime::{RuntimeHost, Strategy};

pub async fn load(path: &Path) -> Result<Vec<Strategy>, CoreError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).map_err(|e| CoreError::Config(format!("parsing {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(CoreError::Config(format!("reading {}: {e}", path.display()))),
    }
}

pub async fn save(path: &Path, host: &RuntimeHost) -> Result<(), CoreError> {
    let strategies = host.all_strategies().await;
    let raw = serde_json::to_string_pretty(&strategies).expect("Strategy always serializes");
    std::fs::write(path, raw).map_err(|e| CoreError::Config(format!("writing {}: {e}", path.display())))
}
