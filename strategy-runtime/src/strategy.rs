use crate::parameter::ParamSpec;
use crate::program::StrategyProgram;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strategy_ledger::StrategyId;
use strategy_types::StrategyStatus;

/// A chat turn kept alongside a draft strategy, spec §6 "persistence
/// surface ... user-driven persistence of draft strategies (name,
/// description, code, parameter defaults, dashboard spec, chat
/// history)". The runtime itself never reads this field; it is carried
/// through so the persistence surface has somewhere to put it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// The persistent definition of a strategy, spec §3 "Strategy" / §6's
/// persistence surface. `program` is `None` for a draft that has not
/// yet been compiled to an executable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: StrategyId,
    pub name: String,
    pub description: String,
    pub venue: String,
    pub status: StrategyStatus,
    pub program: Option<StrategyProgram>,
    pub param_specs: Vec<ParamSpec>,
    pub param_values: HashMap<String, String>,
    pub dashboard_spec: Option<serde_json::Value>,
    pub chat_history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Strategy {
    pub fn new(id: StrategyId, name: String, venue: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            description: String::new(),
            venue,
            status: StrategyStatus::Draft,
            program: None,
            param_specs: Vec::new(),
            param_values: HashMap::new(),
            dashboard_spec: None,
            chat_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
