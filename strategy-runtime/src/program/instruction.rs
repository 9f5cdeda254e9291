use crate::program::Expr;
use serde::{Deserialize, Serialize};

/// One step of a strategy program, spec §9: a closed, structural stand-in
/// for the source's free-form generated code. Every side effect an
/// instruction can cause routes through the capability surface; there is
/// no instruction that reaches outside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Buy { pair: Expr, eth_amount: Expr },
    Sell { pair: Expr, token_amount: Expr },
    Log { message: Expr },
    /// `api.schedule(interval)`, spec §4.E.1. A program with no reachable
    /// `Schedule` on its final branch ends the Run after this tick.
    Schedule { interval: Expr },
    If {
        cond: Expr,
        then_branch: Vec<Instruction>,
        else_branch: Vec<Instruction>,
    },
}
