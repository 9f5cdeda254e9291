use serde::{Deserialize, Serialize};

/// An expression inside a strategy program. Evaluation is async because
/// [`Expr::Price`] and [`Expr::Balance`] read through the capability
/// surface (spec §4.E.1); everything else is pure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Const(crate::program::Value),
    /// Looks up `PARAMS.<name>` (spec §4.E.2).
    Param(String),
    /// `api.getBalance(token)`, `token` itself an expression so a prior
    /// `Param` or `Const` address can feed it.
    Balance(Box<Expr>),
    /// `api.getPrice(pair)`.
    Price(Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}
