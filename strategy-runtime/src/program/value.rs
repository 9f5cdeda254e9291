use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strategy_types::Address;

/// A runtime value inside the strategy-program interpreter, spec §9
/// "declarative strategy program". Deliberately small and closed: there
/// is no callable value, so a program can never reach outside the
/// capability surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Decimal(Decimal),
    Int(i64),
    Bool(bool),
    Str(String),
    Address(Address),
    Unit,
}

impl Value {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            Value::Int(i) => Some(Decimal::from(*i)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Value::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Renders a value the way [`strategy_execution::TradeIntent::amount`]
    /// expects it: a decimal literal, not scientific notation or a
    /// locale-specific format.
    pub fn to_amount_string(&self) -> Option<String> {
        self.as_decimal().map(|d| d.normalize().to_string())
    }

    pub fn display(&self) -> String {
        match self {
            Value::Decimal(d) => d.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => s.clone(),
            Value::Address(a) => a.to_string(),
            Value::Unit => "()".to_string(),
        }
    }
}
