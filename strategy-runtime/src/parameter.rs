use crate::error::RuntimeError;
use crate::schedule::{parse_interval, Schedule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strategy_types::Address;

/// One `@param name type default description` declaration, spec §4.E.2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub type_tag: String,
    pub default: String,
    pub description: String,
}

/// A coerced parameter value ready for the capability surface, spec
/// §4.E.2's type table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// `number`, `eth`, `usd`.
    Number(Decimal),
    Int(i64),
    /// `bps`, range-checked to `[0, 5000]` at coercion time.
    Bps(i64),
    /// `pct`, range-checked to `[0, 100]` at coercion time.
    Pct(Decimal),
    Bool(bool),
    Str(String),
    Address(Address),
    Interval(#[serde(skip)] ScheduleValue),
    Enum(String),
}

/// [`Schedule`] doesn't derive `Serialize`/`Deserialize` (it wraps
/// `std::time::Duration` deliberately, not a wire format); parameter rows
/// persist the raw declared string instead and re-parse it on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleValue(pub Option<Schedule>);

fn is_well_formed_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parses a `type` tag from a `@param` declaration, e.g. `enum[a|b|c]`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParamType {
    Number,
    Int,
    Bps,
    Pct,
    Boolean,
    String,
    Address,
    Pair,
    Token,
    Interval,
    Enum(Vec<String>),
}

fn parse_type_tag(tag: &str) -> Result<ParamType, RuntimeError> {
    let invalid = |reason: &str| RuntimeError::InvalidParameter {
        name: "type".to_string(),
        reason: reason.to_string(),
    };

    match tag {
        "number" | "eth" | "usd" => Ok(ParamType::Number),
        "int" => Ok(ParamType::Int),
        "bps" => Ok(ParamType::Bps),
        "pct" => Ok(ParamType::Pct),
        "boolean" => Ok(ParamType::Boolean),
        "string" => Ok(ParamType::String),
        "address" => Ok(ParamType::Address),
        "pair" => Ok(ParamType::Pair),
        "token" => Ok(ParamType::Token),
        "interval" => Ok(ParamType::Interval),
        _ if tag.starts_with("enum[") && tag.ends_with(']') => {
            let options: Vec<String> = tag[5..tag.len() - 1]
                .split('|')
                .map(str::to_string)
                .filter(|s| !s.is_empty())
                .collect();
            if options.is_empty() {
                return Err(invalid("enum[] declares no options"));
            }
            Ok(ParamType::Enum(options))
        }
        other => Err(invalid(&format!("unrecognized type tag '{other}'"))),
    }
}

/// Coerces `raw` (either the persisted parameter value or the declared
/// default) per spec §4.E.2's type table. Invalid defaults are refused at
/// load time — the run does not start (spec §8 property 10).
pub fn coerce(spec: &ParamSpec, raw: &str) -> Result<ParamValue, RuntimeError> {
    let invalid = |reason: String| RuntimeError::InvalidParameter {
        name: spec.name.clone(),
        reason,
    };

    match parse_type_tag(&spec.type_tag)? {
        ParamType::Number => {
            let value: f64 = raw
                .parse()
                .map_err(|_| invalid(format!("'{raw}' is not a number")))?;
            if !value.is_finite() {
                return Err(invalid(format!("'{raw}' is NaN or infinite")));
            }
            let decimal = Decimal::from_str(raw).map_err(|_| invalid(format!("'{raw}' is not a decimal")))?;
            Ok(ParamValue::Number(decimal))
        }
        ParamType::Int => raw
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|_| invalid(format!("'{raw}' is not a 64-bit integer"))),
        ParamType::Bps => {
            let value: i64 = raw.parse().map_err(|_| invalid(format!("'{raw}' is not an integer")))?;
            if !(0..=5000).contains(&value) {
                return Err(invalid(format!("{value} is outside [0, 5000]")));
            }
            Ok(ParamValue::Bps(value))
        }
        ParamType::Pct => {
            let value = Decimal::from_str(raw).map_err(|_| invalid(format!("'{raw}' is not a number")))?;
            if value < Decimal::ZERO || value > Decimal::from(100) {
                return Err(invalid(format!("{value} is outside [0, 100]")));
            }
            Ok(ParamValue::Pct(value))
        }
        ParamType::Boolean => match raw {
            "true" => Ok(ParamValue::Bool(true)),
            "false" => Ok(ParamValue::Bool(false)),
            _ => Err(invalid(format!("'{raw}' is not true|false"))),
        },
        ParamType::String => Ok(ParamValue::Str(raw.to_string())),
        ParamType::Address | ParamType::Pair | ParamType::Token => {
            if raw.is_empty() {
                return Ok(ParamValue::Str(String::new()));
            }
            if !is_well_formed_address(raw) {
                return Err(invalid(format!("'{raw}' is not a well-formed address")));
            }
            raw.parse::<Address>()
                .map(ParamValue::Address)
                .map_err(|e| invalid(e.to_string()))
        }
        ParamType::Interval => parse_interval(raw).map(|s| ParamValue::Interval(ScheduleValue(Some(s)))),
        ParamType::Enum(options) => {
            if options.iter().any(|opt| opt == raw) {
                Ok(ParamValue::Enum(raw.to_string()))
            } else {
                Err(invalid(format!("'{raw}' is not one of {options:?}")))
            }
        }
    }
}

/// Resolves every declared parameter: a persisted value if one exists,
/// otherwise the declared default — failing the whole load if either is
/// invalid (spec §4.E.2, §8 property 10).
pub fn resolve_parameters(
    specs: &[ParamSpec],
    persisted: &std::collections::HashMap<String, String>,
) -> Result<std::collections::HashMap<String, ParamValue>, RuntimeError> {
    specs
        .iter()
        .map(|spec| {
            let raw = persisted.get(&spec.name).unwrap_or(&spec.default);
            coerce(spec, raw).map(|value| (spec.name.clone(), value))
        })
        .collect()
}
