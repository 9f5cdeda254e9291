use crate::capability::StrategyApi;
use crate::error::RuntimeError;
use crate::log::LogLevel;
use crate::parameter::ParamValue;
use crate::program::expr::{BinOp, Expr};
use crate::program::instruction::Instruction;
use crate::program::value::Value;
use futures::future::BoxFuture;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strategy_types::Address;

/// The declarative strategy program, spec §9: a closed sequence of
/// operations over the capability surface, replacing the source's
/// dynamically evaluated, text-blocklisted user code with a structure
/// that can only ever reach [`StrategyApi`]'s methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyProgram {
    pub instructions: Vec<Instruction>,
}

impl StrategyProgram {
    /// Runs one tick: executes every instruction in order, evaluating
    /// conditionals inline. Returns once the top-level instruction list
    /// is exhausted — the caller (the Runtime host) then consults
    /// [`StrategyApi::take_schedule`] to decide whether to arm a timer.
    pub async fn run(&self, api: &StrategyApi, params: &HashMap<String, ParamValue>) -> Result<(), RuntimeError> {
        run_block(&self.instructions, api, params).await
    }
}

fn run_block<'a>(
    instructions: &'a [Instruction],
    api: &'a StrategyApi,
    params: &'a HashMap<String, ParamValue>,
) -> BoxFuture<'a, Result<(), RuntimeError>> {
    Box::pin(async move {
        for instruction in instructions {
            run_instruction(instruction, api, params).await?;
        }
        Ok(())
    })
}

fn run_instruction<'a>(
    instruction: &'a Instruction,
    api: &'a StrategyApi,
    params: &'a HashMap<String, ParamValue>,
) -> BoxFuture<'a, Result<(), RuntimeError>> {
    Box::pin(async move {
        match instruction {
            Instruction::Buy { pair, eth_amount } => {
                let pair = eval_address(pair, api, params).await?;
                let amount = eval_decimal(eth_amount, api, params).await?;
                api.buy(&pair, amount).await?;
                Ok(())
            }
            Instruction::Sell { pair, token_amount } => {
                let pair = eval_address(pair, api, params).await?;
                let amount = eval_decimal(token_amount, api, params).await?;
                api.sell(&pair, amount).await?;
                Ok(())
            }
            Instruction::Log { message } => {
                let value = eval(message, api, params).await?;
                api.log(LogLevel::Info, value.display()).await;
                Ok(())
            }
            Instruction::Schedule { interval } => {
                let value = eval(interval, api, params).await?;
                let schedule = match value {
                    Value::Str(s) => crate::schedule::parse_interval(&s)?,
                    _ => {
                        return Err(RuntimeError::UserCode(
                            "schedule(...) requires a string interval".to_string(),
                        ))
                    }
                };
                api.schedule(schedule).await;
                Ok(())
            }
            Instruction::If { cond, then_branch, else_branch } => {
                if eval_bool(cond, api, params).await? {
                    run_block(then_branch, api, params).await
                } else {
                    run_block(else_branch, api, params).await
                }
            }
        }
    })
}

fn eval<'a>(
    expr: &'a Expr,
    api: &'a StrategyApi,
    params: &'a HashMap<String, ParamValue>,
) -> BoxFuture<'a, Result<Value, RuntimeError>> {
    Box::pin(async move {
        match expr {
            Expr::Const(value) => Ok(value.clone()),
            Expr::Param(name) => param_to_value(name, params),
            Expr::Balance(token) => {
                let token = eval_address(token, api, params).await?;
                let balance = api.get_balance(&token).await?;
                Ok(Value::Decimal(balance))
            }
            Expr::Price(pair) => {
                let pair = eval_address(pair, api, params).await?;
                let price = api.get_price(&pair).await?;
                Ok(Value::Decimal(price))
            }
            Expr::BinOp(op, lhs, rhs) => {
                let lhs = eval(lhs, api, params).await?;
                let rhs = eval(rhs, api, params).await?;
                eval_binop(*op, lhs, rhs)
            }
        }
    })
}

fn param_to_value(name: &str, params: &HashMap<String, ParamValue>) -> Result<Value, RuntimeError> {
    let value = params.get(name).ok_or_else(|| {
        RuntimeError::UserCode(format!("unknown parameter '{name}'"))
    })?;
    Ok(match value {
        ParamValue::Number(d) | ParamValue::Pct(d) => Value::Decimal(*d),
        ParamValue::Int(i) | ParamValue::Bps(i) => Value::Int(*i),
        ParamValue::Bool(b) => Value::Bool(*b),
        ParamValue::Str(s) | ParamValue::Enum(s) => Value::Str(s.clone()),
        ParamValue::Address(a) => Value::Address(a.clone()),
        ParamValue::Interval(_) => Value::Str(String::new()),
    })
}

fn eval_binop(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let type_error = || RuntimeError::UserCode("binary operator applied to incompatible operands".to_string());

    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
            let (l, r) = (lhs.as_decimal().ok_or_else(type_error)?, rhs.as_decimal().ok_or_else(type_error)?);
            let result = match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => {
                    if r == Decimal::ZERO {
                        return Err(RuntimeError::UserCode("division by zero".to_string()));
                    }
                    l / r
                }
                _ => unreachable!(),
            };
            Ok(Value::Decimal(result))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let (l, r) = (lhs.as_decimal().ok_or_else(type_error)?, rhs.as_decimal().ok_or_else(type_error)?);
            let result = match op {
                BinOp::Lt => l < r,
                BinOp::Le => l <= r,
                BinOp::Gt => l > r,
                BinOp::Ge => l >= r,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        BinOp::Eq => Ok(Value::Bool(lhs == rhs)),
    }
}

async fn eval_decimal(expr: &Expr, api: &StrategyApi, params: &HashMap<String, ParamValue>) -> Result<Decimal, RuntimeError> {
    eval(expr, api, params)
        .await?
        .as_decimal()
        .ok_or_else(|| RuntimeError::UserCode("expected a numeric value".to_string()))
}

async fn eval_bool(expr: &Expr, api: &StrategyApi, params: &HashMap<String, ParamValue>) -> Result<bool, RuntimeError> {
    eval(expr, api, params)
        .await?
        .as_bool()
        .ok_or_else(|| RuntimeError::UserCode("expected a boolean value".to_string()))
}

async fn eval_address(expr: &Expr, api: &StrategyApi, params: &HashMap<String, ParamValue>) -> Result<Address, RuntimeError> {
    match eval(expr, api, params).await? {
        Value::Address(a) => Ok(a),
        Value::Str(s) => s.parse().map_err(|_| RuntimeError::UserCode(format!("'{s}' is not an address"))),
        _ => Err(RuntimeError::UserCode("expected an address value".to_string())),
    }
}
