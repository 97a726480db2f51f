use std::result;

use super::env::Environment;
use crate::value::{CallError, Callable, HostFn, Number, Value};

type Result<T> = result::Result<T, CallError>;

fn numbers(args: &[Value]) -> Result<Vec<Number>> {
    args.iter()
        .map(|arg| match arg {
            Value::Number(number) => Ok(*number),
            other => Err(CallError::ExpectedNumber(other.clone())),
        })
        .collect()
}

fn add(args: &[Value]) -> Result<Value> {
    let total = numbers(args)?.into_iter().fold(Number::Int(0), Number::add);
    Ok(Value::Number(total))
}

fn mul(args: &[Value]) -> Result<Value> {
    let product = numbers(args)?.into_iter().fold(Number::Int(1), Number::mul);
    Ok(Value::Number(product))
}

fn sub(args: &[Value]) -> Result<Value> {
    let args = numbers(args)?;
    match args.split_first() {
        None => Err(CallError::WrongArity(1, 0)),
        // (- x) negates
        Some((&first, [])) => Ok(Value::Number(Number::Int(0).sub(first))),
        Some((&first, rest)) => {
            let difference = rest.iter().fold(first, |acc, &next| acc.sub(next));
            Ok(Value::Number(difference))
        }
    }
}

fn div(args: &[Value]) -> Result<Value> {
    let args = numbers(args)?;
    match args.split_first() {
        None => Err(CallError::WrongArity(1, 0)),
        // (/ x) is the reciprocal
        Some((&first, [])) => Number::Int(1).div(first).map(Value::Number),
        Some((&first, rest)) => {
            let mut quotient = first;
            for &divisor in rest {
                quotient = quotient.div(divisor)?;
            }
            Ok(Value::Number(quotient))
        }
    }
}

static PRELUDE_BINDINGS: &[(&str, HostFn)] = &[("+", add), ("-", sub), ("*", mul), ("/", div)];

/// env builds the root environment, seeded once with the arithmetic
/// primitives before any user evaluation begins.
pub fn env() -> Environment {
    PRELUDE_BINDINGS
        .iter()
        .fold(Environment::new(), |env, (name, func)| {
            env.set(name, Value::Callable(Callable::named(*name, *func)))
        })
}
