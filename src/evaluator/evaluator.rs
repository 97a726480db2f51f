use std::result;

use itertools::Itertools;
use thiserror::Error;

use super::env::Environment;
use crate::value::{CallError, Value};

static DEF_SYMBOL: &str = "def!";
static LET_SYMBOL: &str = "let*";

/// Result binds the std::result::Result::Err type to this module's error type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, PartialEq, Clone, Error)]
pub enum Error {
    #[error("symbol `{0}` is unbound")]
    UnboundSymbol(String),
    /// BindingArity carries the number of forms found where name/value pairs
    /// were required.
    #[error("bindings must come in name/value pairs, found {0} form(s)")]
    BindingArity(usize),
    #[error("bindings must be a list or vector of symbol/value pairs, found `{0}`")]
    MalformedBindings(Value),
    #[error("`{0}` cannot be applied as a function")]
    NotCallable(Value),
    #[error(transparent)]
    Call(#[from] CallError),
}

/// eval recursively evaluates `form` against `env`. The environment handed
/// back is how a top-level `def!` reaches subsequent evaluations; every other
/// construct returns the environment it was given.
pub fn eval(form: &Value, env: &Environment) -> Result<(Value, Environment)> {
    let result = match form {
        Value::Symbol(name) => eval_symbol(name, env)?,
        Value::List(forms) => return eval_list(forms, env),
        // elements see the original environment; their effects do not escape
        Value::Vector(forms) => {
            let results = forms
                .iter()
                .map(|form| eval(form, env).map(|(value, _)| value))
                .collect::<Result<Vec<_>>>()?;
            Value::Vector(results)
        }
        // values are evaluated, keys are not
        Value::Map(entries) => {
            let results = entries
                .iter()
                .map(|(key, value)| eval(value, env).map(|(value, _)| (key.clone(), value)))
                .collect::<Result<Vec<_>>>()?;
            Value::Map(results)
        }
        literal => literal.clone(),
    };
    Ok((result, env.clone()))
}

fn eval_symbol(symbol: &str, env: &Environment) -> Result<Value> {
    env.get(symbol)
        .ok_or_else(|| Error::UnboundSymbol(symbol.into()))
}

fn eval_list(forms: &[Value], env: &Environment) -> Result<(Value, Environment)> {
    match forms.split_first() {
        // an empty list self-evaluates; it is never applied
        None => Ok((Value::List(vec![]), env.clone())),
        Some((head, rest)) => match head {
            Value::Symbol(op) if op == DEF_SYMBOL => match rest.first() {
                Some(Value::Symbol(name)) => eval_def(name, &rest[1..], env),
                _ => eval_application(head, rest, env),
            },
            Value::Symbol(op) if op == LET_SYMBOL => eval_let(rest, env),
            _ => eval_application(head, rest, env),
        },
    }
}

// (def! <name> <form>); the only form whose binding outlives the call
fn eval_def(name: &str, forms: &[Value], env: &Environment) -> Result<(Value, Environment)> {
    let form = forms.first().ok_or(Error::BindingArity(1))?;
    let (value, env) = eval(form, env)?;
    let bound = env.set(name, value.clone());
    Ok((value, bound))
}

// (let* (<name> <form> ...) <body>); bindings are scoped to the body and
// never leak to the caller
fn eval_let(forms: &[Value], env: &Environment) -> Result<(Value, Environment)> {
    let bindings = forms.first().ok_or(Error::BindingArity(0))?;
    let pairs = match bindings {
        Value::List(forms) | Value::Vector(forms) => forms,
        other => return Err(Error::MalformedBindings(other.clone())),
    };
    if pairs.len() % 2 != 0 {
        return Err(Error::BindingArity(pairs.len()));
    }

    // each binding expression sees every binding before it
    let mut scope = env.child();
    for (name, form) in pairs.iter().tuples() {
        let name = match name {
            Value::Symbol(name) => name,
            other => return Err(Error::MalformedBindings(other.clone())),
        };
        let (value, _) = eval(form, &scope)?;
        scope = scope.set(name, value);
    }

    let result = match forms.get(1) {
        Some(body) => eval(body, &scope)?.0,
        None => Value::Nil,
    };
    Ok((result, env.clone()))
}

fn eval_application(head: &Value, rest: &[Value], env: &Environment) -> Result<(Value, Environment)> {
    let (op, env) = eval(head, env)?;
    let callable = match op {
        Value::Callable(callable) => callable,
        other => return Err(Error::NotCallable(other)),
    };

    // arguments see the environment the head produced; their own effects are
    // discarded
    let args = rest
        .iter()
        .map(|arg| eval(arg, &env).map(|(value, _)| value))
        .collect::<Result<Vec<_>>>()?;

    let result = callable.apply(&args)?;
    Ok((result, env))
}
