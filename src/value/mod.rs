use std::fmt;
use std::result;

use itertools::Itertools;
use thiserror::Error;

use crate::reader::Delimiter;

/// Value is the closed set of runtime data kinds. Everything the reader
/// produces and the evaluator consumes is one of these variants.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(Number),
    String(String),
    Symbol(String),
    Keyword(String),
    Char(char),
    List(Vec<Value>),
    Vector(Vec<Value>),
    /// Map holds key/value entries, unique by structural key equality, in
    /// insertion order.
    Map(Vec<(Value, Value)>),
    Quote(Box<Value>),
    Quasiquote(Box<Value>),
    Unquote(Box<Value>),
    SpliceUnquote(Box<Value>),
    Deref(Box<Value>),
    WithMeta(Box<Value>),
    Callable(Callable),
}

impl Value {
    /// map_from_pairs builds a Map, keeping the first occurrence of a key in
    /// place and letting a later duplicate replace its value.
    pub fn map_from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut entries: Vec<(Value, Value)> = vec![];
        for (key, value) in pairs {
            match entries.iter().position(|(existing, _)| *existing == key) {
                Some(index) => entries[index].1 = value,
                None => entries.push((key, value)),
            }
        }
        Value::Map(entries)
    }

    fn fmt_seq<'a>(
        f: &mut fmt::Formatter,
        nodes: impl IntoIterator<Item = &'a Value>,
        delimiter: Delimiter,
    ) -> fmt::Result {
        write!(f, "{}", delimiter.open_char())?;
        write!(f, "{}", nodes.into_iter().format(" "))?;
        write!(f, "{}", delimiter.close_char())
    }

    fn fmt_string(f: &mut fmt::Formatter, value: &str) -> fmt::Result {
        write!(f, "\"")?;
        for ch in value.chars() {
            match ch {
                '"' => write!(f, "\\\"")?,
                '\\' => write!(f, "\\\\")?,
                '\n' => write!(f, "\\n")?,
                '\t' => write!(f, "\\t")?,
                '\r' => write!(f, "\\r")?,
                ch => write!(f, "{}", ch)?,
            }
        }
        write!(f, "\"")
    }
}

/// Display renders the canonical literal form; reading it back yields a value
/// that prints identically.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Value::*;

        match self {
            Nil => write!(f, "nil"),
            Bool(b) => write!(f, "{}", b),
            Number(n) => write!(f, "{}", n),
            String(s) => Value::fmt_string(f, s),
            Symbol(s) => write!(f, "{}", s),
            Keyword(k) => write!(f, ":{}", k),
            Char(c) => write!(f, "{}", c),
            List(nodes) => Value::fmt_seq(f, nodes, Delimiter::Paren),
            Vector(nodes) => Value::fmt_seq(f, nodes, Delimiter::Bracket),
            Map(entries) => {
                write!(f, "{}", Delimiter::Brace.open_char())?;
                write!(
                    f,
                    "{}",
                    entries
                        .iter()
                        .format_with(" ", |(key, value), f| f(&format_args!("{} {}", key, value)))
                )?;
                write!(f, "{}", Delimiter::Brace.close_char())
            }
            Quote(form) => write!(f, "(quote {})", form),
            Quasiquote(form) => write!(f, "(quasiquote {})", form),
            Unquote(form) => write!(f, "(unquote {})", form),
            SpliceUnquote(form) => write!(f, "(splice-unquote {})", form),
            Deref(form) => write!(f, "(deref {})", form),
            WithMeta(form) => write!(f, "(with-meta {})", form),
            Callable(callable) => match callable.name() {
                Some(name) => write!(f, "#<fn {}>", name),
                None => write!(f, "#<fn>"),
            },
        }
    }
}

/// Number keeps integral and floating representations distinct; arithmetic
/// promotes to Float whenever either side is a Float or an i64 operation
/// overflows.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    pub fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Number::Int(lhs), Number::Int(rhs)) => lhs
                .checked_add(rhs)
                .map(Number::Int)
                .unwrap_or_else(|| Number::Float(lhs as f64 + rhs as f64)),
            (lhs, rhs) => Number::Float(lhs.as_f64() + rhs.as_f64()),
        }
    }

    pub fn sub(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Number::Int(lhs), Number::Int(rhs)) => lhs
                .checked_sub(rhs)
                .map(Number::Int)
                .unwrap_or_else(|| Number::Float(lhs as f64 - rhs as f64)),
            (lhs, rhs) => Number::Float(lhs.as_f64() - rhs.as_f64()),
        }
    }

    pub fn mul(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Number::Int(lhs), Number::Int(rhs)) => lhs
                .checked_mul(rhs)
                .map(Number::Int)
                .unwrap_or_else(|| Number::Float(lhs as f64 * rhs as f64)),
            (lhs, rhs) => Number::Float(lhs.as_f64() * rhs.as_f64()),
        }
    }

    /// div truncates for integral operands and follows IEEE for floats.
    pub fn div(self, rhs: Self) -> result::Result<Self, CallError> {
        match (self, rhs) {
            (Number::Int(_), Number::Int(0)) => Err(CallError::DivisionByZero),
            (Number::Int(lhs), Number::Int(rhs)) => Ok(lhs
                .checked_div(rhs)
                .map(Number::Int)
                .unwrap_or_else(|| Number::Float(lhs as f64 / rhs as f64))),
            (lhs, rhs) => Ok(Number::Float(lhs.as_f64() / rhs.as_f64())),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            // keep a fractional marker so the literal re-reads as a Float
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// HostFn is the signature shared by every primitive registered in the root
/// environment.
pub type HostFn = fn(&[Value]) -> result::Result<Value, CallError>;

/// Callable is the one capability the evaluator needs from a function value:
/// apply it to an ordered argument list.
#[derive(Debug, PartialEq, Clone)]
pub struct Callable {
    name: Option<String>,
    func: HostFn,
}

impl Callable {
    pub fn named(name: impl Into<String>, func: HostFn) -> Self {
        Self {
            name: Some(name.into()),
            func,
        }
    }

    pub fn anonymous(func: HostFn) -> Self {
        Self { name: None, func }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn apply(&self, args: &[Value]) -> result::Result<Value, CallError> {
        (self.func)(args)
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum CallError {
    #[error("expected a number, found `{0}`")]
    ExpectedNumber(Value),
    /// WrongArity reports a callable invoked with fewer arguments than it
    /// accepts.
    // (number_required, number_provided)
    #[error("expected at least {0} argument(s), found {1}")]
    WrongArity(usize, usize),
    #[error("division by zero")]
    DivisionByZero,
}
