pub mod evaluator;
pub mod printer;
pub mod reader;
pub mod repl;
pub mod value;

use thiserror::Error;

pub use self::evaluator::{eval, Environment};
pub use self::printer::to_literal;
pub use self::reader::read;
pub use self::value::Value;

/// Error unifies the reader and evaluator failures at the crate boundary so a
/// caller can match on the kind of failure.
#[derive(Debug, PartialEq, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] reader::Error),
    #[error(transparent)]
    Eval(#[from] evaluator::Error),
}

/// interpret reads the first form in `input` and evaluates it against `env`,
/// yielding the result alongside the environment subsequent evaluations
/// should use.
pub fn interpret(input: &str, env: &Environment) -> Result<(Value, Environment), Error> {
    let form = reader::read(input)?;
    let (value, env) = evaluator::eval(&form, env)?;
    Ok((value, env))
}
