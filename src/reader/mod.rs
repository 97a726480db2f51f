mod lexer;
mod parser;

use crate::value::Value;

pub use self::lexer::{lex, Delimiter, Token};
pub use self::parser::{Error, Reader, Result};

/// read produces the first form contained in `input`.
pub fn read(input: &str) -> Result<Value> {
    let tokens = lexer::lex(input);

    let mut reader = Reader::new(&tokens);
    reader.read_form()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn can_read_expr() {
        let input = "(+ 2 3)";
        let expr = read(input).unwrap();
        assert_eq!(
            expr,
            Value::List(vec![
                Value::Symbol("+".into()),
                Value::Number(Number::Int(2)),
                Value::Number(Number::Int(3)),
            ])
        )
    }

    #[test]
    fn can_read_commented_expr() {
        let input = "(+ 2 ; a comment\n 3)";
        let expr = read(input).unwrap();
        assert_eq!(
            expr,
            Value::List(vec![
                Value::Symbol("+".into()),
                Value::Number(Number::Int(2)),
                Value::Number(Number::Int(3)),
            ])
        )
    }
}
