use std::result;

use itertools::Itertools;
use thiserror::Error;

use super::lexer::{Delimiter, Token};
use crate::value::{Number, Value};

/// Result binds the std::result::Result::Err type to this module's error type.
pub type Result<T> = result::Result<T, Error>;

static NIL_LITERAL: &str = "nil";
static TRUE_LITERAL: &str = "true";
static FALSE_LITERAL: &str = "false";

static KEYWORD_CHAR: char = ':';
static STRING_CHAR: char = '"';
static ESCAPE_CHAR: char = '\\';

#[derive(Debug, PartialEq, Clone, Error)]
pub enum Error {
    /// UnexpectedEndOfInput indicates a form was requested but the tokens ran
    /// out, e.g. on an empty input or a sequence that never closes.
    #[error("ran out of input while reading a form")]
    UnexpectedEndOfInput,
    /// UnbalancedDelimiter carries a closing character that has no matching
    /// opener at the point it was found.
    #[error("unbalanced `{0}` closes nothing that is open")]
    UnbalancedDelimiter(char),
    /// UnbalancedString carries the raw span of a quoted token that is
    /// unterminated or otherwise malformed.
    #[error("unbalanced string literal `{0}`")]
    UnbalancedString(String),
    #[error("map literal requires an even number of forms, found {0}")]
    OddMapLiteral(usize),
}

/// Reader is a cursor over lexed tokens; each call to `read_form` consumes
/// exactly the tokens of one form and produces its Value.
pub struct Reader<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
}

impl<'a> Reader<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn current(&self) -> Option<Token<'a>> {
        self.tokens.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.current();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    pub fn read_form(&mut self) -> Result<Value> {
        match self.advance().ok_or(Error::UnexpectedEndOfInput)? {
            Token::SpliceUnquote => self.read_wrapped(Value::SpliceUnquote),
            Token::Quote => self.read_wrapped(Value::Quote),
            Token::Quasiquote => self.read_wrapped(Value::Quasiquote),
            Token::Unquote => self.read_wrapped(Value::Unquote),
            Token::Deref => self.read_wrapped(Value::Deref),
            Token::WithMeta => self.read_wrapped(Value::WithMeta),
            Token::Open(Delimiter::Paren) => self.read_seq(Delimiter::Paren).map(Value::List),
            Token::Open(Delimiter::Bracket) => self.read_seq(Delimiter::Bracket).map(Value::Vector),
            Token::Open(Delimiter::Brace) => self.read_map(),
            Token::Close(delimiter) => Err(Error::UnbalancedDelimiter(delimiter.close_char())),
            Token::String(raw) => read_string(raw).map(Value::String),
            Token::Atom(token) => Ok(read_atom(token)),
        }
    }

    // each marker wraps exactly the single immediately-following form
    fn read_wrapped<C>(&mut self, constructor: C) -> Result<Value>
    where
        C: Fn(Box<Value>) -> Value,
    {
        self.read_form().map(|form| constructor(Box::new(form)))
    }

    fn read_seq(&mut self, delimiter: Delimiter) -> Result<Vec<Value>> {
        let mut forms = vec![];
        loop {
            match self.current().ok_or(Error::UnexpectedEndOfInput)? {
                Token::Close(found) if found == delimiter => {
                    self.advance();
                    return Ok(forms);
                }
                Token::Close(found) => return Err(Error::UnbalancedDelimiter(found.close_char())),
                _ => forms.push(self.read_form()?),
            }
        }
    }

    fn read_map(&mut self) -> Result<Value> {
        let forms = self.read_seq(Delimiter::Brace)?;
        if forms.len() % 2 != 0 {
            return Err(Error::OddMapLiteral(forms.len()));
        }
        Ok(Value::map_from_pairs(forms.into_iter().tuples()))
    }
}

/// read_atom classifies a bare token: numbers first, then the reserved
/// literals, then keywords, and everything else is a symbol.
fn read_atom(token: &str) -> Value {
    if is_number_candidate(token) {
        if let Ok(whole) = token.parse::<i64>() {
            return Value::Number(Number::Int(whole));
        }
        if let Ok(real) = token.parse::<f64>() {
            return Value::Number(Number::Float(real));
        }
    }

    match token {
        sym if sym == NIL_LITERAL => Value::Nil,
        sym if sym == TRUE_LITERAL => Value::Bool(true),
        sym if sym == FALSE_LITERAL => Value::Bool(false),
        keyword if keyword.starts_with(KEYWORD_CHAR) => {
            Value::Keyword(keyword[KEYWORD_CHAR.len_utf8()..].into())
        }
        symbol => Value::Symbol(symbol.trim().into()),
    }
}

// a numeric literal starts with a digit, or a sign/dot followed by a digit;
// this keeps words like `inf` and `nan` out of float parsing
fn is_number_candidate(token: &str) -> bool {
    let unsigned = match token.strip_prefix('+').or_else(|| token.strip_prefix('-')) {
        Some(rest) => rest,
        None => token,
    };
    unsigned.starts_with(|ch: char| ch.is_ascii_digit())
        || (unsigned.starts_with('.') && unsigned[1..].starts_with(|ch: char| ch.is_ascii_digit()))
}

/// read_string validates a raw quoted span and processes its escapes. The
/// lexer emits unterminated spans as tokens, so the closing quote is only
/// guaranteed here.
fn read_string(raw: &str) -> Result<String> {
    let rest = match raw.strip_prefix(STRING_CHAR) {
        Some(rest) => rest,
        None => return Err(Error::UnbalancedString(raw.into())),
    };

    let mut value = String::with_capacity(rest.len());
    let mut chars = rest.chars();
    let mut closed = false;
    while let Some(ch) = chars.next() {
        match ch {
            ch if ch == STRING_CHAR => {
                closed = true;
                break;
            }
            ch if ch == ESCAPE_CHAR => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some(escaped) => value.push(escaped),
                None => return Err(Error::UnbalancedString(raw.into())),
            },
            ch => value.push(ch),
        }
    }

    if closed && chars.next().is_none() {
        Ok(value)
    } else {
        Err(Error::UnbalancedString(raw.into()))
    }
}
