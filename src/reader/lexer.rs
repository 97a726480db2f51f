use std::collections::HashSet;
use std::iter;
use std::str;

use lazy_static::lazy_static;

const OPEN_PAREN: char = '(';
const CLOSE_PAREN: char = ')';
const OPEN_BRACKET: char = '[';
const CLOSE_BRACKET: char = ']';
const OPEN_BRACE: char = '{';
const CLOSE_BRACE: char = '}';
const COMMENT_CHAR: char = ';';
const STRING_CHAR: char = '"';
const NEWLINE_CHAR: char = '\n';
const ESCAPE_CHAR: char = '\\';
const QUOTE_CHAR: char = '\'';
const QUASIQUOTE_CHAR: char = '`';
const UNQUOTE_CHAR: char = '~';
const DEREF_CHAR: char = '@';
const META_CHAR: char = '^';
const SEPARATOR_CHAR: char = ',';

lazy_static! {
    /// ATOM_TERMINATORS are characters that end a bare atom run. Note that
    /// `~`, `@` and `^` are absent: they only open tokens, and inside an atom
    /// they are ordinary characters.
    static ref ATOM_TERMINATORS: HashSet<char> = {
        let mut set = HashSet::new();

        set.insert(OPEN_PAREN);
        set.insert(CLOSE_PAREN);
        set.insert(OPEN_BRACKET);
        set.insert(CLOSE_BRACKET);
        set.insert(OPEN_BRACE);
        set.insert(CLOSE_BRACE);
        set.insert(COMMENT_CHAR);
        set.insert(STRING_CHAR);
        set.insert(QUOTE_CHAR);
        set.insert(QUASIQUOTE_CHAR);
        set.insert(SEPARATOR_CHAR);

        set
    };
}

/// lex is a convenience function to take some `input` and produce the
/// resulting `Vec<Token>`. Whitespace, commas and comments are discarded;
/// every other span of the input lands in exactly one token, in order.
pub fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Token represents an atomic component of this language's syntax. Tokens
/// borrow their text from the input they were lexed from.
pub enum Token<'input> {
    Open(Delimiter),
    Close(Delimiter),
    /// SpliceUnquote is the two-character `~@` unit.
    SpliceUnquote,
    Quote,
    Quasiquote,
    Unquote,
    Deref,
    WithMeta,
    /// String carries the raw quoted span, escapes untouched. The closing
    /// quote may be missing; the reader decides whether the span is valid.
    String(&'input str),
    /// Atom covers every maximal run of non-delimiter characters: numbers,
    /// symbols, keywords and the nil/bool literals.
    Atom(&'input str),
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Delimiter {
    Paren,   // ()
    Bracket, // []
    Brace,   // {}
}

impl Delimiter {
    pub fn open_char(self) -> char {
        use self::Delimiter::*;

        match self {
            Paren => OPEN_PAREN,
            Bracket => OPEN_BRACKET,
            Brace => OPEN_BRACE,
        }
    }

    pub fn close_char(self) -> char {
        use self::Delimiter::*;

        match self {
            Paren => CLOSE_PAREN,
            Bracket => CLOSE_BRACKET,
            Brace => CLOSE_BRACE,
        }
    }
}

/// Lexer contains the logic to lex individual tokens from the input source.
#[derive(Debug)]
pub struct Lexer<'input> {
    input: &'input str,
    iter: iter::Peekable<str::CharIndices<'input>>,
}

impl<'input> Lexer<'input> {
    /// new constructs a Lexer instance from the input but does not do any
    /// lexing.
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            iter: input.char_indices().peekable(),
        }
    }

    /// advance_if advances the state of the lexer while the upcoming chars
    /// satisfy the `predicate`. Returns the byte span in the `input` that was
    /// advanced over; returns None if no char matched.
    fn advance_if<P>(&mut self, predicate: P) -> Option<(usize, usize)>
    where
        P: Fn(char) -> bool,
    {
        let (start, first) = match self.peek() {
            Some(&(_, ch)) if predicate(ch) => self.consume().unwrap(),
            _ => return None,
        };
        let mut end = start + first.len_utf8();

        while self.peek().map_or(false, |&(_, ch)| predicate(ch)) {
            let (index, ch) = self.consume().unwrap();
            end = index + ch.len_utf8();
        }

        Some((start, end))
    }

    /// consume advances the state of the lexer to the next char, yielding an
    /// Option of the current char from the input source
    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }

    /// peek returns the next element in the iterator without consuming it
    fn peek(&mut self) -> Option<&(usize, char)> {
        self.iter.peek()
    }

    /// take_while advances the input while `predicate` is true and then
    /// returns a str slice of the traversed span.
    fn take_while<P>(&mut self, predicate: P) -> Option<&'input str>
    where
        P: Fn(char) -> bool,
    {
        self.advance_if(predicate)
            .map(|(start, end)| &self.input[start..end])
    }

    fn consume_delimiter<T>(&mut self, token: T, delimiter: Delimiter) -> Token<'input>
    where
        T: Fn(Delimiter) -> Token<'input>,
    {
        self.consume();
        token(delimiter)
    }

    fn consume_marker(&mut self, token: Token<'input>) -> Token<'input> {
        self.consume();
        token
    }

    // `~@` lexes as one unit; a lone `~` is an unquote
    fn consume_unquote(&mut self) -> Token<'input> {
        self.consume();
        match self.peek() {
            Some(&(_, DEREF_CHAR)) => {
                self.consume();
                Token::SpliceUnquote
            }
            _ => Token::Unquote,
        }
    }

    // lex a quoted span up to the next unescaped `"`, or to the end of the
    // input when the span never closes; validity is the reader's concern
    fn consume_string(&mut self) -> Token<'input> {
        let (start, opening) = self.consume().unwrap();
        let mut end = start + opening.len_utf8();

        while let Some((index, ch)) = self.consume() {
            end = index + ch.len_utf8();
            match ch {
                ESCAPE_CHAR => {
                    if let Some((index, ch)) = self.consume() {
                        end = index + ch.len_utf8();
                    }
                }
                STRING_CHAR => break,
                _ => {}
            }
        }

        Token::String(&self.input[start..end])
    }

    fn skip_comment(&mut self) {
        self.advance_if(|ch| ch != NEWLINE_CHAR);
    }

    fn is_atom_char(ch: char) -> bool {
        !Lexer::is_separator(ch) && !ATOM_TERMINATORS.contains(&ch)
    }

    fn consume_atom(&mut self) -> Token<'input> {
        // the caller peeked an atom char, so the run is non-empty
        self.take_while(Lexer::is_atom_char).map(Token::Atom).unwrap()
    }

    fn is_separator(ch: char) -> bool {
        ch.is_whitespace() || ch == SEPARATOR_CHAR
    }
}

impl<'a> iter::Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.advance_if(Lexer::is_separator);

            let next_token = match self.peek() {
                None => return None,
                // The order is important here
                Some(&(_, COMMENT_CHAR)) => {
                    self.skip_comment();
                    continue;
                }
                Some(&(_, UNQUOTE_CHAR)) => self.consume_unquote(),
                Some(&(_, QUOTE_CHAR)) => self.consume_marker(Token::Quote),
                Some(&(_, QUASIQUOTE_CHAR)) => self.consume_marker(Token::Quasiquote),
                Some(&(_, DEREF_CHAR)) => self.consume_marker(Token::Deref),
                Some(&(_, META_CHAR)) => self.consume_marker(Token::WithMeta),
                Some(&(_, OPEN_PAREN)) => self.consume_delimiter(Token::Open, Delimiter::Paren),
                Some(&(_, CLOSE_PAREN)) => self.consume_delimiter(Token::Close, Delimiter::Paren),
                Some(&(_, OPEN_BRACKET)) => self.consume_delimiter(Token::Open, Delimiter::Bracket),
                Some(&(_, CLOSE_BRACKET)) => {
                    self.consume_delimiter(Token::Close, Delimiter::Bracket)
                }
                Some(&(_, OPEN_BRACE)) => self.consume_delimiter(Token::Open, Delimiter::Brace),
                Some(&(_, CLOSE_BRACE)) => self.consume_delimiter(Token::Close, Delimiter::Brace),
                Some(&(_, STRING_CHAR)) => self.consume_string(),
                Some(_) => self.consume_atom(),
            };
            return Some(next_token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_lex_test(input: &str, expected_tokens: Vec<Token>) {
        let tokens = lex(input);
        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    fn can_lex_parens() {
        let input = "()";
        let expected_tokens = vec![
            Token::Open(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);

        let input = "   ()  )";
        let expected_tokens = vec![
            Token::Open(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);

        let input = "((()))";
        let expected_tokens = vec![
            Token::Open(Delimiter::Paren),
            Token::Open(Delimiter::Paren),
            Token::Open(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_lex_delimiters() {
        let input = "([{{])";
        let expected_tokens = vec![
            Token::Open(Delimiter::Paren),
            Token::Open(Delimiter::Bracket),
            Token::Open(Delimiter::Brace),
            Token::Open(Delimiter::Brace),
            Token::Close(Delimiter::Bracket),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);

        let input = "  2  ([{{]) 222";
        let expected_tokens = vec![
            Token::Atom("2"),
            Token::Open(Delimiter::Paren),
            Token::Open(Delimiter::Bracket),
            Token::Open(Delimiter::Brace),
            Token::Open(Delimiter::Brace),
            Token::Close(Delimiter::Bracket),
            Token::Close(Delimiter::Paren),
            Token::Atom("222"),
        ];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_lex_atoms() {
        let input = "abcdef";
        let expected_tokens = vec![Token::Atom("abcdef")];
        run_lex_test(input, expected_tokens);

        let input = "+ abc -12 2.5";
        let expected_tokens = vec![
            Token::Atom("+"),
            Token::Atom("abc"),
            Token::Atom("-12"),
            Token::Atom("2.5"),
        ];
        run_lex_test(input, expected_tokens);

        let input = "hi, there";
        let expected_tokens = vec![Token::Atom("hi"), Token::Atom("there")];
        run_lex_test(input, expected_tokens);

        let input = ":a nil true false";
        let expected_tokens = vec![
            Token::Atom(":a"),
            Token::Atom("nil"),
            Token::Atom("true"),
            Token::Atom("false"),
        ];
        run_lex_test(input, expected_tokens);

        // marker characters inside a run belong to the atom
        let input = "a~b c@d e^f";
        let expected_tokens = vec![
            Token::Atom("a~b"),
            Token::Atom("c@d"),
            Token::Atom("e^f"),
        ];
        run_lex_test(input, expected_tokens);

        let input = "héllo";
        let expected_tokens = vec![Token::Atom("héllo")];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_lex_strings() {
        let input = r#""hi there""#;
        let expected_tokens = vec![Token::String(r#""hi there""#)];
        run_lex_test(input, expected_tokens);

        let input = r#""""#;
        let expected_tokens = vec![Token::String(r#""""#)];
        run_lex_test(input, expected_tokens);

        let input = r#""hi, there" "hello world" "#;
        let expected_tokens = vec![
            Token::String(r#""hi, there""#),
            Token::String(r#""hello world""#),
        ];
        run_lex_test(input, expected_tokens);

        let input = r#"()"hi there"123]"#;
        let expected_tokens = vec![
            Token::Open(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
            Token::String(r#""hi there""#),
            Token::Atom("123"),
            Token::Close(Delimiter::Bracket),
        ];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_lex_escaped_strings() {
        let input = r#""say \"hi\"""#;
        let expected_tokens = vec![Token::String(r#""say \"hi\"""#)];
        run_lex_test(input, expected_tokens);

        let input = r#""tab\there" next"#;
        let expected_tokens = vec![Token::String(r#""tab\there""#), Token::Atom("next")];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_lex_unterminated_strings() {
        // validity is not this layer's concern; the span still becomes a token
        let input = r#""hi there"#;
        let expected_tokens = vec![Token::String(r#""hi there"#)];
        run_lex_test(input, expected_tokens);

        let input = r#"""#;
        let expected_tokens = vec![Token::String(r#"""#)];
        run_lex_test(input, expected_tokens);

        let input = r#"abc "hi"#;
        let expected_tokens = vec![Token::Atom("abc"), Token::String(r#""hi"#)];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_skip_comments() {
        let input = "233     ; abcdef";
        let expected_tokens = vec![Token::Atom("233")];
        run_lex_test(input, expected_tokens);

        let input = "233 ; abcdef\n123 456() ; hi";
        let expected_tokens = vec![
            Token::Atom("233"),
            Token::Atom("123"),
            Token::Atom("456"),
            Token::Open(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);

        let input = "; only a comment";
        run_lex_test(input, vec![]);
    }

    #[test]
    fn can_lex_quotes() {
        let input = "'(1 2)";
        let expected_tokens = vec![
            Token::Quote,
            Token::Open(Delimiter::Paren),
            Token::Atom("1"),
            Token::Atom("2"),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);

        let input = "`(a ~b)";
        let expected_tokens = vec![
            Token::Quasiquote,
            Token::Open(Delimiter::Paren),
            Token::Atom("a"),
            Token::Unquote,
            Token::Atom("b"),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_lex_splice_unquote() {
        let input = "~@(1 2)";
        let expected_tokens = vec![
            Token::SpliceUnquote,
            Token::Open(Delimiter::Paren),
            Token::Atom("1"),
            Token::Atom("2"),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);

        let input = "~ @";
        let expected_tokens = vec![Token::Unquote, Token::Deref];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_lex_deref_and_meta() {
        let input = "@box ^meta";
        let expected_tokens = vec![
            Token::Deref,
            Token::Atom("box"),
            Token::WithMeta,
            Token::Atom("meta"),
        ];
        run_lex_test(input, expected_tokens);
    }

    #[test]
    fn can_lex_expressions() {
        let input = "(+ 2 2)";
        let expected_tokens = vec![
            Token::Open(Delimiter::Paren),
            Token::Atom("+"),
            Token::Atom("2"),
            Token::Atom("2"),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);

        let input = "(+ 2 2); (/ 1 0)\n (+ 2 3))";
        let expected_tokens = vec![
            Token::Open(Delimiter::Paren),
            Token::Atom("+"),
            Token::Atom("2"),
            Token::Atom("2"),
            Token::Close(Delimiter::Paren),
            Token::Open(Delimiter::Paren),
            Token::Atom("+"),
            Token::Atom("2"),
            Token::Atom("3"),
            Token::Close(Delimiter::Paren),
            Token::Close(Delimiter::Paren),
        ];
        run_lex_test(input, expected_tokens);

        let input = "";
        let expected_tokens = vec![];
        run_lex_test(input, expected_tokens);

        let input = " , ,, ";
        run_lex_test(input, vec![]);
    }
}
