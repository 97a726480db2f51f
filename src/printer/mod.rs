use std::io;

use crate::value::Value;

/// to_literal renders `value` in its canonical literal form, the left inverse
/// of reading for every literal-representable value.
pub fn to_literal(value: &Value) -> String {
    value.to_string()
}

pub fn print_to(mut out: impl io::Write, value: &Value) -> io::Result<()> {
    write!(&mut out, "{}", value)
}

pub fn println_to(mut out: impl io::Write, value: &Value) -> io::Result<()> {
    writeln!(&mut out, "{}", value)
}
