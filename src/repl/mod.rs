use std::io;

use ansi_term::Color;
use linefeed::{Interface, ReadResult, Terminal};

use crate::evaluator::{prelude, Environment};
use crate::printer;

static HISTORY_FILE: &str = "nacre.history";

fn configure_reader<T: Terminal>(reader: &Interface<T>) -> io::Result<()> {
    let mut reader = reader.lock_reader();
    reader.set_blink_matching_paren(true);

    let style = Color::Cyan.bold();
    let text = "nacre=> ";

    reader.set_prompt(&format!(
        "\x01{prefix}\x02{text}\x01{suffix}\x02",
        prefix = style.prefix(),
        text = text,
        suffix = style.suffix()
    ))
}

pub fn run() -> io::Result<()> {
    let reader = Interface::new("nacre")?;
    configure_reader(&reader)?;

    if let Err(e) = reader.load_history(HISTORY_FILE) {
        if e.kind() == io::ErrorKind::NotFound {
            println!(
                "History file {} doesn't exist, not loading history.",
                HISTORY_FILE
            );
        } else {
            eprintln!("Could not load history file {}: {}", HISTORY_FILE, e);
        }
    }

    let mut env = prelude::env();

    loop {
        match reader.read_line()? {
            ReadResult::Input(input) => {
                if input.trim().is_empty() {
                    continue;
                }
                reader.add_history_unique(input.clone());
                rep(&input, &mut env)?
            }
            ReadResult::Eof => {
                print!("^D");
                break;
            }
            ReadResult::Signal(signal) => {
                println!("signal: {:?}", signal);
                break;
            }
        }
    }

    if let Err(e) = reader.save_history(HISTORY_FILE) {
        eprintln!("Could not save history file {}: {}", HISTORY_FILE, e);
    }

    Ok(())
}

// a `def!` at the top level updates the environment for every following line;
// a failed line reports and leaves the environment as it was
fn rep(input: &str, env: &mut Environment) -> io::Result<()> {
    match crate::interpret(input, env) {
        Ok((value, next)) => {
            *env = next;
            printer::println_to(io::stdout(), &value)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(())
        }
    }
}
