//! The catena command-line driver.
//!
//! Three ways in: program text on the command line, a script file
//! (shebang friendly), or standard input - a REPL when that is a
//! terminal, a piped script otherwise.

use catena::host::OsHost;
use catena::machine::Machine;
use catena::tokenizer::{self, Token};
use catena::{Error, ParseErrorKind};
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{IsTerminal, Read};
use std::process::ExitCode;

/// Concatenative stack interpreter for shell-style composition.
#[derive(Parser)]
#[command(name = "catena", version)]
struct Cli {
    /// Program text to evaluate, or a script path followed by its
    /// arguments. With nothing here, reads standard input (as a REPL
    /// when interactive).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    code: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut machine = Machine::new(Box::new(OsHost));

    match cli.code.first() {
        Some(first) if std::path::Path::new(first).is_file() => {
            let source = match std::fs::read_to_string(first) {
                Ok(source) => source,
                Err(err) => {
                    report(&Error::io(format!("{first}: {err}")));
                    return ExitCode::from(1);
                }
            };
            run_once(&mut machine, &source)
        }
        Some(_) => {
            let source = cli.code.join(" ");
            run_once(&mut machine, &source)
        }
        None if std::io::stdin().is_terminal() => repl(&mut machine),
        None => {
            let mut source = String::new();
            if let Err(err) = std::io::stdin().read_to_string(&mut source) {
                report(&Error::io(err.to_string()));
                return ExitCode::from(1);
            }
            run_once(&mut machine, &source)
        }
    }
}

/// Run a whole program, mapping the outcome to an exit code.
fn run_once(machine: &mut Machine, source: &str) -> ExitCode {
    match machine.run_source(source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Exit(code)) => ExitCode::from(code),
        Err(err) => {
            report(&err);
            ExitCode::from(1)
        }
    }
}

/// Print a diagnostic, red when the diagnostic stream is a terminal.
fn report(err: &Error) {
    if std::io::stderr().is_terminal() {
        eprintln!("\x1b[31mcatena: {err}\x1b[0m");
    } else {
        eprintln!("catena: {err}");
    }
}

/// How much deeper `[` runs than `]` in a line of input, when it
/// tokenizes at all. Unterminated strings also ask for more input.
enum Balance {
    Settled,
    Open,
}

fn balance(buffer: &str) -> Result<Balance, Error> {
    match tokenizer::tokenize(buffer) {
        Ok(tokens) => {
            let mut depth: i64 = 0;
            for token in &tokens {
                match token {
                    Token::LeftBracket => depth += 1,
                    Token::RightBracket => depth -= 1,
                    _ => {}
                }
            }
            Ok(if depth > 0 { Balance::Open } else { Balance::Settled })
        }
        Err(Error::Parse(e)) if e.kind == ParseErrorKind::UnterminatedString => Ok(Balance::Open),
        Err(err) => Err(err),
    }
}

fn repl(machine: &mut Machine) -> ExitCode {
    println!("catena {} - a concatenative calculator for your pipes", env!("CARGO_PKG_VERSION"));
    println!("Try: 1 2 + p    or: defs ... .s    Ctrl-D leaves.");

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            report(&Error::io(err.to_string()));
            return ExitCode::from(1);
        }
    };

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "catena> " } else { "... " };
        match editor.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() && line.trim().is_empty() {
                    continue;
                }
                buffer.push_str(&line);
                buffer.push('\n');

                // Keep reading while quote literals or strings are open
                match balance(&buffer) {
                    Ok(Balance::Open) => continue,
                    Ok(Balance::Settled) => {}
                    Err(err) => {
                        report(&err);
                        buffer.clear();
                        continue;
                    }
                }

                let source = std::mem::take(&mut buffer);
                let _ = editor.add_history_entry(source.trim());
                match machine.run_source(&source) {
                    Ok(()) => {}
                    Err(Error::Exit(code)) => return ExitCode::from(code),
                    Err(err) => report(&err),
                }
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                return ExitCode::SUCCESS;
            }
            Err(err) => {
                report(&Error::io(err.to_string()));
                return ExitCode::from(1);
            }
        }
    }
}
