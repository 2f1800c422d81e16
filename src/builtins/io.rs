//! Terminal I/O commands.
//!
//! `p` prints the *raw* form: strings lose their quotes, everything
//! else uses its program-text rendering. `red`/`green`/`norm` emit
//! ANSI style codes only when standard output is a terminal, so
//! piped output stays clean.

use crate::Error;
use crate::builtins::Definition;
use crate::value::Value;

fn raw_form(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

fn style(name: &'static str, description: &'static str, code: &'static str) -> Definition {
    Definition::builtin(name, description, move |m| {
        if m.host().stdout_is_tty() {
            m.host().write_out(code)
        } else {
            Ok(())
        }
    })
}

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        Definition::builtin("p", "( a -- ) print a raw, without a newline", |m| {
            m.consume1(|m, a| {
                let text = raw_form(&a);
                m.host().write_out(&text)
            })
        }),
        Definition::builtin("ep", "( a -- ) print a raw to the diagnostic stream", |m| {
            m.consume1(|m, a| {
                let text = raw_form(&a);
                m.host().write_err(&text)
            })
        }),
        Definition::builtin("nl", "( -- ) print a newline", |m| m.host().write_out("\n")),
        Definition::builtin("enl", "( -- ) print a newline to the diagnostic stream", |m| {
            m.host().write_err("\n")
        }),
        style("red", "( -- ) style output red when on a terminal", "\x1b[31m"),
        style("green", "( -- ) style output green when on a terminal", "\x1b[32m"),
        style("norm", "( -- ) reset output styling when on a terminal", "\x1b[0m"),
        Definition::builtin("rl", "( -- line ) read one line from standard input", |m| {
            match m.host().read_line()? {
                Some(line) => {
                    m.push(Value::Str(line));
                    Ok(())
                }
                None => Err(Error::io("rl: end of input")),
            }
        }),
        Definition::builtin(
            "rls",
            "( -- [line ...] ) read standard input to the end, as lines",
            |m| {
                let mut lines = Vec::new();
                while let Some(line) = m.host().read_line()? {
                    lines.push(Value::Str(line));
                }
                m.push(Value::Quote(lines));
                Ok(())
            },
        ),
    ]
}
