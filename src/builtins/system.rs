//! Host-facing commands: filesystem, processes, identity, lifecycle.
//!
//! All of these delegate to the machine's [`crate::host::Host`], so a
//! restricted host answers `Unsupported` for the capabilities it
//! lacks and everything else keeps working.

use crate::Error;
use crate::builtins::{Definition, expect_string};
use crate::value::Value;
use rand::Rng;

/// The pool `inspire` draws from.
const INSPIRATIONS: &[&str] = &[
    "Write programs that do one thing and do it well. - Doug McIlroy",
    "Expect the output of every program to become the input to another, as yet unknown, program. - Doug McIlroy",
    "When in doubt, use brute force. - Ken Thompson",
    "Controlling complexity is the essence of computer programming. - Brian Kernighan",
    "Simplicity is prerequisite for reliability. - Edsger Dijkstra",
    "The cheapest, fastest, and most reliable components are those that aren't there. - Gordon Bell",
    "Make it work, make it right, make it fast. - Kent Beck",
    "Deleted code is debugged code. - Jeff Sickel",
];

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        Definition::builtin("cwd", "( -- path ) the current working directory", |m| {
            let dir = m.host().getcwd()?;
            m.push(Value::Str(dir));
            Ok(())
        }),
        Definition::builtin("cd", "( path -- ) change the working directory", |m| {
            m.consume1(|m, path| {
                let path = expect_string("cd", &path)?;
                let path = if path == "~" {
                    m.host()
                        .env_get("HOME")
                        .ok_or_else(|| Error::io("cd: HOME is not set"))?
                } else {
                    path
                };
                m.host().chdir(&path)
            })
        }),
        Definition::builtin("ls", "( -- [name ...] ) directory entries, sorted", |m| {
            let mut names = m.host().list_dir(".")?;
            names.sort();
            m.push(Value::Quote(names.into_iter().map(Value::Str).collect()));
            Ok(())
        }),
        Definition::builtin("readf", "( path -- s ) read a whole file", |m| {
            m.consume1(|m, path| {
                let path = expect_string("readf", &path)?;
                let content = m.host().read_file(&path)?;
                m.push(Value::Str(content));
                Ok(())
            })
        }),
        Definition::builtin("writef", "( content path -- ) write a file", |m| {
            m.consume2(|m, content, path| {
                let path = expect_string("writef", &path)?;
                let content = content.into_string()?;
                m.host().write_file(&path, &content)
            })
        }),
        Definition::builtin(
            "appendf",
            "( content path -- ) append to a file, creating it when absent",
            |m| {
                m.consume2(|m, content, path| {
                    let path = expect_string("appendf", &path)?;
                    let content = content.into_string()?;
                    m.host().append_file(&path, &content)
                })
            },
        ),
        Definition::builtin(
            "exec",
            "( cmd -- out ) run a command line, capturing its output",
            |m| {
                m.consume1(|m, cmd| {
                    let line = expect_string("exec", &cmd)?;
                    let argv: Vec<String> =
                        line.split_whitespace().map(str::to_owned).collect();
                    if argv.is_empty() {
                        return Err(Error::io("exec: empty command line"));
                    }
                    let output = m.host().run_process(&argv)?;
                    if output.status != 0 {
                        return Err(Error::io(format!(
                            "exec: {} exited with status {}",
                            argv[0], output.status
                        )));
                    }
                    let mut stdout = output.stdout;
                    if stdout.ends_with('\n') {
                        stdout.pop();
                        if stdout.ends_with('\r') {
                            stdout.pop();
                        }
                    }
                    m.push(Value::Str(stdout));
                    Ok(())
                })
            },
        ),
        Definition::builtin("args", "( -- [s ...] ) the program arguments", |m| {
            let argv = m.host().argv();
            m.push(Value::Quote(
                argv.into_iter().skip(1).map(Value::Str).collect(),
            ));
            Ok(())
        }),
        Definition::builtin("procname", "( -- s ) the name of this process", |m| {
            let argv = m.host().argv();
            let name = argv
                .first()
                .map(|arg0| std::path::Path::new(arg0))
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or(Error::ProcessNameUnknown)?;
            m.push(Value::Str(name));
            Ok(())
        }),
        Definition::builtin(
            "interactive?",
            "( -- bool ) whether standard input is a terminal",
            |m| {
                let tty = m.host().stdin_is_tty();
                m.push(Value::Bool(tty));
                Ok(())
            },
        ),
        Definition::builtin("version", "( -- s ) the interpreter version", |m| {
            m.push(Value::Str(env!("CARGO_PKG_VERSION").to_owned()));
            Ok(())
        }),
        Definition::builtin("quit", "( -- ) leave, warning when values remain", |m| {
            if !m.stack().is_empty() {
                let warning = format!(
                    "warning: exiting with {} values left on the stack\n",
                    m.stack().len()
                );
                m.host().write_err(&warning)?;
            }
            Err(m.host().exit(0))
        }),
        Definition::builtin("exit", "( n -- ) leave with a status code", |m| {
            let value = m.pop()?;
            let n = match value.clone().into_int() {
                Ok(n) => n,
                Err(err) => {
                    m.push(value);
                    return Err(err);
                }
            };
            let clamped = n.clamp(0, 255);
            if clamped != n {
                let warning = format!("warning: exit status {n} clamped to {clamped}\n");
                m.host().write_err(&warning)?;
            }
            Err(m.host().exit(clamped as u8))
        }),
        Definition::builtin("inspire", "( -- s ) words to work by", |m| {
            let pick = rand::thread_rng().gen_range(0..INSPIRATIONS.len());
            m.push(Value::Str(INSPIRATIONS[pick].to_owned()));
            Ok(())
        }),
    ]
}
