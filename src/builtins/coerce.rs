//! Explicit coercions: the `to-*` family.

use crate::Error;
use crate::builtins::Definition;
use crate::value::Value;

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        Definition::builtin("to-bool", "( a -- bool ) coerce to a boolean", |m| {
            m.consume1(|m, a| {
                m.push(Value::Bool(a.into_bool()));
                Ok(())
            })
        }),
        Definition::builtin("to-int", "( a -- int ) coerce to an integer", |m| {
            m.consume1(|m, a| {
                let n = a.into_int()?;
                m.push(Value::Int(n));
                Ok(())
            })
        }),
        Definition::builtin("to-float", "( a -- float ) coerce to a float", |m| {
            m.consume1(|m, a| {
                let f = a.into_float()?;
                m.push(Value::Float(f));
                Ok(())
            })
        }),
        Definition::builtin("to-string", "( a -- s ) coerce to a string", |m| {
            m.consume1(|m, a| {
                let s = a.into_string()?;
                m.push(Value::Str(s));
                Ok(())
            })
        }),
        Definition::builtin("to-cmd", "( a -- cmd ) name a command from a's string form", |m| {
            m.consume1(|m, a| {
                let name = a
                    .clone()
                    .into_string()
                    .map_err(|_| Error::wrong_type("to-cmd", "a scalar value", &a))?;
                m.push(Value::Command(name));
                Ok(())
            })
        }),
        Definition::builtin(
            "to-def",
            "( a -- \\cmd ) name a deferred command from a's string form",
            |m| {
                m.consume1(|m, a| {
                    let name = a
                        .clone()
                        .into_string()
                        .map_err(|_| Error::wrong_type("to-def", "a scalar value", &a))?;
                    m.push(Value::Deferred(name));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "to-quote",
            "( a -- [a] ) quotes pass through; anything else is wrapped",
            |m| {
                m.consume1(|m, a| {
                    let q = a.into_quote();
                    m.push(Value::Quote(q));
                    Ok(())
                })
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::Error;
    use crate::host::MemHost;
    use crate::machine::Machine;
    use crate::value::{Value, cmd, dfr, val};

    fn run(source: &str) -> Result<Vec<Value>, Error> {
        let mut machine = Machine::new(Box::new(MemHost::new()));
        machine.run_source(source)?;
        Ok(machine.stack().to_vec())
    }

    #[test]
    fn test_coercions() {
        let cases = vec![
            ("3 to-bool", val(true)),
            ("0 to-bool", val(false)),
            ("\"\" to-bool", val(false)),
            ("[ ] to-bool", val(false)),
            ("\\p to-bool", val(true)),
            ("true to-int", val(1)),
            ("2.9 to-int", val(2)),
            ("\"41\" to-int", val(41)),
            ("3 to-float", val(3.0)),
            ("\"2.5\" to-float", val(2.5)),
            ("false to-float", val(0.0)),
            ("17 to-string", val("17")),
            ("true to-string", val("true")),
            ("2.0 to-string", val("2.0")),
            ("\\dup to-string", val("dup")),
            ("\"dup\" to-cmd to-string", val("dup")),
            ("\"dup\" to-def", dfr("dup")),
            ("\\dup to-cmd", cmd("dup")),
            ("5 to-quote", val([5])),
            ("[ 5 ] to-quote", val([5])),
            ("[ 1 2 ] to-quote", val([1, 2])),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), vec![expected], "{source}");
        }
    }

    #[test]
    fn test_coercion_failures_rewind() {
        let mut machine = Machine::new(Box::new(MemHost::new()));
        let err = machine.run_source("\"nope\" to-int").unwrap_err();
        assert!(matches!(err, Error::WrongType(_)));
        assert_eq!(machine.stack().to_vec(), vec![val("nope")]);

        let mut machine = Machine::new(Box::new(MemHost::new()));
        let err = machine.run_source("[ 1 ] to-cmd").unwrap_err();
        assert!(matches!(err, Error::WrongType(_)));
        assert_eq!(machine.stack().to_vec(), vec![val([1])]);
    }

    #[test]
    fn test_idempotence_at_the_command_level() {
        for (once, twice) in [
            ("5 to-bool", "5 to-bool to-bool"),
            ("2.9 to-int", "2.9 to-int to-int"),
            ("7 to-float", "7 to-float to-float"),
            ("true to-string", "true to-string to-string"),
            ("5 to-quote", "5 to-quote to-quote"),
        ] {
            assert_eq!(run(once).unwrap(), run(twice).unwrap(), "{once} vs {twice}");
        }
    }
}
