//! Stack discipline: shuffling, inspection, and context wrapping.

use crate::builtins::Definition;
use crate::value::Value;

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        Definition::builtin("dup", "( a -- a a ) duplicate the top value", |m| {
            m.consume1(|m, a| {
                m.push(a.clone());
                m.push(a);
                Ok(())
            })
        }),
        Definition::builtin("drop", "( a -- ) discard the top value", |m| {
            m.consume1(|_, _a| Ok(()))
        }),
        Definition::builtin("swap", "( a b -- b a ) exchange the top two values", |m| {
            m.consume2(|m, a, b| {
                m.push(b);
                m.push(a);
                Ok(())
            })
        }),
        Definition::builtin("rot", "( a b c -- c a b ) rotate the top three values", |m| {
            m.consume3(|m, a, b, c| {
                m.push(c);
                m.push(a);
                m.push(b);
                Ok(())
            })
        }),
        Definition::builtin(
            ".s",
            "( -- ) print the working stack to the diagnostic stream",
            |m| {
                let rendered = format!("{}\n", Value::Quote(m.stack().to_vec()));
                m.host().write_err(&rendered)
            },
        ),
        Definition::builtin("quote", "( a -- [a] ) wrap the top value in a quote", |m| {
            m.consume1(|m, a| {
                m.push(Value::Quote(vec![a]));
                Ok(())
            })
        }),
        Definition::builtin(
            "quote-all",
            "( ... -- [...] ) wrap the whole working stack in one quote",
            |m| {
                let context = m.take_context();
                m.push(Value::Quote(context));
                Ok(())
            },
        ),
        Definition::builtin(
            "anything?",
            "( -- bool ) whether the working stack holds any values",
            |m| {
                let nonempty = !m.stack().is_empty();
                m.push(Value::Bool(nonempty));
                Ok(())
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::host::{MemHost, SharedMemHost};
    use crate::machine::Machine;
    use crate::value::{Value, val};

    fn run(source: &str) -> Vec<Value> {
        let mut machine = Machine::new(Box::new(MemHost::new()));
        machine.run_source(source).expect("program should succeed");
        machine.stack().to_vec()
    }

    #[test]
    fn test_shuffles() {
        assert_eq!(run("1 dup"), vec![val(1), val(1)]);
        assert_eq!(run("1 2 drop"), vec![val(1)]);
        assert_eq!(run("1 2 swap"), vec![val(2), val(1)]);
        assert_eq!(run("1 2 3 rot"), vec![val(3), val(1), val(2)]);
        // dup copies aggregates too
        assert_eq!(run("[ 1 ] dup"), vec![val([1]), val([1])]);
    }

    #[test]
    fn test_quote_wrapping() {
        assert_eq!(run("7 quote"), vec![val([7])]);
        assert_eq!(run("1 2 3 quote-all"), vec![val([1, 2, 3])]);
        assert_eq!(run("quote-all"), vec![val(Vec::<i64>::new())]);
        // quote-all leaves one value; a second wraps again
        assert_eq!(run("1 quote-all quote-all"), vec![Value::Quote(vec![val([1])])]);
    }

    #[test]
    fn test_anything() {
        assert_eq!(run("anything?"), vec![val(false)]);
        assert_eq!(run("0 anything?"), vec![val(0), val(true)]);
    }

    #[test]
    fn test_dot_s_writes_diagnostics() {
        let host = SharedMemHost::new(MemHost::new());
        let mut machine = Machine::new(Box::new(host.clone()));
        machine.run_source("1 \"x\" .s").unwrap();
        assert_eq!(host.err(), "[ 1 \"x\" ]\n");
        // The stack itself is untouched
        assert_eq!(machine.stack().to_vec(), vec![val(1), val("x")]);
    }
}
