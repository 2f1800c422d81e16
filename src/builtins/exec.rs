//! Evaluation commands: invoking actions, jails, branching, loops,
//! and `eval`.
//!
//! An *action* is a quote (interpreted value by value) or a command,
//! deferred command, or string (invoked by name). `do!` runs against
//! the live machine, so definitions made inside persist; `do` runs in
//! a jail that discards them while keeping stack effects. `doin`
//! unpacks a context into a jail, runs there, and repacks the result.

use crate::Error;
use crate::builtins::{Definition, expect_quote};
use crate::value::Value;

fn invocable(context: &str, action: &Value) -> Result<(), Error> {
    match action {
        Value::Quote(_) | Value::Command(_) | Value::Deferred(_) | Value::Str(_) => Ok(()),
        other => Err(Error::wrong_type(context, "a quote or command", other)),
    }
}

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        Definition::builtin(
            "do!",
            "( action -- ? ) invoke an action; definitions persist",
            |m| m.consume1(|m, action| m.run_action(&action)),
        ),
        Definition::builtin(
            "do",
            "( action -- ? ) invoke an action in a jail; definitions are discarded",
            |m| m.consume1(|m, action| m.run_jailed(|m| m.run_action(&action))),
        ),
        Definition::builtin(
            "do!?",
            "( action cond -- ? ) invoke an action when cond coerces to true",
            |m| {
                m.consume2(|m, action, cond| {
                    if cond.into_bool() {
                        m.run_action(&action)
                    } else {
                        Ok(())
                    }
                })
            },
        ),
        Definition::builtin(
            "do?",
            "( action cond -- ? ) jailed invocation when cond coerces to true",
            |m| {
                m.consume2(|m, action, cond| {
                    if cond.into_bool() {
                        m.run_jailed(|m| m.run_action(&action))
                    } else {
                        Ok(())
                    }
                })
            },
        ),
        Definition::builtin(
            "doin",
            "( ctx action -- quote ) run an action against an unpacked context, repacked",
            |m| {
                m.consume2(|m, ctx, action| {
                    let seed = match ctx {
                        Value::Quote(values) => values,
                        other => {
                            return Err(Error::wrong_type("doin", "a quote context", &other));
                        }
                    };
                    let context = m.run_in_child(seed, &action)?;
                    m.push(Value::Quote(context));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "opt",
            "( [cond action ...] -- ? ) run the action paired with the first truthy condition",
            |m| {
                m.consume1(|m, options| {
                    let mut pairs = expect_quote("opt", &options)?.into_iter();
                    loop {
                        let Some(condition) = pairs.next() else {
                            return Ok(());
                        };
                        let Some(action) = pairs.next() else {
                            return Err(Error::wrong_type(
                                "opt",
                                "an action after each condition",
                                &condition,
                            ));
                        };
                        // Conditions run against the live stack and
                        // leave their verdict on top
                        m.run_action(&condition)?;
                        if m.pop()?.into_bool() {
                            return m.run_action(&action);
                        }
                    }
                })
            },
        ),
        Definition::builtin(
            "loop",
            "( action -- ) repeat an action until it fails; the failure is suppressed",
            |m| {
                m.consume1(|m, action| {
                    invocable("loop", &action)?;
                    while m.run_action(&action).is_ok() {}
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "eval",
            "( s -- ? ) tokenize a string and interpret it here",
            |m| {
                m.consume1(|m, code| {
                    let source = match &code {
                        Value::Str(s) => s.clone(),
                        other => {
                            return Err(Error::wrong_type("eval", "a string of source text", other));
                        }
                    };
                    m.run_source(&source)
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
    use crate::value::{Value, val};

    fn run(source: &str) -> Result<Vec<Value>, Error> {
        let mut machine = Machine::new(Box::new(MemHost::new()));
        machine.run_source(source)?;
        Ok(machine.stack().to_vec())
    }

    #[test]
    fn test_do_accepts_every_action_shape() {
        let cases = vec![
            ("[ 1 2 + ] do!", vec![val(3)]),
            ("3 \\dup do!", vec![val(3), val(3)]),
            ("3 \"dup\" do!", vec![val(3), val(3)]),
            // A quote on the stack is data until invoked
            ("[ 1 ] [ 2 ] do!", vec![val([1]), val(2)]),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), expected, "{source}");
        }
        assert!(matches!(run("5 do!"), Err(Error::WrongType(_))));
    }

    #[test]
    fn test_conditional_invocation() {
        let cases = vec![
            ("[ 1 ] true do!?", vec![val(1)]),
            ("[ 1 ] false do!?", vec![]),
            ("[ 1 ] [ 0 ] do!?", vec![val(1)]),
            ("[ 1 ] \"\" do?", vec![]),
            ("[ [ 5 ] \\five def! ] true do!? five", vec![val(5)]),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), expected, "{source}");
        }
        // The jailed variant forgets definitions even when it runs
        let err = run("[ [ 5 ] \\five def! ] true do? five").unwrap_err();
        assert_eq!(err, Error::CommandUndefined("five".to_owned()));
    }

    #[test]
    fn test_doin_isolates_the_working_stack() {
        let cases = vec![
            ("[ 1 2 ] [ + ] doin", vec![val([3])]),
            ("9 [ 1 2 ] [ + ] doin", vec![val(9), val([3])]),
            ("[ ] [ 1 2 3 ] doin", vec![val([1, 2, 3])]),
            // quote-all inside the jail sees only the seeded context
            ("9 [ 1 2 ] [ quote-all ] doin", vec![val(9), Value::Quote(vec![val([1, 2])])]),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), expected, "{source}");
        }
    }

    #[test]
    fn test_opt_runs_first_truthy_branch() {
        let cases = vec![
            // Conditions consume what they test from the live stack
            (
                "3 [ [ 0 gt? ] [ \"pos\" ] [ true ] [ \"other\" ] ] opt",
                vec![val("pos")],
            ),
            (
                "-3 [ [ 0 gt? ] [ \"pos\" ] [ true ] [ \"other\" ] ] opt",
                vec![val("other")],
            ),
            // No branch matches: nothing runs
            ("[ [ false ] [ 1 ] ] opt", vec![]),
            ("[ ] opt", vec![]),
            // Condition results coerce
            ("[ [ 1 ] [ \"yes\" ] ] opt", vec![val("yes")]),
            // Branches may be any invocable action
            ("2 [ \\dup [ 2 + ] ] opt", vec![val(4)]),
            // A dangling condition past the taken branch is never reached
            ("[ [ true ] [ 7 ] [ false ] ] opt", vec![val(7)]),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), expected, "{source}");
        }
    }

    #[test]
    fn test_opt_rejects_bad_shapes() {
        assert!(matches!(run("5 opt"), Err(Error::WrongType(_))));
        // A condition with no action errors once it is reached, and
        // the options quote rewinds
        let mut machine = Machine::new(Box::new(MemHost::new()));
        let err = machine
            .run_source("[ [ false ] [ 1 ] [ true ] ] opt")
            .unwrap_err();
        assert!(matches!(err, Error::WrongType(_)));
        assert_eq!(machine.stack().len(), 1);
        assert!(matches!(machine.stack()[0], Value::Quote(_)));
    }

    #[test]
    fn test_loop_terminates_on_failure() {
        // Each round pops two and pushes one; the last round underflows
        assert_eq!(run("1 2 3 4 [ + ] loop").unwrap(), vec![val(10)]);
        // The terminating error is suppressed whatever its kind
        assert_eq!(run("[ no-such-command ] loop").unwrap(), vec![]);
        // Work done before the failing step survives
        assert_eq!(run("[ 1 no-such-command ] loop").unwrap(), vec![val(1)]);
    }

    #[test]
    fn test_eval() {
        let cases = vec![
            ("\"1 2 +\" eval", vec![val(3)]),
            ("\"\" eval", vec![]),
            ("\"[ 1 ] \\\\one def!\" eval one", vec![val(1)]),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), expected, "{source}");
        }
        // A tokenizer failure rewinds the code string
        let mut machine = Machine::new(Box::new(MemHost::new()));
        let err = machine.run_source("\"\\\"unterminated\" eval").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(machine.stack().to_vec(), vec![val("\"unterminated")]);
    }
}
