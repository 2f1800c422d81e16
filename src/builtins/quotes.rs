//! Quote manipulation and the higher-order combinators.
//!
//! `map`, `filter`, and `any?` each seed a fresh context with one
//! element and run their action in a jail, so the body sees exactly
//! one value, cannot touch the outer stack, and leaves no definitions
//! behind. `map` appends whatever context the body leaves - an action
//! may therefore grow or shrink the output.

use crate::Error;
use crate::builtins::{Definition, expect_quote};
use crate::value::Value;

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        Definition::builtin(
            "map",
            "( [a ...] f -- [b ...] ) run f for each element, collecting results",
            |m| {
                m.consume2(|m, q, f| {
                    let elements = expect_quote("map", &q)?;
                    let mut out = Vec::with_capacity(elements.len());
                    for element in elements {
                        let context = m.run_in_child(vec![element], &f)?;
                        out.extend(context);
                    }
                    m.push(Value::Quote(out));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "filter",
            "( [a ...] f -- [a ...] ) keep elements for which f leaves a truthy top",
            |m| {
                m.consume2(|m, q, f| {
                    let elements = expect_quote("filter", &q)?;
                    let mut kept = Vec::new();
                    for element in elements {
                        let context = m.run_in_child(vec![element.clone()], &f)?;
                        if context.last().is_some_and(|top| top.clone().into_bool()) {
                            kept.push(element);
                        }
                    }
                    m.push(Value::Quote(kept));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "any?",
            "( [a ...] f -- bool ) whether f holds for some element; stops early",
            |m| {
                m.consume2(|m, q, f| {
                    let elements = expect_quote("any?", &q)?;
                    for element in elements {
                        let context = m.run_in_child(vec![element], &f)?;
                        if context.last().is_some_and(|top| top.clone().into_bool()) {
                            m.push(Value::Bool(true));
                            return Ok(());
                        }
                    }
                    m.push(Value::Bool(false));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "len",
            "( a -- n ) bytes of a string, elements of a quote, 1 otherwise",
            |m| {
                m.consume1(|m, a| {
                    let n = match &a {
                        Value::Str(s) => s.len() as i64,
                        Value::Quote(q) => q.len() as i64,
                        _ => 1,
                    };
                    m.push(Value::Int(n));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "...",
            "( [a ...] -- a ... ) unpack a quote onto the working stack",
            |m| {
                m.consume1(|m, q| {
                    let elements = expect_quote("...", &q)?;
                    for element in elements {
                        m.push(element);
                    }
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "rev",
            "( a -- a ) reverse a string or quote; scalars pass through",
            |m| {
                m.consume1(|m, a| {
                    let reversed = match a {
                        Value::Str(s) => Value::Str(s.chars().rev().collect()),
                        Value::Quote(mut q) => {
                            q.reverse();
                            Value::Quote(q)
                        }
                        scalar => scalar,
                    };
                    m.push(reversed);
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "sort",
            "( [a ...] -- [a ...] ) sort a quote by the total order; scalars pass through",
            |m| {
                m.consume1(|m, a| {
                    let sorted = match a {
                        Value::Quote(mut q) => {
                            q.sort_by(|x, y| x.total_cmp(y));
                            Value::Quote(q)
                        }
                        scalar => scalar,
                    };
                    m.push(sorted);
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "concat",
            "( [a ...] [b ...] -- [a ... b ...] ) append one quote to another",
            |m| {
                m.consume2(|m, a, b| {
                    let mut front = expect_quote("concat", &a)?;
                    let back = expect_quote("concat", &b)?;
                    front.extend(back);
                    m.push(Value::Quote(front));
                    Ok(())
                })
            },
        ),
        Definition::builtin("push", "( [a ...] b -- [a ... b] ) append b to a quote", |m| {
            m.consume2(|m, q, b| {
                let mut elements = expect_quote("push", &q)?;
                elements.push(b);
                m.push(Value::Quote(elements));
                Ok(())
            })
        }),
        Definition::builtin(
            "pop",
            "( [a ... b] -- [a ...] b ) split the last element off a quote",
            |m| {
                m.consume1(|m, q| {
                    let mut elements = expect_quote("pop", &q)?;
                    let last = elements.pop().ok_or(Error::StackUnderflow)?;
                    m.push(Value::Quote(elements));
                    m.push(last);
                    Ok(())
                })
            },
        ),
        Definition::builtin("enq", "( b [a ...] -- [b a ...] ) prepend b to a quote", |m| {
            m.consume2(|m, b, q| {
                let mut elements = expect_quote("enq", &q)?;
                elements.insert(0, b);
                m.push(Value::Quote(elements));
                Ok(())
            })
        }),
        Definition::builtin(
            "deq",
            "( [b a ...] -- b [a ...] ) split the first element off a quote",
            |m| {
                m.consume1(|m, q| {
                    let mut elements = expect_quote("deq", &q)?;
                    if elements.is_empty() {
                        return Err(Error::StackUnderflow);
                    }
                    let first = elements.remove(0);
                    m.push(first);
                    m.push(Value::Quote(elements));
                    Ok(())
                })
            },
        ),
    ]
}
