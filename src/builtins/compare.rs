//! Comparison and boolean logic.
//!
//! The comparison family is one helper over [`Value::total_cmp`], so
//! any two values can be compared and exactly one of `lt?`, `eq?`,
//! `gt?` holds for a pair. `and`/`or`/`not` coerce their operands to
//! bool first; there is nothing to short-circuit since both operands
//! are already on the stack.

use crate::builtins::Definition;
use crate::value::Value;
use std::cmp::Ordering;

fn comparison(
    name: &'static str,
    description: &'static str,
    accepts: fn(Ordering) -> bool,
) -> Definition {
    Definition::builtin(name, description, move |m| {
        m.consume2(|m, a, b| {
            m.push(Value::Bool(accepts(a.total_cmp(&b))));
            Ok(())
        })
    })
}

fn connective(
    name: &'static str,
    description: &'static str,
    combine: fn(bool, bool) -> bool,
) -> Definition {
    Definition::builtin(name, description, move |m| {
        m.consume2(|m, a, b| {
            m.push(Value::Bool(combine(a.into_bool(), b.into_bool())));
            Ok(())
        })
    })
}

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        comparison("eq?", "( a b -- bool ) whether a equals b", |o| {
            o == Ordering::Equal
        }),
        comparison("lt?", "( a b -- bool ) whether a orders before b", |o| {
            o == Ordering::Less
        }),
        comparison("lte?", "( a b -- bool ) whether a orders before or equals b", |o| {
            o != Ordering::Greater
        }),
        comparison("gt?", "( a b -- bool ) whether a orders after b", |o| {
            o == Ordering::Greater
        }),
        comparison("gte?", "( a b -- bool ) whether a orders after or equals b", |o| {
            o != Ordering::Less
        }),
        connective("and", "( a b -- bool ) whether both coerce to true", |a, b| {
            a && b
        }),
        connective("or", "( a b -- bool ) whether either coerces to true", |a, b| {
            a || b
        }),
        Definition::builtin("not", "( a -- bool ) the coerced negation of a", |m| {
            m.consume1(|m, a| {
                m.push(Value::Bool(!a.into_bool()));
                Ok(())
            })
        }),
    ]
}

#[cfg(test)]
mod tests {
    use crate::host::MemHost;
    use crate::machine::Machine;
    use crate::value::{Value, val};

    fn run(source: &str) -> Vec<Value> {
        let mut machine = Machine::new(Box::new(MemHost::new()));
        machine.run_source(source).expect("program should succeed");
        machine.stack().to_vec()
    }

    #[test]
    fn test_comparisons() {
        let cases = vec![
            ("1 2 lt?", true),
            ("2 1 lt?", false),
            ("1 1 lt?", false),
            ("1 1 lte?", true),
            ("2 1 gt?", true),
            ("1 1 gte?", true),
            ("1 1.0 eq?", true),
            ("1 1.5 lt?", true),
            ("\"a\" \"b\" lt?", true),
            // Cross-type pairs follow the total order
            ("true 0 lt?", true),
            ("\"z\" [ ] lt?", true),
            ("\"dup\" \\dup lt?", true),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source), vec![val(expected)], "{source}");
        }
    }

    #[test]
    fn test_logic_coerces() {
        let cases = vec![
            ("true true and", true),
            ("true false and", false),
            ("1 \"x\" and", true),
            ("1 \"\" and", false),
            ("false false or", false),
            ("0 1 or", true),
            ("true not", false),
            ("0 not", true),
            ("[ ] not", true),
            ("[ 0 ] not", false),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source), vec![val(expected)], "{source}");
        }
    }
}
