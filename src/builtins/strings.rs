//! String commands.
//!
//! Strings are byte sequences; casing is ASCII only. The affix tests
//! also work on quotes, where they use element equality instead of
//! byte search.

use crate::Error;
use crate::builtins::{Definition, expect_quote, expect_string};
use crate::value::Value;

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        Definition::builtin(
            "split",
            "( s delim -- [s ...] ) split s on delim; an empty delim splits into characters",
            |m| {
                m.consume2(|m, s, delim| {
                    let s = expect_string("split", &s)?;
                    let delim = expect_string("split", &delim)?;
                    let parts: Vec<Value> = if delim.is_empty() {
                        s.chars().map(|c| Value::Str(c.to_string())).collect()
                    } else {
                        s.split(delim.as_str())
                            .map(|part| Value::Str(part.to_owned()))
                            .collect()
                    };
                    m.push(Value::Quote(parts));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "join",
            "( [s ...] delim -- s ) join string-coercible elements with delim",
            |m| {
                m.consume2(|m, q, delim| {
                    let elements = expect_quote("join", &q)?;
                    let delim = expect_string("join", &delim)?;
                    let mut parts = Vec::with_capacity(elements.len());
                    for element in elements {
                        parts.push(element.into_string()?);
                    }
                    m.push(Value::Str(parts.join(&delim)));
                    Ok(())
                })
            },
        ),
        Definition::builtin("upcase", "( s -- S ) uppercase ASCII letters", |m| {
            m.consume1(|m, s| {
                let s = expect_string("upcase", &s)?;
                m.push(Value::Str(s.to_ascii_uppercase()));
                Ok(())
            })
        }),
        Definition::builtin("downcase", "( s -- s ) lowercase ASCII letters", |m| {
            m.consume1(|m, s| {
                let s = expect_string("downcase", &s)?;
                m.push(Value::Str(s.to_ascii_lowercase()));
                Ok(())
            })
        }),
        Definition::builtin(
            "starts-with?",
            "( a b -- bool ) whether a begins with b (substring, or quote prefix)",
            |m| {
                m.consume2(|m, a, b| {
                    let result = match (&a, &b) {
                        (Value::Str(s), Value::Str(prefix)) => s.starts_with(prefix.as_str()),
                        (Value::Quote(q), Value::Quote(prefix)) => {
                            q.len() >= prefix.len() && q[..prefix.len()] == prefix[..]
                        }
                        _ => {
                            return Err(Error::wrong_type(
                                "starts-with?",
                                "two strings or two quotes",
                                &b,
                            ));
                        }
                    };
                    m.push(Value::Bool(result));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "ends-with?",
            "( a b -- bool ) whether a ends with b (substring, or quote suffix)",
            |m| {
                m.consume2(|m, a, b| {
                    let result = match (&a, &b) {
                        (Value::Str(s), Value::Str(suffix)) => s.ends_with(suffix.as_str()),
                        (Value::Quote(q), Value::Quote(suffix)) => {
                            q.len() >= suffix.len() && q[q.len() - suffix.len()..] == suffix[..]
                        }
                        _ => {
                            return Err(Error::wrong_type(
                                "ends-with?",
                                "two strings or two quotes",
                                &b,
                            ));
                        }
                    };
                    m.push(Value::Bool(result));
                    Ok(())
                })
            },
        ),
        Definition::builtin(
            "contains?",
            "( a b -- bool ) whether a contains b (substring, or quote element)",
            |m| {
                m.consume2(|m, a, b| {
                    let result = match (&a, &b) {
                        (Value::Str(s), Value::Str(needle)) => s.contains(needle.as_str()),
                        (Value::Quote(q), needle) => q.iter().any(|element| *element == *needle),
                        (Value::Str(_), other) => {
                            return Err(Error::wrong_type("contains?", "a string to search for", other));
                        }
                        _ => {
                            return Err(Error::wrong_type(
                                "contains?",
                                "a string or quote to search",
                                &a,
                            ));
                        }
                    };
                    m.push(Value::Bool(result));
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
    use crate::value::{Value, val};

    fn run(source: &str) -> Result<Vec<Value>, Error> {
        let mut machine = Machine::new(Box::new(MemHost::new()));
        machine.run_source(source)?;
        Ok(machine.stack().to_vec())
    }

    #[test]
    fn test_split() {
        let cases = vec![
            ("\"a,b,c\" \",\" split", val(["a", "b", "c"])),
            ("\"a::b\" \"::\" split", val(["a", "b"])),
            ("\"abc\" \"\" split", val(["a", "b", "c"])),
            ("\"\" \",\" split", val([""])),
            ("\"\" \"\" split", val(Vec::<&str>::new())),
            ("\",a,\" \",\" split", val(["", "a", ""])),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), vec![expected], "{source}");
        }
    }

    #[test]
    fn test_join() {
        let cases = vec![
            ("[ \"a\" \"b\" \"c\" ] \"-\" join", val("a-b-c")),
            ("[ ] \"-\" join", val("")),
            ("[ \"solo\" ] \",\" join", val("solo")),
            // Scalars coerce through their string form
            ("[ 1 2.5 true ] \" \" join", val("1 2.5 true")),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), vec![expected], "{source}");
        }
        // A nested quote has no string form; the arguments rewind
        let err = run("[ [ 1 ] ] \"-\" join").unwrap_err();
        assert!(matches!(err, Error::WrongType(_)));
    }

    #[test]
    fn test_casing_is_ascii() {
        assert_eq!(run("\"AbC1!\" upcase").unwrap(), vec![val("ABC1!")]);
        assert_eq!(run("\"AbC1!\" downcase").unwrap(), vec![val("abc1!")]);
        // Non-ASCII passes through untouched
        assert_eq!(run("\"héLLo\" upcase").unwrap(), vec![val("héLLO")]);
    }

    #[test]
    fn test_affixes_on_strings() {
        let cases = vec![
            ("\"foobar\" \"foo\" starts-with?", true),
            ("\"foobar\" \"bar\" starts-with?", false),
            ("\"foobar\" \"\" starts-with?", true),
            ("\"foobar\" \"bar\" ends-with?", true),
            ("\"foobar\" \"foo\" ends-with?", false),
            ("\"foobar\" \"oba\" contains?", true),
            ("\"foobar\" \"xyz\" contains?", false),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), vec![val(expected)], "{source}");
        }
    }

    #[test]
    fn test_affixes_on_quotes() {
        let cases = vec![
            ("[ 1 2 3 ] [ 1 2 ] starts-with?", true),
            ("[ 1 2 3 ] [ 2 ] starts-with?", false),
            ("[ 1 2 3 ] [ 2 3 ] ends-with?", true),
            ("[ 1 2 3 ] [ 1 2 3 4 ] starts-with?", false),
            // Element membership uses value equality, with numeric coercion
            ("[ 1 2 3 ] 2 contains?", true),
            ("[ 1 2 3 ] 2.0 contains?", true),
            ("[ 1 2 3 ] 4 contains?", false),
            ("[ [ 1 ] [ 2 ] ] [ 2 ] contains?", true),
        ];
        for (source, expected) in cases {
            assert_eq!(run(source).unwrap(), vec![val(expected)], "{source}");
        }
    }
}
