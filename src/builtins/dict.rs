//! Dictionary commands: defining, querying, and documenting.
//!
//! Definitions never go away; redefining a name replaces its entry.
//! A name may arrive as a string, a command, or (most commonly) a
//! deferred command: `[ 2 * ] \double def!`.

use crate::Error;
use crate::builtins::{Definition, expect_string, identifier};
use crate::value::Value;

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        Definition::builtin("def!", "( action name -- ) bind name to a quote action", |m| {
            m.consume2(|m, action, name| {
                let name = identifier("def!", &name)?;
                let values = match action {
                    Value::Quote(values) => values,
                    other => return Err(Error::wrong_type("def!", "a quote action", &other)),
                };
                m.define(Definition::from_quote(&name, values));
                Ok(())
            })
        }),
        Definition::builtin("def?", "( name -- bool ) whether name is defined", |m| {
            m.consume1(|m, name| {
                let name = identifier("def?", &name)?;
                let defined = m.is_defined(&name);
                m.push(Value::Bool(defined));
                Ok(())
            })
        }),
        Definition::builtin("defs", "( -- [name ...] ) all defined names, sorted", |m| {
            let names = m
                .defined_names()
                .into_iter()
                .map(Value::Str)
                .collect();
            m.push(Value::Quote(names));
            Ok(())
        }),
        Definition::builtin("usage", "( name -- s ) the description of a definition", |m| {
            m.consume1(|m, name| {
                let name = identifier("usage", &name)?;
                let description = m
                    .lookup(&name)
                    .map(|def| def.description.clone())
                    .ok_or(Error::CommandUndefined(name))?;
                m.push(Value::Str(description));
                Ok(())
            })
        }),
        Definition::builtin(
            "def-usage",
            "( name s -- ) set the description of a definition",
            |m| {
                m.consume2(|m, name, description| {
                    let name = identifier("def-usage", &name)?;
                    let description = expect_string("def-usage", &description)?;
                    if m.set_description(&name, description) {
                        Ok(())
                    } else {
                        Err(Error::CommandUndefined(name))
                    }
                })
            },
        ),
        Definition::builtin(
            ":",
            "( ... name -- ) bind a value to a name, or values to a quote of names",
            |m| {
                m.consume1(|m, names| match names {
                    Value::Quote(name_values) => {
                        let mut idents = Vec::with_capacity(name_values.len());
                        for value in &name_values {
                            idents.push(identifier(":", value)?);
                        }
                        m.consume_n(idents.len(), |m, values| {
                            for (ident, value) in idents.iter().zip(values) {
                                m.define(Definition::from_quote(ident, vec![value]));
                            }
                            Ok(())
                        })
                    }
                    name => {
                        let ident = identifier(":", &name)?;
                        m.consume1(|m, value| {
                            m.define(Definition::from_quote(&ident, vec![value]));
                            Ok(())
                        })
                    }
                })
            },
        ),
    ]
}
