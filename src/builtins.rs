//! The standard command vocabulary.
//!
//! A dictionary maps identifier bytes to a [`Definition`]: a name, a
//! usage description, and an action that is either a native function
//! over the machine or a quote to be interpreted. [`new_dictionary`]
//! assembles the whole vocabulary from the topical submodules.
//!
//! Native actions follow one calling convention: pop arguments
//! through the machine's `consume*` helpers (which restore them if
//! anything fails), do every fallible step, and only then push
//! results. That single rule is what makes a failed command
//! indistinguishable from one that never ran.

use crate::Error;
use crate::machine::Machine;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

pub mod coerce;
pub mod compare;
pub mod dict;
pub mod exec;
pub mod io;
pub mod math;
pub mod quotes;
pub mod stack;
pub mod strings;
pub mod system;

/// Native command implementation: acts on the whole machine.
pub type CommandFn = dyn Fn(&mut Machine) -> Result<(), Error> + Send + Sync;

#[derive(Clone)]
pub enum Action {
    Builtin(Arc<CommandFn>),
    Quote(Vec<Value>),
}

/// One dictionary entry.
#[derive(Clone)]
pub struct Definition {
    pub name: String,
    /// Shown by `usage`; starts with the stack effect for builtins
    pub description: String,
    pub action: Action,
}

impl Definition {
    pub fn builtin(
        name: &str,
        description: &str,
        action: impl Fn(&mut Machine) -> Result<(), Error> + Send + Sync + 'static,
    ) -> Definition {
        Definition {
            name: name.to_owned(),
            description: description.to_owned(),
            action: Action::Builtin(Arc::new(action)),
        }
    }

    /// A user definition: a quote interpreted value by value.
    pub fn from_quote(name: &str, values: Vec<Value>) -> Definition {
        Definition {
            name: name.to_owned(),
            description: String::new(),
            action: Action::Quote(values),
        }
    }
}

impl Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.action {
            Action::Builtin(_) => write!(f, "{} <builtin>", self.name),
            Action::Quote(values) => {
                write!(f, "{} {}", self.name, Value::Quote(values.clone()))
            }
        }
    }
}

/// Extract an identifier from a value naming a definition: a string,
/// command, or deferred command.
pub(crate) fn identifier(context: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::Str(name) | Value::Command(name) | Value::Deferred(name) => Ok(name.clone()),
        other => Err(Error::wrong_type(
            context,
            "a name (string, command, or deferred command)",
            other,
        )),
    }
}

pub(crate) fn expect_string(context: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(Error::wrong_type(context, "a string", other)),
    }
}

pub(crate) fn expect_quote(context: &str, value: &Value) -> Result<Vec<Value>, Error> {
    match value {
        Value::Quote(values) => Ok(values.clone()),
        other => Err(Error::wrong_type(context, "a quote", other)),
    }
}

/// Assemble the standard dictionary.
pub fn new_dictionary() -> HashMap<String, Definition> {
    let mut dictionary = HashMap::new();
    let all = stack::commands()
        .into_iter()
        .chain(dict::commands())
        .chain(exec::commands())
        .chain(math::commands())
        .chain(compare::commands())
        .chain(strings::commands())
        .chain(quotes::commands())
        .chain(coerce::commands())
        .chain(io::commands())
        .chain(system::commands());
    for definition in all {
        dictionary.insert(definition.name.clone(), definition);
    }
    dictionary
}
