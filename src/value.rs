//! The tagged value model.
//!
//! Every datum the machine touches is exactly one [`Value`] variant.
//! The module also defines the two relations the whole vocabulary
//! leans on - a total order across all variants (used by `sort` and
//! the comparison commands) and the explicit coercions behind the
//! `to-*` commands - plus the canonical program-text rendering used
//! by `p`, `.s` and quote display.
//!
//! To build values in code and tests, use the ergonomic helpers:
//! - `val(42)`, `val("text")`, `val(true)` for literals
//! - `cmd("dup")` / `dfr("dup")` for command and deferred references
//! - `val(vec![...])` for quotes

use crate::Error;
use std::cmp::Ordering;

/// A single tagged value on the working stack.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    /// Signed 64-bit integer
    Int(i64),
    /// IEEE-754 binary64
    Float(f64),
    Str(String),
    /// A dictionary reference that executes when evaluated
    Command(String),
    /// A dictionary reference that stays inert until something like
    /// `do!` consumes it. Written `\name` in source.
    Deferred(String),
    /// An ordered sequence of values; data and code at once
    Quote(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        use Value::*;
        match self {
            Bool(_) => "bool",
            Int(_) => "int",
            Float(_) => "float",
            Str(_) => "string",
            Command(_) => "command",
            Deferred(_) => "deferred",
            Quote(_) => "quote",
        }
    }

    /// Ordering class for the cross-type total order. Ints and floats
    /// share a class so that mixed numeric pairs compare numerically;
    /// strings and commands share one so that identifier-byte equality
    /// stays consistent with the order (a class split there would make
    /// the comparison intransitive).
    fn class(&self) -> u8 {
        use Value::*;
        match self {
            Bool(_) => 0,
            Int(_) | Float(_) => 1,
            Str(_) | Command(_) => 2,
            Deferred(_) => 3,
            Quote(_) => 4,
        }
    }

    /// Total order over all values.
    ///
    /// Classes ascend `bool < numeric < string/command < deferred <
    /// quote`. Within the numeric class a mixed int/float pair is
    /// compared through `f64::total_cmp` (so NaN is ordered, above
    /// every finite float, and trichotomy holds for `lt?`/`eq?`/`gt?`).
    /// Strings and command identifiers compare by bytes, a string and
    /// a command with identical bytes comparing equal. Quotes compare
    /// lexicographically element by element.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Str(a) | Command(a), Str(b) | Command(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Deferred(a), Deferred(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Quote(a), Quote(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.total_cmp(y) {
                        Ordering::Equal => continue,
                        unequal => return unequal,
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.class().cmp(&other.class()),
        }
    }

    /// Truthiness. Total: every value coerces to a bool.
    pub fn into_bool(self) -> bool {
        use Value::*;
        match self {
            Bool(b) => b,
            Int(n) => n != 0,
            Float(f) => f != 0.0,
            Str(s) => !s.is_empty(),
            Quote(q) => !q.is_empty(),
            Command(_) | Deferred(_) => true,
        }
    }

    pub fn into_int(self) -> Result<i64, Error> {
        use Value::*;
        match self {
            Bool(b) => Ok(i64::from(b)),
            Int(n) => Ok(n),
            Float(f) => {
                let t = f.trunc();
                if t.is_nan() || t < i64::MIN as f64 || t > i64::MAX as f64 {
                    Err(Error::wrong_type("to-int", "a representable number", &Float(f)))
                } else {
                    Ok(t as i64)
                }
            }
            Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::wrong_type("to-int", "a decimal integer", &Str(s.clone()))),
            other => Err(Error::wrong_type("to-int", "a number, bool, or string", &other)),
        }
    }

    pub fn into_float(self) -> Result<f64, Error> {
        use Value::*;
        match self {
            Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
            Int(n) => Ok(n as f64),
            Float(f) => Ok(f),
            Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::wrong_type("to-float", "a decimal number", &Str(s.clone()))),
            other => Err(Error::wrong_type("to-float", "a number, bool, or string", &other)),
        }
    }

    /// The unquoted string form. Identifiers yield their name, scalars
    /// their canonical decimal/`true`/`false` rendering. Quotes have
    /// no string form and fail.
    pub fn into_string(self) -> Result<String, Error> {
        use Value::*;
        match self {
            Str(s) => Ok(s),
            Command(name) | Deferred(name) => Ok(name),
            Bool(b) => Ok(if b { "true" } else { "false" }.to_owned()),
            Int(n) => Ok(n.to_string()),
            Float(f) => Ok(float_repr(f)),
            quote @ Quote(_) => Err(Error::wrong_type("to-string", "a scalar value", &quote)),
        }
    }

    /// Total: quotes pass through, anything else is wrapped in a
    /// singleton quote.
    pub fn into_quote(self) -> Vec<Value> {
        match self {
            Value::Quote(q) => q,
            other => vec![other],
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

/// Canonical float rendering: Rust's shortest form, with `.0`
/// appended when the result would read back as an integer literal.
fn float_repr(f: f64) -> String {
    if !f.is_finite() {
        return f.to_string();
    }
    let s = f.to_string();
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Value::*;
        match self {
            Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Int(n) => write!(f, "{n}"),
            Float(x) => write!(f, "{}", float_repr(*x)),
            Command(name) => write!(f, "{name}"),
            Deferred(name) => write!(f, "\\{name}"),
            Str(s) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        '\0' => write!(f, "\\0")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")
            }
            Quote(values) => {
                write!(f, "[ ")?;
                for v in values {
                    write!(f, "{v} ")?;
                }
                write!(f, "]")
            }
        }
    }
}

// From conversions - enable .into() and the val() helper.

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Quote(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::Quote(arr.into_iter().map(|x| x.into()).collect())
    }
}

/// Helper for creating values - works great in mixed quotes
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper for creating command references
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn cmd<S: AsRef<str>>(name: S) -> Value {
    Value::Command(name.as_ref().to_owned())
}

/// Helper for creating deferred command references
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn dfr<S: AsRef<str>>(name: S) -> Value {
    Value::Deferred(name.as_ref().to_owned())
}
