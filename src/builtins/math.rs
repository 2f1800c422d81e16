//! Arithmetic.
//!
//! Two ints use checked 64-bit arithmetic; a failed operation names
//! the direction it failed in (overflow vs underflow, judged by the
//! operand signs). A mixed pair promotes both sides to f64. Division
//! and modulo refuse a zero divisor outright, and `%` is mathematical
//! modulo: the result carries the sign of the divisor.

use crate::Error;
use crate::builtins::Definition;
use crate::machine::Machine;
use crate::value::Value;

fn int_add(a: i64, b: i64) -> Result<i64, Error> {
    a.checked_add(b).ok_or(if b >= 0 {
        Error::IntegerOverflow
    } else {
        Error::IntegerUnderflow
    })
}

fn int_sub(a: i64, b: i64) -> Result<i64, Error> {
    a.checked_sub(b).ok_or(if b >= 0 {
        Error::IntegerUnderflow
    } else {
        Error::IntegerOverflow
    })
}

fn int_mul(a: i64, b: i64) -> Result<i64, Error> {
    a.checked_mul(b).ok_or(if (a < 0) == (b < 0) {
        Error::IntegerOverflow
    } else {
        Error::IntegerUnderflow
    })
}

fn int_div(a: i64, b: i64) -> Result<i64, Error> {
    if b == 0 {
        return Err(Error::DivisionByZero);
    }
    // i64::MIN / -1 is the one quotient that does not fit
    a.checked_div(b).ok_or(Error::IntegerOverflow)
}

fn int_rem(a: i64, b: i64) -> Result<i64, Error> {
    if b == 0 {
        return Err(Error::DivisionByZero);
    }
    let r = a.checked_rem(b).unwrap_or(0);
    if r != 0 && (r < 0) != (b < 0) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn float_add(a: f64, b: f64) -> Result<f64, Error> {
    Ok(a + b)
}

fn float_sub(a: f64, b: f64) -> Result<f64, Error> {
    Ok(a - b)
}

fn float_mul(a: f64, b: f64) -> Result<f64, Error> {
    Ok(a * b)
}

fn float_div(a: f64, b: f64) -> Result<f64, Error> {
    if b == 0.0 {
        return Err(Error::DivisionByZero);
    }
    Ok(a / b)
}

fn float_rem(a: f64, b: f64) -> Result<f64, Error> {
    if b == 0.0 {
        return Err(Error::DivisionByZero);
    }
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

/// A binary numeric command: checked on ints, promoting on floats.
fn binop(
    name: &'static str,
    description: &'static str,
    int_op: fn(i64, i64) -> Result<i64, Error>,
    float_op: fn(f64, f64) -> Result<f64, Error>,
) -> Definition {
    Definition::builtin(name, description, move |m: &mut Machine| {
        m.consume2(|m, a, b| {
            let result = match (&a, &b) {
                (Value::Int(x), Value::Int(y)) => Value::Int(int_op(*x, *y)?),
                (Value::Int(x), Value::Float(y)) => Value::Float(float_op(*x as f64, *y)?),
                (Value::Float(x), Value::Int(y)) => Value::Float(float_op(*x, *y as f64)?),
                (Value::Float(x), Value::Float(y)) => Value::Float(float_op(*x, *y)?),
                _ => {
                    let offender = if matches!(a, Value::Int(_) | Value::Float(_)) {
                        &b
                    } else {
                        &a
                    };
                    return Err(Error::wrong_type(name, "two numbers", offender));
                }
            };
            m.push(result);
            Ok(())
        })
    })
}

pub(crate) fn commands() -> Vec<Definition> {
    vec![
        binop("+", "( a b -- sum ) add two numbers", int_add, float_add),
        binop("-", "( a b -- difference ) subtract b from a", int_sub, float_sub),
        binop("*", "( a b -- product ) multiply two numbers", int_mul, float_mul),
        binop("/", "( a b -- quotient ) divide a by b", int_div, float_div),
        binop(
            "%",
            "( a b -- remainder ) mathematical modulo; the sign follows b",
            int_rem,
            float_rem,
        ),
        Definition::builtin("abs", "( a -- |a| ) absolute value", |m| {
            m.consume1(|m, a| {
                let result = match &a {
                    Value::Int(n) => Value::Int(n.checked_abs().ok_or(Error::IntegerOverflow)?),
                    Value::Float(f) => Value::Float(f.abs()),
                    other => return Err(Error::wrong_type("abs", "a number", other)),
                };
                m.push(result);
                Ok(())
            })
        }),
        Definition::builtin("rand", "( -- i ) a uniformly random integer", |m| {
            m.push(Value::Int(rand::random::<i64>()));
            Ok(())
        }),
    ]
}
