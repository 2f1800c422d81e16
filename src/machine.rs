//! Machine state and interpreter dispatch.
//!
//! A [`Machine`] owns the context stack (`nest`, a stack of working
//! stacks), the command dictionary, and the host interface. Tokens
//! flow through [`Machine::run_tokens`]: literals push values, `[`
//! opens a fresh context, `]` closes one into a quote value, and
//! terms resolve against the dictionary - except while a quote
//! literal is open, when terms are captured as command values instead
//! of executing.

use crate::builtins::{self, Action, Definition};
use crate::host::Host;
use crate::tokenizer::{self, Token};
use crate::value::Value;
use crate::{Error, MAX_CALL_DEPTH, MAX_NEST_DEPTH, ParseError, ParseErrorKind};
use std::collections::HashMap;

pub struct Machine {
    /// The context stack. The last entry is the live working stack;
    /// the first is the program's root stack and is never popped.
    nest: Vec<Vec<Value>>,
    defs: HashMap<String, Definition>,
    /// Current command recursion depth, bounded by [`MAX_CALL_DEPTH`]
    depth: usize,
    host: Box<dyn Host>,
}

impl Machine {
    pub fn new(host: Box<dyn Host>) -> Machine {
        Machine {
            nest: vec![Vec::new()],
            defs: builtins::new_dictionary(),
            depth: 0,
            host,
        }
    }

    /// The live working stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        self.top()
    }

    pub fn host(&mut self) -> &mut dyn Host {
        self.host.as_mut()
    }

    fn top(&self) -> &Vec<Value> {
        // The bottom context is never popped, so nest is nonempty.
        self.nest.last().expect("context stack is never empty")
    }

    fn top_mut(&mut self) -> &mut Vec<Value> {
        self.nest.last_mut().expect("context stack is never empty")
    }

    pub fn push(&mut self, value: Value) {
        self.top_mut().push(value);
    }

    pub fn pop(&mut self) -> Result<Value, Error> {
        self.top_mut().pop().ok_or(Error::StackUnderflow)
    }

    /// Replace the live context wholesale. Used by `quote-all`.
    pub(crate) fn take_context(&mut self) -> Vec<Value> {
        std::mem::take(self.top_mut())
    }

    // --- dictionary access -------------------------------------------------

    pub fn define(&mut self, def: Definition) {
        self.defs.insert(def.name.clone(), def);
    }

    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        self.defs.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// All defined names, lexicographically sorted.
    pub fn defined_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.defs.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn set_description(&mut self, name: &str, description: String) -> bool {
        match self.defs.get_mut(name) {
            Some(def) => {
                def.description = description;
                true
            }
            None => false,
        }
    }

    // --- rewind ------------------------------------------------------------

    /// Pop `n` values (bottom-first in the vector) and hand them to
    /// `f`. If `f` fails, the popped values are pushed back in their
    /// original order first, so the stack is observably unchanged.
    ///
    /// Builtins must do all fallible work before pushing results.
    pub(crate) fn consume_n<T>(
        &mut self,
        n: usize,
        f: impl FnOnce(&mut Machine, Vec<Value>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let top = self.top_mut();
        if top.len() < n {
            return Err(Error::StackUnderflow);
        }
        let popped = top.split_off(top.len() - n);
        let saved = popped.clone();
        match f(self, popped) {
            ok @ Ok(_) => ok,
            Err(err) => {
                self.top_mut().extend(saved);
                Err(err)
            }
        }
    }

    /// One-argument [`Machine::consume_n`].
    pub(crate) fn consume1<T>(
        &mut self,
        f: impl FnOnce(&mut Machine, Value) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.consume_n(1, |machine, mut values| {
            let a = values.pop().ok_or(Error::StackUnderflow)?;
            f(machine, a)
        })
    }

    /// Two-argument [`Machine::consume_n`]; `a` is the deeper value.
    pub(crate) fn consume2<T>(
        &mut self,
        f: impl FnOnce(&mut Machine, Value, Value) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.consume_n(2, |machine, mut values| {
            let b = values.pop().ok_or(Error::StackUnderflow)?;
            let a = values.pop().ok_or(Error::StackUnderflow)?;
            f(machine, a, b)
        })
    }

    /// Three-argument [`Machine::consume_n`]; `a` is the deepest.
    pub(crate) fn consume3<T>(
        &mut self,
        f: impl FnOnce(&mut Machine, Value, Value, Value) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.consume_n(3, |machine, mut values| {
            let c = values.pop().ok_or(Error::StackUnderflow)?;
            let b = values.pop().ok_or(Error::StackUnderflow)?;
            let a = values.pop().ok_or(Error::StackUnderflow)?;
            f(machine, a, b, c)
        })
    }

    // --- execution ---------------------------------------------------------

    /// Tokenize and run a complete program against this machine.
    pub fn run_source(&mut self, source: &str) -> Result<(), Error> {
        let tokens = tokenizer::tokenize(source)?;
        self.run_tokens(&tokens)
    }

    /// Run a token stream. Quote literals must balance within the
    /// stream: a stray `]` underflows, a leftover `[` is an error,
    /// and on any failure partially built literals are discarded.
    pub fn run_tokens(&mut self, tokens: &[Token]) -> Result<(), Error> {
        let base = self.nest.len();
        for token in tokens {
            if let Err(err) = self.run_token(token, base) {
                self.nest.truncate(base);
                return Err(err);
            }
        }
        if self.nest.len() > base {
            self.nest.truncate(base);
            return Err(Error::Parse(ParseError::new(
                ParseErrorKind::UnbalancedQuote,
                "quote literal opened with [ but never closed",
            )));
        }
        Ok(())
    }

    fn run_token(&mut self, token: &Token, base: usize) -> Result<(), Error> {
        match token {
            Token::LeftBracket => {
                if self.nest.len() - base >= MAX_NEST_DEPTH {
                    return Err(Error::RecursionLimit);
                }
                self.nest.push(Vec::new());
                Ok(())
            }
            Token::RightBracket => {
                if self.nest.len() <= base {
                    return Err(Error::ContextStackUnderflow);
                }
                let finished = self.nest.pop().ok_or(Error::ContextStackUnderflow)?;
                self.push(Value::Quote(finished));
                Ok(())
            }
            Token::Bool(b) => {
                self.push(Value::Bool(*b));
                Ok(())
            }
            Token::Int(n) => {
                self.push(Value::Int(*n));
                Ok(())
            }
            Token::Float(f) => {
                self.push(Value::Float(*f));
                Ok(())
            }
            Token::Str(s) => {
                self.push(Value::Str(s.clone()));
                Ok(())
            }
            Token::DeferredTerm(name) => {
                self.push(Value::Deferred(name.clone()));
                Ok(())
            }
            Token::Term(name) => {
                if self.nest.len() > base {
                    // Inside a quote literal: capture, don't execute
                    self.push(Value::Command(name.clone()));
                    Ok(())
                } else {
                    self.run_command(name)
                }
            }
        }
    }

    /// Resolve a name and execute its action.
    pub(crate) fn run_command(&mut self, name: &str) -> Result<(), Error> {
        let def = self
            .defs
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CommandUndefined(name.to_owned()))?;
        self.enter()?;
        let result = match &def.action {
            Action::Builtin(f) => f(self),
            Action::Quote(values) => self.run_quote(values),
        };
        self.leave();
        result
    }

    /// Interpret each value of a quote action: commands execute,
    /// everything else is pushed.
    pub(crate) fn run_quote(&mut self, values: &[Value]) -> Result<(), Error> {
        for value in values {
            self.handle_value(value)?;
        }
        Ok(())
    }

    pub(crate) fn handle_value(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Command(name) => self.run_command(name),
            other => {
                self.push(other.clone());
                Ok(())
            }
        }
    }

    /// Execute an action value: a quote runs element-wise, and a
    /// command, deferred command, or string is invoked by name.
    pub(crate) fn run_action(&mut self, action: &Value) -> Result<(), Error> {
        match action {
            Value::Quote(values) => {
                self.enter()?;
                let result = self.run_quote(values);
                self.leave();
                result
            }
            Value::Command(name) | Value::Deferred(name) | Value::Str(name) => {
                self.run_command(name)
            }
            other => Err(Error::wrong_type("do", "a quote or command", other)),
        }
    }

    /// Run an action in a jail: the context stack is shared, but any
    /// definitions made inside are discarded on return.
    pub(crate) fn run_jailed(
        &mut self,
        f: impl FnOnce(&mut Machine) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let saved = self.defs.clone();
        let result = f(self);
        self.defs = saved;
        result
    }

    /// Run `action` jailed against a fresh context seeded with
    /// `seed`, and return the resulting context. Used by `doin`,
    /// `map`, `filter`, and `any?`.
    pub(crate) fn run_in_child(
        &mut self,
        seed: Vec<Value>,
        action: &Value,
    ) -> Result<Vec<Value>, Error> {
        self.nest.push(seed);
        let result = self.run_jailed(|m| m.run_action(action));
        let context = self.nest.pop().ok_or(Error::ContextStackUnderflow)?;
        result.map(|()| context)
    }

    fn enter(&mut self) -> Result<(), Error> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(Error::RecursionLimit);
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemHost;
    use crate::value::{cmd, dfr, val};

    /// Expected outcomes for the table-driven machine tests.
    #[derive(Debug)]
    enum Expect {
        /// The program succeeds and leaves exactly this root stack
        Stack(Vec<Value>),
        /// The program fails with exactly this error, and the root
        /// stack equals the given values (the rewind property)
        FailsWith(Error, Vec<Value>),
    }
    use Expect::*;

    fn run_program(source: &str) -> (Result<(), Error>, Vec<Value>) {
        let mut machine = Machine::new(Box::new(MemHost::new()));
        let result = machine.run_source(source);
        let stack = machine.stack().to_vec();
        (result, stack)
    }

    fn run_machine_tests(cases: Vec<(&str, Expect)>) {
        for (i, (source, expected)) in cases.iter().enumerate() {
            let test_id = format!("machine test #{}", i + 1);
            let (result, stack) = run_program(source);
            match (result, expected) {
                (Ok(()), Stack(expected_stack)) => {
                    assert_eq!(
                        &stack, expected_stack,
                        "{test_id}: stack mismatch for '{source}'"
                    );
                }
                (Err(err), FailsWith(expected_err, expected_stack)) => {
                    assert_eq!(&err, expected_err, "{test_id}: error mismatch for '{source}'");
                    assert_eq!(
                        &stack, expected_stack,
                        "{test_id}: rewind violated for '{source}'"
                    );
                }
                (Ok(()), FailsWith(expected_err, _)) => {
                    panic!("{test_id}: expected {expected_err:?}, got stack {stack:?}");
                }
                (Err(err), Stack(_)) => {
                    panic!("{test_id}: expected success, got {err} for '{source}'");
                }
            }
        }
    }

    #[test]
    fn test_literals_and_quote_building() {
        run_machine_tests(vec![
            ("", Stack(vec![])),
            ("1 2 3", Stack(vec![val(1), val(2), val(3)])),
            ("true false", Stack(vec![val(true), val(false)])),
            ("1.5 \"two\"", Stack(vec![val(1.5), val("two")])),
            ("\\dup", Stack(vec![dfr("dup")])),
            ("[ ]", Stack(vec![val(Vec::<i64>::new())])),
            ("[ 1 2 3 ]", Stack(vec![val([1, 2, 3])])),
            // Terms inside a literal are captured, not executed
            ("[ 2 * ]", Stack(vec![Value::Quote(vec![val(2), cmd("*")])])),
            // Undefined terms are fine inside a literal
            (
                "[ no-such-command ]",
                Stack(vec![Value::Quote(vec![cmd("no-such-command")])]),
            ),
            (
                "[ 1 [ 2 [ 3 ] ] ]",
                Stack(vec![Value::Quote(vec![
                    val(1),
                    Value::Quote(vec![val(2), val([3])]),
                ])]),
            ),
            // Unmatched brackets
            ("]", FailsWith(Error::ContextStackUnderflow, vec![])),
            ("[ 1 ] ] ", FailsWith(Error::ContextStackUnderflow, vec![val([1])])),
            (
                "[ 1 2",
                FailsWith(
                    Error::Parse(ParseError::new(
                        ParseErrorKind::UnbalancedQuote,
                        "quote literal opened with [ but never closed",
                    )),
                    vec![],
                ),
            ),
        ]);
    }

    #[test]
    fn test_undefined_command() {
        run_machine_tests(vec![
            (
                "1 no-such-command",
                FailsWith(
                    Error::CommandUndefined("no-such-command".to_owned()),
                    vec![val(1)],
                ),
            ),
        ]);
    }

    #[test]
    fn test_spec_scenarios() {
        run_machine_tests(vec![
            ("1 2 +", Stack(vec![val(3)])),
            ("1 2 + 3 *", Stack(vec![val(9)])),
            ("[ 1 2 3 ] [ 2 * ] map", Stack(vec![val([2, 4, 6])])),
            ("[ 1 2 3 4 ] [ 2 gt? ] filter", Stack(vec![val([3, 4])])),
            (
                "\"a,b,c\" \",\" split",
                Stack(vec![val(["a", "b", "c"])]),
            ),
            ("[ \"a\" \"b\" \"c\" ] \"-\" join", Stack(vec![val("a-b-c")])),
            ("[ 3 1 2 ] sort", Stack(vec![val([1, 2, 3])])),
            (
                "1 0 /",
                FailsWith(Error::DivisionByZero, vec![val(1), val(0)]),
            ),
            ("[ 2 * ] \\double def! 3 double", Stack(vec![val(6)])),
        ]);
    }

    #[test]
    fn test_rewind_property() {
        // Each case fails; the stack must equal the pre-command state
        run_machine_tests(vec![
            ("+", FailsWith(Error::StackUnderflow, vec![])),
            ("1 +", FailsWith(Error::StackUnderflow, vec![val(1)])),
            (
                "1 \"x\" +",
                FailsWith(
                    Error::wrong_type("+", "two numbers", &val("x")),
                    vec![val(1), val("x")],
                ),
            ),
            (
                "5 0 %",
                FailsWith(Error::DivisionByZero, vec![val(5), val(0)]),
            ),
            (
                "9223372036854775807 1 +",
                FailsWith(Error::IntegerOverflow, vec![val(i64::MAX), val(1)]),
            ),
            (
                "-9223372036854775808 1 -",
                FailsWith(Error::IntegerUnderflow, vec![val(i64::MIN), val(1)]),
            ),
            (
                "[ 1 ] to-string",
                FailsWith(
                    Error::wrong_type("to-string", "a scalar value", &val([1])),
                    vec![val([1])],
                ),
            ),
            // Failure inside an invoked quote restores the action too
            (
                "1 0 [ / ] do!",
                FailsWith(
                    Error::DivisionByZero,
                    vec![val(1), val(0), Value::Quote(vec![cmd("/")])],
                ),
            ),
        ]);
    }

    #[test]
    fn test_definitions_persist_and_jail() {
        run_machine_tests(vec![
            // def! persists
            ("[ 2 * ] \\double def! 4 double double", Stack(vec![val(16)])),
            // Definitions made under do! persist
            (
                "[ [ 1 + ] \\inc def! ] do! 5 inc",
                Stack(vec![val(6)]),
            ),
            // Definitions made under do are discarded...
            (
                "[ [ 1 + ] \\inc def! ] do 5 inc",
                FailsWith(
                    Error::CommandUndefined("inc".to_owned()),
                    vec![val(5)],
                ),
            ),
            // ...but stack effects survive the jail
            ("[ 1 2 + ] do", Stack(vec![val(3)])),
            // Redefinition replaces
            (
                "[ 1 ] \\x def! [ 2 ] \\x def! x",
                Stack(vec![val(2)]),
            ),
        ]);
    }

    #[test]
    fn test_conditional_and_doin() {
        run_machine_tests(vec![
            ("[ 1 ] true do!?", Stack(vec![val(1)])),
            ("[ 1 ] false do!?", Stack(vec![])),
            ("[ 1 ] true do?", Stack(vec![val(1)])),
            ("[ 1 ] false do?", Stack(vec![])),
            // Condition coerces
            ("[ 1 ] \"nonempty\" do!?", Stack(vec![val(1)])),
            ("[ 1 ] 0 do!?", Stack(vec![])),
            // doin runs against its own context and repacks it
            (
                "7 [ 1 2 ] [ + ] doin",
                Stack(vec![val(7), val([3])]),
            ),
            (
                "[ 1 2 3 ] [ drop ] doin",
                Stack(vec![val([1, 2])]),
            ),
        ]);
    }

    #[test]
    fn test_deferred_and_eval() {
        run_machine_tests(vec![
            ("\\dup", Stack(vec![dfr("dup")])),
            ("3 \\dup do!", Stack(vec![val(3), val(3)])),
            ("\"1 2 +\" eval", Stack(vec![val(3)])),
            ("\"[ 1 2 ]\" eval", Stack(vec![val([1, 2])])),
            // eval shares the machine: definitions persist
            ("\"[ 9 ] \\\\nine def!\" eval nine", Stack(vec![val(9)])),
            (
                "\"]\" eval",
                FailsWith(Error::ContextStackUnderflow, vec![val("]")]),
            ),
        ]);
    }

    #[test]
    fn test_loop_swallows_terminating_error() {
        run_machine_tests(vec![
            // Sums until `+` underflows, then stops quietly
            ("1 1 1 [ + ] loop", Stack(vec![val(3)])),
            // Action must at least be invocable
            (
                "5 loop",
                FailsWith(
                    Error::wrong_type("loop", "a quote or command", &val(5)),
                    vec![val(5)],
                ),
            ),
        ]);
    }

    #[test]
    fn test_recursion_limit() {
        let (result, _) = run_program("[ x ] \\x def! x");
        assert_eq!(result, Err(Error::RecursionLimit));
    }

    #[test]
    fn test_multi_term_bind() {
        run_machine_tests(vec![
            // Single-term form with a deferred name
            ("3 \\x : x x +", Stack(vec![val(6)])),
            // Single-term form with a string name
            ("4 \"y\" : y", Stack(vec![val(4)])),
            // Multi-term form binds left-to-right in stack order
            ("1 2 [ a b ] : b a", Stack(vec![val(2), val(1)])),
            ("1 2 3 [ a b c ] : c b a", Stack(vec![val(3), val(2), val(1)])),
            // Partial pop must rewind completely
            (
                "1 [ a b ] :",
                FailsWith(
                    Error::StackUnderflow,
                    vec![val(1), Value::Quote(vec![cmd("a"), cmd("b")])],
                ),
            ),
        ]);
    }

    #[test]
    fn test_higher_order_laws() {
        run_machine_tests(vec![
            // map with the empty action is the identity on shape
            ("[ 1 2 3 ] [ ] map", Stack(vec![val([1, 2, 3])])),
            // filter true keeps everything, filter false drops all
            ("[ 1 2 3 ] [ true ] filter", Stack(vec![val([1, 2, 3])])),
            (
                "[ 1 2 3 ] [ false ] filter",
                Stack(vec![val(Vec::<i64>::new())]),
            ),
            ("[ ] [ ] map", Stack(vec![val(Vec::<i64>::new())])),
            // any? matches nonemptiness under a constant-true body
            ("[ 1 2 ] [ drop true ] any?", Stack(vec![val(true)])),
            ("[ ] [ drop true ] any?", Stack(vec![val(false)])),
            // map can grow or shrink the output per element
            ("[ 1 2 ] [ dup ] map", Stack(vec![val([1, 1, 2, 2])])),
            ("[ 1 2 ] [ drop ] map", Stack(vec![val(Vec::<i64>::new())])),
            // Bodies run jailed: definitions do not escape
            (
                "[ 1 ] [ [ 9 ] \\nine def! ] map nine",
                FailsWith(
                    Error::CommandUndefined("nine".to_owned()),
                    vec![val([1])],
                ),
            ),
        ]);
    }

    #[test]
    fn test_round_trip_through_eval() {
        run_machine_tests(vec![
            // Scalars round-trip through their printed form
            ("1 to-string eval", Stack(vec![val(1)])),
            ("2.5 to-string eval", Stack(vec![val(2.5)])),
            ("2.0 to-string eval", Stack(vec![val(2.0)])),
            ("true to-string eval", Stack(vec![val(true)])),
            ("\\dup to-string", Stack(vec![val("dup")])),
        ]);
    }
}
