//! Catena - a concatenative stack interpreter
//!
//! This crate implements a small stack-oriented command language meant
//! for shell-style composition: values flow through a single working
//! stack, and named commands consume and produce values on that stack.
//!
//! ```text
//! $ catena '1 2 + p'
//! 3
//! $ catena '[ 1 2 3 ] [ 2 * ] map p'
//! [ 2 4 6 ]
//! ```
//!
//! Programs are whitespace-separated tokens. `[` and `]` build quote
//! literals (first-class value sequences that double as executable
//! program fragments), `\name` pushes a command by name without
//! invoking it, and everything else is either a literal or a command
//! reference resolved against the dictionary.
//!
//! ## Modules
//!
//! - `value`: the tagged value model, ordering and coercions
//! - `tokenizer`: source text to token stream
//! - `machine`: the working stack, nested contexts, dispatch
//! - `builtins`: the standard command vocabulary
//! - `host`: the interface to the surrounding process and OS

use std::fmt;

/// Maximum nesting of quote literals in a single program.
///
/// Literal construction is iterative (an explicit stack of contexts),
/// so this is a sanity cap rather than a host-stack guard.
pub const MAX_NEST_DEPTH: usize = 1024;

/// Maximum command recursion depth during execution.
///
/// Quote actions may invoke further commands; an unbounded
/// self-reference like `[ x ] \x def! x` would otherwise overflow the
/// host stack.
pub const MAX_CALL_DEPTH: usize = 64;

/// Upper bound on a single `readf`, in bytes. Files larger than this
/// are refused rather than silently truncated.
pub const MAX_READ_BYTES: u64 = 1 << 16;

/// Categorizes the different kinds of tokenizer failures.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// A string literal was opened but never closed
    UnterminatedString,
    /// A backslash escape inside a string was not one of the known set
    BadEscape,
    /// A `\` with no command name attached to it
    BareBackslash,
    /// A `[` was opened and never closed by the end of the program
    UnbalancedQuote,
    /// Anything else the tokenizer could not make sense of
    InvalidSyntax,
}

/// A structured error describing a tokenizer failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Snippet of the source showing where the failure occurred
    pub context: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Attach a context snippet extracted from `source` at `offset`.
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        source: &str,
        offset: usize,
    ) -> Self {
        const MAX_CONTEXT: usize = 40;

        let start = offset.saturating_sub(10);
        let snippet: String = source.chars().skip(start).take(MAX_CONTEXT).collect();

        let mut context = String::new();
        if start > 0 {
            context.push_str("[...]");
        }
        context.push_str(&snippet.replace('\n', "\\n"));
        if start + snippet.len() < source.len() {
            context.push_str("[...]");
        }

        ParseError {
            kind,
            message: message.into(),
            context: Some(context),
        }
    }
}

/// Error kinds surfaced by the interpreter.
///
/// Every command that pops arguments restores them before returning
/// one of these, so a failed command is observably equivalent to the
/// command never having run (the rewind property). The driver renders
/// the error and either continues (REPL) or exits nonzero (scripts).
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Pop from an empty working stack
    StackUnderflow,
    /// `]` with no matching `[`
    ContextStackUnderflow,
    /// An identifier that resolves to nothing in the dictionary
    CommandUndefined(String),
    IntegerOverflow,
    IntegerUnderflow,
    DivisionByZero,
    /// A coercion or argument type check failed
    WrongType(String),
    /// The host could not name its own process
    ProcessNameUnknown,
    /// The host lacks the capability a command needs
    Unsupported(&'static str),
    /// A host I/O hook failed
    Io(String),
    /// The tokenizer could not produce a token
    Parse(ParseError),
    /// Command recursion exceeded [`MAX_CALL_DEPTH`]
    RecursionLimit,
    /// Control tag carrying `quit`/`exit` out of a restricted host.
    /// Not a failure: the driver maps it to a process exit.
    Exit(u8),
}

impl Error {
    /// Build a `WrongType` in the canonical "wanted X, got Y" shape.
    pub fn wrong_type(context: &str, wanted: &str, got: &crate::value::Value) -> Self {
        Error::WrongType(format!(
            "{context}: wanted {wanted}, got {} ({got})",
            got.type_name()
        ))
    }

    pub fn io(message: impl Into<String>) -> Self {
        Error::Io(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::StackUnderflow => write!(f, "stack underflow"),
            Error::ContextStackUnderflow => write!(f, "unmatched ] with no open quote"),
            Error::CommandUndefined(name) => write!(f, "\"{name}\" is not defined"),
            Error::IntegerOverflow => write!(f, "integer overflow"),
            Error::IntegerUnderflow => write!(f, "integer underflow"),
            Error::DivisionByZero => write!(f, "division by zero"),
            Error::WrongType(msg) => write!(f, "wrong type: {msg}"),
            Error::ProcessNameUnknown => write!(f, "the process name is unknown"),
            Error::Unsupported(what) => write!(f, "{what} is not supported on this host"),
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
            Error::Parse(e) => {
                write!(f, "parse error: {}", e.message)?;
                if let Some(context) = &e.context {
                    write!(f, " near: {context}")?;
                }
                Ok(())
            }
            Error::RecursionLimit => {
                write!(f, "recursion limit exceeded (max depth: {MAX_CALL_DEPTH})")
            }
            Error::Exit(code) => write!(f, "exit with status {code}"),
        }
    }
}

pub mod builtins;
pub mod host;
pub mod machine;
pub mod tokenizer;
pub mod value;
