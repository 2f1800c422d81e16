//! The tokenizer: source bytes to a token stream.
//!
//! Programs are whitespace-separated tokens. `[` and `]` always stand
//! alone, `"` opens an escaped string literal, `\word` is a deferred
//! term, and any other maximal run of non-delimiter bytes is a *word*
//! classified in order: bool, int, float, bare term. A `#` at a token
//! boundary discards the rest of the line, which makes both shebang
//! lines and trailing comments work.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::value,
    error::ErrorKind,
};

use crate::{Error, ParseError, ParseErrorKind};

/// One lexical token of a program.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftBracket,
    RightBracket,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A command reference to be resolved against the dictionary
    Term(String),
    /// `\name`: a command reference pushed as a value
    DeferredTerm(String),
}

/// Bytes that end a word: whitespace, brackets, and the string quote.
fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !"[]\"".contains(c)
}

/// Skip whitespace, and any comment opened by a `#` at a token
/// boundary (through the end of its line).
fn skip_atmosphere(mut input: &str) -> &str {
    loop {
        let trimmed = input.trim_start_matches([' ', '\t', '\n', '\r']);
        match trimmed.strip_prefix('#') {
            Some(rest) => {
                input = match rest.find('\n') {
                    Some(i) => &rest[i + 1..],
                    None => "",
                };
            }
            None => return trimmed,
        }
    }
}

fn lex_bracket(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::LeftBracket, char('[')),
        value(Token::RightBracket, char(']')),
    ))
    .parse(input)
}

/// Lex a double-quoted string literal with backslash escapes.
fn lex_string(input: &str) -> IResult<&str, Token> {
    let (mut remaining, _) = char('"').parse(input)?;
    let mut chars = String::new();

    loop {
        let mut char_iter = remaining.chars();
        match char_iter.next() {
            Some('"') => return Ok((char_iter.as_str(), Token::Str(chars))),
            Some('\\') => {
                match char_iter.next() {
                    Some('n') => chars.push('\n'),
                    Some('t') => chars.push('\t'),
                    Some('r') => chars.push('\r'),
                    Some('0') => chars.push('\0'),
                    Some('\\') => chars.push('\\'),
                    Some('"') => chars.push('"'),
                    Some(_) => {
                        return Err(nom::Err::Failure(nom::error::Error::new(
                            remaining,
                            ErrorKind::Escaped,
                        )));
                    }
                    // Backslash at end of input: the literal is also
                    // unterminated, but the escape is what went wrong
                    None => {
                        return Err(nom::Err::Failure(nom::error::Error::new(
                            remaining,
                            ErrorKind::Escaped,
                        )));
                    }
                }
                remaining = char_iter.as_str();
            }
            Some(ch) => {
                chars.push(ch);
                remaining = char_iter.as_str();
            }
            None => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    remaining,
                    ErrorKind::Eof,
                )));
            }
        }
    }
}

/// Lex `\word` into a deferred term. A lone `\` is an error.
fn lex_deferred(input: &str) -> IResult<&str, Token> {
    let (rest, _) = char('\\').parse(input)?;
    match take_while1(is_word_char).parse(rest) {
        Ok((rest, word)) => Ok((rest, Token::DeferredTerm(word.to_owned()))),
        Err(nom::Err::Error(_)) => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::Char,
        ))),
        Err(other) => Err(other),
    }
}

fn lex_word(input: &str) -> IResult<&str, Token> {
    let (rest, word) = take_while1(is_word_char).parse(input)?;
    Ok((rest, classify_word(word)))
}

/// Word classification order: bool, int, float, bare term.
///
/// A digit run too large for `i64` carries no float marker and so
/// falls through to a bare term (surfacing later as an undefined
/// command); anything that merely *contains* digits is a term too.
fn classify_word(word: &str) -> Token {
    match word {
        "true" => return Token::Bool(true),
        "false" => return Token::Bool(false),
        _ => {}
    }
    if let Ok(n) = word.parse::<i64>() {
        return Token::Int(n);
    }
    if word.contains(['.', 'e', 'E'])
        && let Ok(f) = word.parse::<f64>()
    {
        return Token::Float(f);
    }
    Token::Term(word.to_owned())
}

fn next_token(input: &str) -> IResult<&str, Token> {
    alt((lex_bracket, lex_string, lex_deferred, lex_word)).parse(input)
}

/// Convert a nom failure into a structured [`ParseError`].
fn lex_error(source: &str, err: nom::Err<nom::error::Error<&str>>) -> Error {
    let (kind, message, remaining_len) = match &err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let (kind, message) = match e.code {
                ErrorKind::Eof => (
                    ParseErrorKind::UnterminatedString,
                    "unterminated string literal",
                ),
                ErrorKind::Escaped => (ParseErrorKind::BadEscape, "unknown string escape"),
                ErrorKind::Char => (
                    ParseErrorKind::BareBackslash,
                    "expected a command name after \\",
                ),
                _ => (ParseErrorKind::InvalidSyntax, "could not read a token"),
            };
            (kind, message, e.input.len())
        }
        nom::Err::Incomplete(_) => (ParseErrorKind::InvalidSyntax, "incomplete input", 0),
    };
    let offset = source.len().saturating_sub(remaining_len);
    Error::Parse(ParseError::with_context(kind, message, source, offset))
}

/// Tokenize a whole program.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut rest = skip_atmosphere(source);

    while !rest.is_empty() {
        let (next, token) = next_token(rest).map_err(|e| lex_error(source, e))?;
        tokens.push(token);
        rest = skip_atmosphere(next);
    }

    Ok(tokens)
}
