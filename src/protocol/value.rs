//! Generic nested-list values
//!
//! SORT and THREAD arguments and responses are carried as parenthesized lists
//! of atoms, numbers and strings. This module defines that shape and a small
//! reader/writer for its textual form, e.g. `(4 5 (6) (7 8))`.

use std::fmt;
use std::mem;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    combinator::map,
    multi::fold_many0,
    sequence::{delimited, preceded},
};

use crate::config::DEFAULT_MAX_NESTING;
use crate::error::{Error, Result};

/// One element of a command argument list or response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Atom(String),
    Number(u32),
    Quoted(String),
    Nil,
    List(Vec<Value>),
}

impl Value {
    pub fn atom(text: impl Into<String>) -> Self {
        Value::Atom(text.into())
    }

    /// Returns the text of an atom or quoted string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Atom(text) | Value::Quoted(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Atom(_) => "atom",
            Value::Number(_) => "number",
            Value::Quoted(_) => "quoted string",
            Value::Nil => "NIL",
            Value::List(_) => "list",
        }
    }

    /// Reads a whitespace-separated sequence of values from one line of text,
    /// accepting lists nested up to [`DEFAULT_MAX_NESTING`] deep.
    pub fn parse_line(line: &str) -> Result<Vec<Value>> {
        Self::parse_line_with_limit(line, DEFAULT_MAX_NESTING)
    }

    /// Like [`Value::parse_line`], rejecting lists nested deeper than
    /// `max_depth` with [`Error::Syntax`].
    pub fn parse_line_with_limit(line: &str, max_depth: usize) -> Result<Vec<Value>> {
        // Enclosing lists, innermost last
        let mut open: Vec<Vec<Value>> = Vec::new();
        let mut current: Vec<Value> = Vec::new();
        let mut rest = line;

        loop {
            rest = rest.trim_start_matches([' ', '\t']);
            if rest.is_empty() {
                break;
            }

            let (after, token) = token(rest).map_err(|err| match err {
                nom::Err::Error(err) | nom::Err::Failure(err) => {
                    Error::Syntax(format!("unexpected input at {:?}", err.input))
                }
                nom::Err::Incomplete(_) => Error::Syntax("incomplete input".to_string()),
            })?;

            match token {
                Token::Open => {
                    if open.len() >= max_depth {
                        log::warn!("rejecting line with lists nested deeper than {max_depth}");
                        return Err(Error::Syntax(format!(
                            "lists nested deeper than {max_depth}"
                        )));
                    }
                    open.push(mem::take(&mut current));
                }
                Token::Close => {
                    let Some(parent) = open.pop() else {
                        return Err(Error::Syntax(format!("unexpected input at {rest:?}")));
                    };
                    let items = mem::replace(&mut current, parent);
                    current.push(Value::List(items));
                }
                Token::Scalar(value) => current.push(value),
            }
            rest = after;
        }

        if !open.is_empty() {
            return Err(Error::Syntax(format!("{} unterminated lists", open.len())));
        }

        log::trace!("read {} top-level values from {:?}", current.len(), line);
        Ok(current)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

/// Pieces still to be written by `Display`.
enum Pending<'a> {
    Value(&'a Value),
    Space,
    Close,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Pending::Value(self)];

        while let Some(pending) = stack.pop() {
            match pending {
                Pending::Space => f.write_str(" ")?,
                Pending::Close => f.write_str(")")?,
                Pending::Value(Value::Atom(text)) => f.write_str(text)?,
                Pending::Value(Value::Number(number)) => write!(f, "{number}")?,
                Pending::Value(Value::Quoted(text)) => write_quoted(f, text)?,
                Pending::Value(Value::Nil) => f.write_str("NIL")?,
                Pending::Value(Value::List(items)) => {
                    f.write_str("(")?;
                    stack.push(Pending::Close);
                    // Reverse pushes keep left-to-right order when popping
                    for (index, item) in items.iter().enumerate().rev() {
                        stack.push(Pending::Value(item));
                        if index > 0 {
                            stack.push(Pending::Space);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Flattens nested lists before they are freed so dropping a deep value
/// does not recurse once per level.
impl Drop for Value {
    fn drop(&mut self) {
        let Value::List(items) = self else {
            return;
        };

        let mut pending = mem::take(items);
        while let Some(mut value) = pending.pop() {
            if let Value::List(items) = &mut value {
                pending.append(items);
            }
        }
    }
}

// ==================== PRIMITIVE PARSERS ====================

enum Token {
    Open,
    Close,
    Scalar(Value),
}

fn atom(i: &str) -> IResult<&str, Value> {
    map(
        take_while1(|c: char| !c.is_control() && !matches!(c, ' ' | '(' | ')' | '"')),
        |text: &str| {
            if text.eq_ignore_ascii_case("NIL") {
                Value::Nil
            } else {
                Value::Atom(text.to_string())
            }
        },
    )(i)
}

fn quoted_char(i: &str) -> IResult<&str, &str> {
    preceded(tag("\\"), alt((tag("\\"), tag("\""))))(i)
}

fn quoted(i: &str) -> IResult<&str, Value> {
    map(
        delimited(
            tag("\""),
            fold_many0(
                alt((quoted_char, is_not("\r\n\"\\"))),
                String::new,
                |mut text: String, piece: &str| {
                    text.push_str(piece);
                    text
                },
            ),
            tag("\""),
        ),
        Value::Quoted,
    )(i)
}

fn token(i: &str) -> IResult<&str, Token> {
    alt((
        map(tag("("), |_| Token::Open),
        map(tag(")"), |_| Token::Close),
        map(alt((quoted, atom)), Token::Scalar),
    ))(i)
}
