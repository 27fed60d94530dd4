//! Text → document value parsing.
//!
//! A hand-written, single-pass recursive-descent parser over the printed
//! form. It accepts everything the printers emit, which is JSON plus two
//! deliberate extensions:
//!
//! - the non-finite tokens `Infinity`, `-Infinity` and `NaN`;
//! - number tokens *without* a decimal point or exponent reconstruct as
//!   `Int`; with one, as `Float` — the presence of the point is how the
//!   numeric kind survives a round trip through text.
//!
//! Errors carry line and column information.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::{parse, DocValue};
//!
//! assert_eq!(parse("7").unwrap(), DocValue::Int(7));
//! assert_eq!(parse("7.0").unwrap(), DocValue::Float(7.0));
//! assert_eq!(parse("[1,\"two\"]").unwrap().count(), 2);
//! assert!(parse("{broken").is_err());
//! ```

use crate::{DocMap, DocValue, Error, Result};

/// Parses a complete document value from text.
///
/// Trailing whitespace is allowed; any other trailing input is an error.
///
/// # Errors
///
/// Returns [`Error::Syntax`] or [`Error::UnexpectedEof`] with line/column
/// positions on malformed input.
pub fn parse(input: &str) -> Result<DocValue> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if let Some(ch) = parser.peek_char() {
        return Err(parser.syntax(format!("unexpected trailing input starting with {ch:?}")));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(' ' | '\t' | '\n' | '\r')) {
            self.next_char();
        }
    }

    fn syntax(&self, msg: impl Into<String>) -> Error {
        Error::syntax(self.line, self.column, msg)
    }

    fn eof(&self, expected: &str) -> Error {
        Error::eof(self.line, self.column, expected)
    }

    /// Consumes `literal` or fails. The caller has already matched the first
    /// character.
    fn expect_literal(&mut self, literal: &str) -> Result<()> {
        for expected in literal.chars() {
            match self.next_char() {
                Some(ch) if ch == expected => {}
                Some(_) => return Err(self.syntax(format!("expected literal {literal:?}"))),
                None => return Err(self.eof(literal)),
            }
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<DocValue> {
        match self.peek_char() {
            None => Err(self.eof("a value")),
            Some('n') => {
                self.expect_literal("null")?;
                Ok(DocValue::Null)
            }
            Some('t') => {
                self.expect_literal("true")?;
                Ok(DocValue::Bool(true))
            }
            Some('f') => {
                self.expect_literal("false")?;
                Ok(DocValue::Bool(false))
            }
            Some('I') => {
                self.expect_literal("Infinity")?;
                Ok(DocValue::Float(f64::INFINITY))
            }
            Some('N') => {
                self.expect_literal("NaN")?;
                Ok(DocValue::Float(f64::NAN))
            }
            Some('"') => Ok(DocValue::String(self.parse_string()?)),
            Some('[') => self.parse_array(),
            Some('{') => self.parse_object(),
            Some('-' | '0'..='9') => self.parse_number(),
            Some(ch) => Err(self.syntax(format!("unexpected character {ch:?}"))),
        }
    }

    fn parse_number(&mut self) -> Result<DocValue> {
        let start = self.position;

        if self.peek_char() == Some('-') {
            self.next_char();
            // negative infinity shares the leading minus with numbers
            if self.peek_char() == Some('I') {
                self.expect_literal("Infinity")?;
                return Ok(DocValue::Float(f64::NEG_INFINITY));
            }
        }

        let mut is_float = false;
        while let Some(ch) = self.peek_char() {
            match ch {
                '0'..='9' => {
                    self.next_char();
                }
                '.' | 'e' | 'E' => {
                    is_float = true;
                    self.next_char();
                }
                '+' | '-' if is_float => {
                    // exponent sign
                    self.next_char();
                }
                _ => break,
            }
        }

        let text = &self.input[start..self.position];
        if is_float {
            text.parse::<f64>()
                .map(DocValue::Float)
                .map_err(|_| self.syntax(format!("invalid number {text:?}")))
        } else {
            match text.parse::<i64>() {
                Ok(i) => Ok(DocValue::Int(i)),
                // integer tokens beyond the i64 range degrade to floats
                Err(_) => text
                    .parse::<f64>()
                    .map(DocValue::Float)
                    .map_err(|_| self.syntax(format!("invalid number {text:?}"))),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        self.next_char(); // opening quote
        let mut result = String::new();

        loop {
            match self.next_char() {
                None => return Err(self.eof("closing '\"'")),
                Some('"') => return Ok(result),
                Some('\\') => match self.next_char() {
                    Some('"') => result.push('"'),
                    Some('\\') => result.push('\\'),
                    Some('/') => result.push('/'),
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('b') => result.push('\u{0008}'),
                    Some('f') => result.push('\u{000C}'),
                    Some('u') => result.push(self.parse_unicode_escape()?),
                    Some(other) => {
                        return Err(self.syntax(format!("unknown escape sequence \\{other}")))
                    }
                    None => return Err(self.eof("an escape character")),
                },
                Some(ch) => result.push(ch),
            }
        }
    }

    /// Decodes `\uXXXX`, recombining UTF-16 surrogate pairs.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let high = self.parse_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            // high surrogate: a low surrogate escape must follow
            if self.next_char() != Some('\\') || self.next_char() != Some('u') {
                return Err(self.syntax("unpaired surrogate in unicode escape"));
            }
            let low = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.syntax("invalid low surrogate in unicode escape"));
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(code).ok_or_else(|| self.syntax("invalid unicode code point"))
        } else if (0xDC00..0xE000).contains(&high) {
            Err(self.syntax("unpaired surrogate in unicode escape"))
        } else {
            char::from_u32(high).ok_or_else(|| self.syntax("invalid unicode code point"))
        }
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            match self.next_char() {
                Some(ch) if ch.is_ascii_hexdigit() => {
                    value = value * 16 + ch.to_digit(16).unwrap_or(0);
                }
                Some(_) => {
                    return Err(self.syntax("invalid unicode escape (expected 4 hex digits)"))
                }
                None => return Err(self.eof("4 hex digits")),
            }
        }
        Ok(value)
    }

    fn parse_array(&mut self) -> Result<DocValue> {
        self.next_char(); // '['
        let mut elements = Vec::new();

        self.skip_whitespace();
        if self.peek_char() == Some(']') {
            self.next_char();
            return Ok(DocValue::Array(elements));
        }

        loop {
            self.skip_whitespace();
            elements.push(self.parse_value()?);
            self.skip_whitespace();
            match self.next_char() {
                Some(',') => continue,
                Some(']') => return Ok(DocValue::Array(elements)),
                Some(_) => return Err(self.syntax("expected ',' or ']' in array")),
                None => return Err(self.eof("',' or ']'")),
            }
        }
    }

    fn parse_object(&mut self) -> Result<DocValue> {
        self.next_char(); // '{'
        let mut map = DocMap::new();

        self.skip_whitespace();
        if self.peek_char() == Some('}') {
            self.next_char();
            return Ok(DocValue::Object(map));
        }

        loop {
            self.skip_whitespace();
            if self.peek_char() != Some('"') {
                return Err(self.syntax("expected '\"' to start an object key"));
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            match self.next_char() {
                Some(':') => {}
                Some(_) => return Err(self.syntax("expected ':' after object key")),
                None => return Err(self.eof("':'")),
            }
            self.skip_whitespace();
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.next_char() {
                Some(',') => continue,
                Some('}') => return Ok(DocValue::Object(map)),
                Some(_) => return Err(self.syntax("expected ',' or '}' in object")),
                None => return Err(self.eof("',' or '}'")),
            }
        }
    }
}
