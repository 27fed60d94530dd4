//! Error types and the aggregate pipeline outcome.
//!
//! Two layers of failure exist in this crate:
//!
//! - [`Error`] — structural problems that abort the current operation:
//!   narrowing a document value as the wrong kind, a type with no registered
//!   converter, an unresolvable reference id, or malformed input text.
//! - [`Outcome`] — the aggregate result of a full serialize/deserialize call.
//!   It carries the final value (or the fatal error) together with the
//!   diagnostic notes accumulated along the way: unresolvable type tags,
//!   contained instance-construction failures, ignored lifecycle-hook errors.
//!
//! Data-quality problems degrade gracefully and surface as notes; programming
//! and configuration errors propagate as `Error`.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::{parse, Error};
//!
//! let result = parse("{\"open\": [1, 2");
//! assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// All errors produced by the document model, the printers/parser, and the
/// serialization pipeline.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A value was narrowed as a kind it does not hold.
    #[error("wrong document kind: expected {expected}, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    /// No converter is registered for a type the pipeline must handle.
    #[error("no converter registered for type {0}")]
    ConverterNotFound(String),

    /// A `$ref` id with no matching `$id` definition in the same document.
    #[error("no object definition registered for reference id {0}")]
    UnresolvedReference(u32),

    /// A version path step whose type has no migration transform.
    #[error("no migration transform registered for type {ty} (migrating from version {from})")]
    MissingMigration { ty: String, from: String },

    /// Malformed input text.
    #[error("syntax error at line {line}, column {col}: {msg}")]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
    },

    /// Input text ended mid-token or mid-structure.
    #[error("unexpected end of input at line {line}, column {col}: expected {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        expected: String,
    },

    /// Writer failure while emitting text.
    #[error("IO error: {0}")]
    Io(String),

    /// Free-form error, typically authored by a converter or migration.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a syntax error with position information.
    pub fn syntax(line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.into(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn eof(line: usize, col: usize, expected: impl Into<String>) -> Self {
        Error::UnexpectedEof {
            line,
            col,
            expected: expected.into(),
        }
    }

    /// Creates a wrong-kind error from two kind names.
    pub fn wrong_kind(expected: &'static str, found: &'static str) -> Self {
        Error::WrongKind { expected, found }
    }

    /// Creates a free-form error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// Creates an I/O error.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Aggregate outcome of one top-level pipeline call.
///
/// Wraps the final value (or fatal error) plus every diagnostic note recorded
/// during the traversal. Notes do not imply failure: a deserialization that
/// fell back to the declared type after an unknown `$type` tag succeeds with
/// one note.
///
/// # Examples
///
/// ```rust
/// use graphdoc::Outcome;
///
/// let outcome = Outcome::new(Ok(42), vec!["fell back to default".to_string()]);
/// assert!(outcome.succeeded());
/// assert_eq!(outcome.notes().len(), 1);
/// assert_eq!(outcome.into_result().unwrap(), 42);
/// ```
#[derive(Debug)]
#[must_use = "an Outcome may carry a fatal error or diagnostics that should be inspected"]
pub struct Outcome<T> {
    result: Result<T>,
    notes: Vec<String>,
}

impl<T> Outcome<T> {
    pub fn new(result: Result<T>, notes: Vec<String>) -> Self {
        Outcome { result, notes }
    }

    /// Returns `true` when the pipeline produced a value, notes or not.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    /// The produced value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// Diagnostic notes recorded during the traversal, in order.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Discards the notes and returns the underlying result.
    pub fn into_result(self) -> Result<T> {
        self.result
    }

    /// Splits the outcome into its result and notes.
    pub fn into_parts(self) -> (Result<T>, Vec<String>) {
        (self.result, self.notes)
    }

    /// Unwraps the value, panicking with the accumulated notes on failure.
    ///
    /// Diagnostic notes are tolerated; see [`Outcome::assert_clean`] for the
    /// stricter variant.
    #[track_caller]
    pub fn assert_success(self) -> T {
        match self.result {
            Ok(value) => value,
            Err(err) => panic!("pipeline failed: {err}\nnotes: {:?}", self.notes),
        }
    }

    /// Unwraps the value, panicking on failure *or* on any diagnostic note.
    #[track_caller]
    pub fn assert_clean(self) -> T {
        if !self.notes.is_empty() {
            panic!("pipeline produced diagnostics: {:?}", self.notes);
        }
        self.assert_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let ok: Outcome<i32> = Outcome::new(Ok(7), vec![]);
        assert!(ok.succeeded());
        assert_eq!(ok.value(), Some(&7));
        assert_eq!(ok.into_result().unwrap(), 7);

        let failed: Outcome<i32> =
            Outcome::new(Err(Error::custom("boom")), vec!["context".to_string()]);
        assert!(!failed.succeeded());
        assert!(failed.value().is_none());
        let (result, notes) = failed.into_parts();
        assert!(result.is_err());
        assert_eq!(notes, vec!["context".to_string()]);
    }

    #[test]
    #[should_panic(expected = "pipeline produced diagnostics")]
    fn test_assert_clean_rejects_notes() {
        Outcome::new(Ok(()), vec!["soft failure".to_string()]).assert_clean();
    }

    #[test]
    fn test_error_display() {
        let err = Error::wrong_kind("object", "int64");
        assert_eq!(
            err.to_string(),
            "wrong document kind: expected object, found int64"
        );

        let err = Error::syntax(3, 14, "unexpected token");
        assert!(err.to_string().contains("line 3"));
        assert!(err.to_string().contains("column 14"));
    }
}
