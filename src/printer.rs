//! Text rendering of document values.
//!
//! Two renderers exist, both pure functions of the value:
//!
//! - [`to_string`] — compact, single-line, no spacing
//! - [`to_string_pretty`] — one element/entry per line, 2-space indentation
//!
//! Rendering rules:
//!
//! - floats always carry a decimal point (`7.0`, never `7`) so the parser can
//!   reconstruct the numeric kind from the text alone;
//! - non-finite floats render as `Infinity`, `-Infinity` and `NaN` — an
//!   intentional deviation from strict JSON that consumers must tolerate;
//! - strings escape control characters, the quote, the backslash and every
//!   code point outside printable ASCII, using the standard two-character
//!   escapes where defined and `\uXXXX` (with surrogate pairs) otherwise;
//! - an object whose sole entry is the `$content` wrapper prints as the inner
//!   value, so wrapped non-object payloads are textually indistinguishable
//!   from their unwrapped form.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::{doc, printer};
//!
//! let value = doc!({ "n": 7, "x": 7.0 });
//! assert_eq!(printer::to_string(&value), r#"{"n":7,"x":7.0}"#);
//! ```

use crate::meta::KEY_CONTENT;
use crate::{DocValue, Error, Result};
use std::io;

/// Renders a value as compact single-line text.
#[must_use]
pub fn to_string(value: &DocValue) -> String {
    let mut out = String::with_capacity(128);
    write_value(&mut out, value, None, 0);
    out
}

/// Renders a value with newlines and 2-space indentation.
#[must_use]
pub fn to_string_pretty(value: &DocValue) -> String {
    let mut out = String::with_capacity(256);
    write_value(&mut out, value, Some("  "), 0);
    out
}

/// Renders a value compactly into a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn to_writer<W: io::Write>(mut writer: W, value: &DocValue) -> Result<()> {
    writer
        .write_all(to_string(value).as_bytes())
        .map_err(|e| Error::io(&e.to_string()))
}

fn write_value(out: &mut String, value: &DocValue, indent: Option<&str>, depth: usize) {
    match value {
        DocValue::Null => out.push_str("null"),
        DocValue::Bool(true) => out.push_str("true"),
        DocValue::Bool(false) => out.push_str("false"),
        DocValue::Int(i) => out.push_str(&i.to_string()),
        DocValue::Float(f) => write_float(out, *f),
        DocValue::String(s) => write_string(out, s),
        DocValue::Array(arr) => write_array(out, arr, indent, depth),
        DocValue::Object(obj) => {
            // transparent unwrap: a lone $content entry prints as its payload
            if let Some((KEY_CONTENT, inner)) = obj.sole_entry() {
                write_value(out, inner, indent, depth);
                return;
            }
            write_object(out, obj, indent, depth);
        }
    }
}

/// Locale-invariant float formatting with a forced decimal point.
///
/// The reader reconstructs the numeric kind from the presence of a decimal
/// point, so `.0` is appended whenever default formatting omits it.
fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        let formatted = f.to_string();
        let needs_point =
            !formatted.contains('.') && !formatted.contains('e') && !formatted.contains('E');
        out.push_str(&formatted);
        if needs_point {
            out.push_str(".0");
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    // fast path: printable ASCII without quote/backslash copies verbatim
    if s
        .bytes()
        .all(|b| (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\')
    {
        out.push_str(s);
    } else {
        for ch in s.chars() {
            match ch {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{0008}' => out.push_str("\\b"),
                '\u{000C}' => out.push_str("\\f"),
                ch if (' '..='~').contains(&ch) => out.push(ch),
                ch => {
                    let mut units = [0u16; 2];
                    for unit in ch.encode_utf16(&mut units) {
                        out.push_str(&format!("\\u{:04X}", unit));
                    }
                }
            }
        }
    }
    out.push('"');
}

fn write_array(out: &mut String, arr: &[DocValue], indent: Option<&str>, depth: usize) {
    if arr.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    for (i, element) in arr.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_entry_break(out, indent, depth + 1);
        write_value(out, element, indent, depth + 1);
    }
    write_entry_break(out, indent, depth);
    out.push(']');
}

fn write_object(out: &mut String, obj: &crate::DocMap, indent: Option<&str>, depth: usize) {
    if obj.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_entry_break(out, indent, depth + 1);
        write_string(out, key);
        out.push(':');
        if indent.is_some() {
            out.push(' ');
        }
        write_value(out, value, indent, depth + 1);
    }
    write_entry_break(out, indent, depth);
    out.push('}');
}

fn write_entry_break(out: &mut String, indent: Option<&str>, depth: usize) {
    if let Some(unit) = indent {
        out.push('\n');
        for _ in 0..depth {
            out.push_str(unit);
        }
    }
}
