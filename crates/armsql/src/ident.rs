//! Safe SQL identifier rendering.
//!
//! Table, column, and alias names come from metadata or statement aliases. They are written
//! bare when that is safe and quoted otherwise:
//!
//! - Bare names must match `[A-Za-z_][A-Za-z0-9_$]*` and must not be a reserved word of the
//!   dialect.
//! - Quoted names allow any character except NUL; the dialect's quote character is doubled.
//! - A name already wrapped in the dialect's quote character is written unchanged, so
//!   rendering is idempotent.

use crate::error::{CompileError, CompileResult};
use serde::Deserialize;

/// When identifiers are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum QuoteMode {
    /// Quote only reserved words and names that are not simple.
    #[default]
    Reserved,
    /// Quote every identifier.
    Always,
}

/// Whether `name` can be written without quotes (ignoring reserved words).
pub fn is_simple(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

/// Whether `name` is already quoted with `quote`, with every inner quote doubled.
pub fn is_quoted(name: &str, quote: char) -> bool {
    let q = quote.len_utf8();
    if name.len() < 2 * q + 1 || !name.starts_with(quote) || !name.ends_with(quote) {
        return false;
    }
    let inner = &name[q..name.len() - q];
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == quote && chars.next() != Some(quote) {
            return false;
        }
    }
    true
}

/// Write `name` wrapped in `quote`, doubling any embedded quote character.
pub(crate) fn write_quoted(out: &mut String, name: &str, quote: char) {
    out.push(quote);
    for ch in name.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
}

/// Write `name` bare or quoted.
///
/// `reserved` tells whether the (bare) name collides with a keyword of the dialect.
pub(crate) fn write_identifier(
    out: &mut String,
    name: &str,
    quote: char,
    mode: QuoteMode,
    reserved: impl Fn(&str) -> bool,
) -> CompileResult<()> {
    if name.is_empty() {
        return Err(CompileError::InvalidIdent("empty identifier".to_string()));
    }
    if name.contains('\0') {
        return Err(CompileError::InvalidIdent(format!(
            "identifier cannot contain NUL character: {name:?}"
        )));
    }
    if is_quoted(name, quote) {
        out.push_str(name);
    } else if mode == QuoteMode::Reserved && is_simple(name) && !reserved(name) {
        out.push_str(name);
    } else {
        write_quoted(out, name, quote);
    }
    Ok(())
}
