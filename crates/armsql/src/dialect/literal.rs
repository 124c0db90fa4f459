//! Literal rendering shared by all dialects.

use crate::error::{CompileError, CompileResult};
use crate::meta::MappingType;
use crate::value::Value;
use std::fmt::Write;

/// How binary values are written inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytesStyle {
    /// `X'0aff'`
    HexString,
    /// `'\x0aff'::bytea`
    PgBytea,
    /// `HEXTORAW('0aff')`
    HexToRaw,
}

/// Per-dialect literal rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralStyle {
    /// `TRUE`/`FALSE` instead of `1`/`0`.
    pub bool_keywords: bool,
    /// Backslash is an escape character inside string literals.
    pub backslash_escape: bool,
    /// Temporal literals carry a type keyword (`TIMESTAMP '...'`).
    pub typed_temporal: bool,
    /// The product has a TIME type.
    pub time_type: bool,
    /// Keyword used for offset date-times.
    pub offset_keyword: &'static str,
    pub bytes: BytesStyle,
}

impl Default for LiteralStyle {
    fn default() -> Self {
        Self {
            bool_keywords: true,
            backslash_escape: false,
            typed_temporal: true,
            time_type: true,
            offset_keyword: "TIMESTAMP WITH TIME ZONE",
            bytes: BytesStyle::HexString,
        }
    }
}

pub(super) fn write_literal(
    style: LiteralStyle,
    dialect: &'static str,
    out: &mut String,
    mapping: MappingType,
    value: &Value,
) -> CompileResult<()> {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Bool(b) => write_bool(style, out, *b),
        Value::I16(v) => write_number(out, v),
        Value::I32(v) => write_number(out, v),
        Value::I64(v) => write_number(out, v),
        Value::BigInt(v) | Value::Decimal(v) => write_number(out, v),
        Value::F32(v) if v.is_finite() => write_number(out, v),
        Value::F64(v) if v.is_finite() => write_number(out, v),
        Value::F32(_) | Value::F64(_) => {
            return Err(CompileError::unsupported(dialect, "non-finite float literal"));
        }
        Value::Text(s) => write_string(style, out, s),
        Value::Json(j) => write_string(style, out, &j.to_string()),
        Value::Uuid(u) => write_string(style, out, &u.to_string()),
        Value::Bytes(b) => write_bytes(style, out, b),
        Value::Date(d) => write_temporal(style, out, "DATE", &d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => {
            if !style.time_type {
                return Err(CompileError::unsupported(dialect, "TIME literal"));
            }
            write_temporal(style, out, "TIME", &t.format("%H:%M:%S%.f").to_string())
        }
        Value::DateTime(dt) => write_temporal(
            style,
            out,
            "TIMESTAMP",
            &dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        ),
        Value::OffsetDateTime(dt) | Value::ZonedDateTime(dt) => {
            let text = dt.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string();
            // Zone-less mappings keep the offset text but use the plain keyword.
            let keyword = if mapping == MappingType::TimestampTz {
                style.offset_keyword
            } else {
                "TIMESTAMP"
            };
            write_temporal(style, out, keyword, &text)
        }
    }
    Ok(())
}

fn write_bool(style: LiteralStyle, out: &mut String, b: bool) {
    out.push_str(match (style.bool_keywords, b) {
        (true, true) => "TRUE",
        (true, false) => "FALSE",
        (false, true) => "1",
        (false, false) => "0",
    });
}

fn write_number(out: &mut String, n: impl std::fmt::Display) {
    let _ = write!(out, "{n}");
}

fn write_string(style: LiteralStyle, out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' if style.backslash_escape => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
}

fn write_temporal(style: LiteralStyle, out: &mut String, keyword: &str, text: &str) {
    if style.typed_temporal {
        out.push_str(keyword);
        out.push(' ');
    }
    out.push('\'');
    out.push_str(text);
    out.push('\'');
}

fn write_bytes(style: LiteralStyle, out: &mut String, bytes: &[u8]) {
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    match style.bytes {
        BytesStyle::HexString => {
            let _ = write!(out, "X'{hex}'");
        }
        BytesStyle::PgBytea => {
            let _ = write!(out, "'\\x{hex}'::bytea");
        }
        BytesStyle::HexToRaw => {
            let _ = write!(out, "HEXTORAW('{hex}')");
        }
    }
}
