use super::keywords;
use super::literal::{BytesStyle, LiteralStyle};
use super::{Database, Dialect, write_lock_wait};
use crate::ast::{Lock, LockMode};
use crate::error::CompileResult;
use std::fmt::Write;

/// Oracle 12c and later
#[derive(Debug, Clone, Copy, Default)]
pub struct Oracle;

impl Dialect for Oracle {
    fn database(&self) -> Database {
        Database::Oracle
    }

    fn is_reserved(&self, word: &str) -> bool {
        keywords::is_reserved(keywords::ORACLE, word)
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        let _ = write!(out, ":{index}");
    }

    fn table_alias_after_as(&self) -> bool {
        false
    }

    fn supports_values_statement(&self) -> bool {
        false
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle {
            bool_keywords: false,
            time_type: false,
            offset_keyword: "TIMESTAMP",
            bytes: BytesStyle::HexToRaw,
            ..LiteralStyle::default()
        }
    }

    fn write_limit_offset(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        if let Some(offset) = offset {
            let _ = write!(out, " OFFSET {offset} ROWS");
        }
        if let Some(limit) = limit {
            let _ = write!(out, " FETCH NEXT {limit} ROWS ONLY");
        }
    }

    fn write_lock(&self, out: &mut String, lock: &Lock) -> CompileResult<()> {
        if lock.mode == LockMode::Share {
            return Err(self.unsupported("FOR SHARE"));
        }
        out.push_str(" FOR UPDATE");
        write_lock_wait(out, lock.wait);
        Ok(())
    }
}
