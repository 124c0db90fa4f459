use super::keywords;
use super::literal::LiteralStyle;
use super::{ConflictStyle, Database, Dialect, JoinStyle};
use crate::ast::Lock;
use crate::error::CompileResult;
use std::fmt::Write;

/// SQLite 3.35 and later
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn database(&self) -> Database {
        Database::Sqlite
    }

    fn is_reserved(&self, word: &str) -> bool {
        keywords::is_reserved(keywords::SQLITE, word)
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        let _ = write!(out, "?{index}");
    }

    fn supports_lateral(&self) -> bool {
        false
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn update_join_style(&self) -> JoinStyle {
        JoinStyle::From
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::OnConflict
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle {
            bool_keywords: false,
            typed_temporal: false,
            ..LiteralStyle::default()
        }
    }

    fn write_limit_offset(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        match (limit, offset) {
            (Some(limit), Some(offset)) => {
                let _ = write!(out, " LIMIT {limit} OFFSET {offset}");
            }
            (Some(limit), None) => {
                let _ = write!(out, " LIMIT {limit}");
            }
            (None, Some(offset)) => {
                let _ = write!(out, " LIMIT -1 OFFSET {offset}");
            }
            (None, None) => {}
        }
    }

    fn write_lock(&self, _out: &mut String, _lock: &Lock) -> CompileResult<()> {
        Err(self.unsupported("row lock clause"))
    }
}
