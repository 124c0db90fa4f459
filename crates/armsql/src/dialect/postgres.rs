use super::keywords;
use super::literal::{BytesStyle, LiteralStyle};
use super::{ConflictStyle, Database, Dialect, JoinStyle};
use std::fmt::Write;

/// PostgreSQL
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn database(&self) -> Database {
        Database::PostgreSql
    }

    fn is_reserved(&self, word: &str) -> bool {
        keywords::is_reserved(keywords::POSTGRES, word)
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        let _ = write!(out, "${index}");
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn update_join_style(&self) -> JoinStyle {
        JoinStyle::From
    }

    fn delete_join_style(&self) -> JoinStyle {
        JoinStyle::From
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::OnConflict
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle {
            bytes: BytesStyle::PgBytea,
            ..LiteralStyle::default()
        }
    }
}
