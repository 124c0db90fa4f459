use super::keywords;
use super::literal::LiteralStyle;
use super::{ConflictStyle, Database, Dialect, JoinStyle};

/// MySQL 8.0
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn database(&self) -> Database {
        Database::MySql
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn is_reserved(&self, word: &str) -> bool {
        keywords::is_reserved(keywords::MYSQL, word)
    }

    fn write_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    fn set_clause_table_alias(&self) -> bool {
        true
    }

    fn supports_multi_table_update(&self) -> bool {
        true
    }

    fn supports_multi_table_delete(&self) -> bool {
        true
    }

    fn update_join_style(&self) -> JoinStyle {
        JoinStyle::Join
    }

    fn delete_join_style(&self) -> JoinStyle {
        JoinStyle::Join
    }

    fn supports_only_default(&self) -> bool {
        true
    }

    fn supports_row_set_query(&self) -> bool {
        false
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::OnDuplicateKey
    }

    fn values_row_prefix(&self) -> &'static str {
        "ROW"
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle {
            backslash_escape: true,
            offset_keyword: "TIMESTAMP",
            ..LiteralStyle::default()
        }
    }

    fn write_limit_offset(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        use std::fmt::Write;
        match (limit, offset) {
            (Some(limit), Some(offset)) => {
                let _ = write!(out, " LIMIT {limit} OFFSET {offset}");
            }
            (Some(limit), None) => {
                let _ = write!(out, " LIMIT {limit}");
            }
            // MySQL has no OFFSET without LIMIT.
            (None, Some(offset)) => {
                let _ = write!(out, " LIMIT {} OFFSET {offset}", u64::MAX);
            }
            (None, None) => {}
        }
    }
}
