//! Database dialects.
//!
//! A [`Dialect`] is selected once per [`Compiler`](crate::Compiler) from a [`Database`] and
//! queried (never mutated) during compilation. Differences between products are expressed as
//! capability flags and small rendering hooks; the statement compilers contain no
//! per-product branches.

mod h2;
mod keywords;
mod literal;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

pub use h2::H2;
pub use literal::{BytesStyle, LiteralStyle};
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use crate::ast::{Lock, LockMode, LockWait};
use crate::error::{CompileError, CompileResult};
use crate::meta::MappingType;
use crate::value::Value;
use serde::Deserialize;
use std::fmt;
use std::fmt::Write;

/// Supported database products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum Database {
    MySql,
    #[default]
    PostgreSql,
    Oracle,
    H2,
    Sqlite,
}

impl Database {
    pub fn name(self) -> &'static str {
        match self {
            Database::MySql => "MySQL",
            Database::PostgreSql => "PostgreSQL",
            Database::Oracle => "Oracle",
            Database::H2 => "H2",
            Database::Sqlite => "SQLite",
        }
    }

    /// Instantiate the dialect of this product.
    pub fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Database::MySql => Box::new(MySql),
            Database::PostgreSql => Box::new(Postgres),
            Database::Oracle => Box::new(Oracle),
            Database::H2 => Box::new(H2),
            Database::Sqlite => Box::new(Sqlite),
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an INSERT resolves key conflicts, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStyle {
    /// `ON CONFLICT (...) DO NOTHING | DO UPDATE SET ...`
    OnConflict,
    /// `INSERT IGNORE` / `ON DUPLICATE KEY UPDATE ...`
    OnDuplicateKey,
    Unsupported,
}

/// How extra tables are attached to an UPDATE or DELETE target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStyle {
    /// `UPDATE t JOIN o ON .. SET ..` / `DELETE t FROM t JOIN o ON ..`
    Join,
    /// `UPDATE t SET .. FROM o WHERE ..` / `DELETE FROM t USING o WHERE ..`
    From,
    Unsupported,
}

/// Capabilities and rendering rules of one database product.
pub trait Dialect: Send + Sync + fmt::Debug {
    fn database(&self) -> Database;

    fn name(&self) -> &'static str {
        self.database().name()
    }

    /// Identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Whether a bare identifier collides with a keyword.
    fn is_reserved(&self, word: &str) -> bool;

    /// Write the placeholder of the `index`-th (1-based) parameter.
    fn write_placeholder(&self, out: &mut String, index: usize);

    /// `FROM users AS u` rather than `FROM users u`.
    fn table_alias_after_as(&self) -> bool {
        true
    }

    /// `SET u.name = ?` is accepted.
    fn set_clause_table_alias(&self) -> bool {
        false
    }

    fn supports_multi_table_update(&self) -> bool {
        false
    }

    fn supports_multi_table_delete(&self) -> bool {
        false
    }

    /// `col = DEFAULT(col)` is available for only-if-default guarded updates.
    fn supports_only_default(&self) -> bool {
        false
    }

    fn update_join_style(&self) -> JoinStyle {
        JoinStyle::Unsupported
    }

    fn delete_join_style(&self) -> JoinStyle {
        JoinStyle::Unsupported
    }

    /// `SET (a, b) = (SELECT ..)` is accepted.
    fn supports_row_set_query(&self) -> bool {
        true
    }

    /// `VALUES (..), (..)` as a standalone query.
    fn supports_values_statement(&self) -> bool {
        true
    }

    fn supports_lateral(&self) -> bool {
        true
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::Unsupported
    }

    /// Prefix of each row of a `VALUES` statement (`ROW` for MySQL).
    fn values_row_prefix(&self) -> &'static str {
        ""
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle::default()
    }

    /// Render `value` of SQL type `mapping` as literal SQL text.
    fn write_literal(&self, out: &mut String, mapping: MappingType, value: &Value) -> CompileResult<()> {
        literal::write_literal(self.literal_style(), self.name(), out, mapping, value)
    }

    /// Write the row limiting clause, including its leading space.
    fn write_limit_offset(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        if let Some(limit) = limit {
            let _ = write!(out, " LIMIT {limit}");
        }
        if let Some(offset) = offset {
            let _ = write!(out, " OFFSET {offset}");
        }
    }

    /// Write the lock clause, including its leading space.
    fn write_lock(&self, out: &mut String, lock: &Lock) -> CompileResult<()> {
        out.push_str(match lock.mode {
            LockMode::Update => " FOR UPDATE",
            LockMode::Share => " FOR SHARE",
        });
        write_lock_wait(out, lock.wait);
        Ok(())
    }

    fn unsupported(&self, feature: &str) -> CompileError {
        CompileError::unsupported(self.name(), feature)
    }
}

pub(crate) fn write_lock_wait(out: &mut String, wait: LockWait) {
    match wait {
        LockWait::Wait => {}
        LockWait::NoWait => out.push_str(" NOWAIT"),
        LockWait::SkipLocked => out.push_str(" SKIP LOCKED"),
    }
}

#[cfg(test)]
mod tests;
