//! Statement context: SQL text and parameters built in lockstep.
//!
//! Every placeholder written to the SQL buffer is written by [`StatementContext::append_param`],
//! which pushes exactly one [`Param`]; the n-th placeholder therefore always binds the n-th
//! parameter. Identifiers go through [`StatementContext::append_identifier`] and literals
//! through the dialect, so no caller text reaches the SQL unescaped.
//!
//! # Example
//! ```ignore
//! let dialect = Database::PostgreSql.dialect();
//! let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Select);
//! ctx.push("SELECT * FROM ");
//! ctx.append_identifier("order")?;
//! ctx.push(" WHERE id = ");
//! ctx.append_value(MappingType::BigInt, false, Value::I64(1))?;
//! let stmt = ctx.build()?;
//! assert_eq!(stmt.sql(), r#"SELECT * FROM "order" WHERE id = $1"#);
//! ```

mod scope;

pub(crate) use scope::{Correlation, Resolved, Scope};

use crate::ast::{FieldRef, Visible};
use crate::batch;
use crate::dialect::Dialect;
use crate::error::{CompileError, CompileResult};
use crate::ident::{self, QuoteMode};
use crate::meta::MappingType;
use crate::row::RowAccessor;
use crate::stmt::{BatchStmt, DelayedValue, Param, SimpleStmt, StmtKind};
use crate::value::Value;
use serde::Deserialize;

/// Whether values are inlined when their SQL type allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LiteralMode {
    /// Bind every value.
    #[default]
    Bind,
    /// Inline values of literal-safe SQL types; character, binary, JSON, and encoded values
    /// are still bound.
    PreferLiteral,
}

/// Accumulates one statement.
pub struct StatementContext<'c> {
    dialect: &'c dyn Dialect,
    kind: StmtKind,
    table: Option<String>,
    quote_mode: QuoteMode,
    literal_mode: LiteralMode,
    visible: Visible,
    sql: String,
    params: Vec<Param>,
    first_named: Option<String>,
    id_slots: Vec<DelayedValue>,
    scopes: Vec<Scope>,
}

impl<'c> StatementContext<'c> {
    pub fn new(dialect: &'c dyn Dialect, kind: StmtKind) -> Self {
        Self {
            dialect,
            kind,
            table: None,
            quote_mode: QuoteMode::default(),
            literal_mode: LiteralMode::default(),
            visible: Visible::Both,
            sql: String::with_capacity(128),
            params: Vec::new(),
            first_named: None,
            id_slots: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn with_quote_mode(mut self, mode: QuoteMode) -> Self {
        self.quote_mode = mode;
        self
    }

    pub fn with_literal_mode(mut self, mode: LiteralMode) -> Self {
        self.literal_mode = mode;
        self
    }

    /// Visibility filter applied to every table with a visible column, sub-queries included.
    pub fn with_visible(mut self, visible: Visible) -> Self {
        self.visible = visible;
        self
    }

    /// Record the target table of a DML statement.
    pub fn for_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn dialect(&self) -> &'c dyn Dialect {
        self.dialect
    }

    pub fn kind(&self) -> StmtKind {
        self.kind
    }

    pub fn literal_mode(&self) -> LiteralMode {
        self.literal_mode
    }

    pub fn visible(&self) -> Visible {
        self.visible
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Append raw SQL text (keywords and punctuation only).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a table, column, or alias name, quoted when needed.
    pub fn append_identifier(&mut self, name: &str) -> CompileResult<()> {
        let dialect = self.dialect;
        ident::write_identifier(
            &mut self.sql,
            name,
            dialect.quote_char(),
            self.quote_mode,
            |w| dialect.is_reserved(w),
        )
    }

    /// The identifier as it would be written, for callers that build SQL elsewhere.
    pub fn safe_object_name(&self, name: &str) -> CompileResult<String> {
        let mut out = String::with_capacity(name.len() + 2);
        ident::write_identifier(
            &mut out,
            name,
            self.dialect.quote_char(),
            self.quote_mode,
            |w| self.dialect.is_reserved(w),
        )?;
        Ok(out)
    }

    /// Append `name AS alias` (or `name alias`) for a FROM item.
    pub(crate) fn append_table(&mut self, name: &str, alias: &str) -> CompileResult<()> {
        self.append_identifier(name)?;
        if alias != name {
            self.push(if self.dialect.table_alias_after_as() { " AS " } else { " " });
            self.append_identifier(alias)?;
        }
        Ok(())
    }

    /// Write the next placeholder and record its parameter.
    pub fn append_param(&mut self, param: Param) -> &mut Self {
        if let Param::Named { name, .. } = &param {
            if self.first_named.is_none() {
                self.first_named = Some(name.clone());
            }
        }
        self.params.push(param);
        self.dialect.write_placeholder(&mut self.sql, self.params.len());
        self
    }

    /// Append a value of SQL type `mapping`, bound or inlined per the literal mode.
    ///
    /// Encoded values are always bound.
    pub fn append_value(&mut self, mapping: MappingType, codec: bool, value: Value) -> CompileResult<()> {
        if self.literal_mode == LiteralMode::PreferLiteral && !codec && mapping.supports_literal() {
            return self.dialect.write_literal(&mut self.sql, mapping, &value);
        }
        self.append_param(Param::Value { mapping, value });
        Ok(())
    }

    /// Inline a value when its SQL type allows it, otherwise bind it.
    pub fn append_literal(&mut self, mapping: MappingType, value: &Value) -> CompileResult<()> {
        if mapping.supports_literal() {
            return self.dialect.write_literal(&mut self.sql, mapping, value);
        }
        self.append_param(Param::Value {
            mapping,
            value: value.clone(),
        });
        Ok(())
    }

    /// Append a named batch parameter.
    pub fn append_named(&mut self, mapping: MappingType, name: impl Into<String>) -> &mut Self {
        self.append_param(Param::Named {
            mapping,
            name: name.into(),
        })
    }

    /// Append a parameter produced by an earlier statement.
    pub fn append_delayed(&mut self, mapping: MappingType, value: DelayedValue) -> &mut Self {
        self.append_param(Param::Delayed { mapping, value })
    }

    /// Record an id the database generates for an inserted row.
    pub(crate) fn add_id_slot(&mut self, slot: DelayedValue) {
        self.id_slots.push(slot);
    }

    pub fn has_named_param(&self) -> bool {
        self.first_named.is_some()
    }

    /// Finish as a single statement.
    pub fn build(self) -> CompileResult<SimpleStmt> {
        if let Some(name) = self.first_named {
            return Err(CompileError::NamedParamInNonBatch {
                kind: self.kind,
                name,
            });
        }
        Ok(SimpleStmt {
            kind: self.kind,
            table: self.table,
            sql: self.sql,
            params: self.params,
            id_slots: self.id_slots,
        })
    }

    /// Finish as a batch, reading named parameters from each row.
    pub fn build_batch(self, rows: &[&dyn RowAccessor]) -> CompileResult<BatchStmt> {
        if self.first_named.is_none() {
            return Err(CompileError::NoNamedParamInBatch { kind: self.kind });
        }
        let rows = batch::expand(&self.params, rows)?;
        Ok(BatchStmt {
            kind: self.kind,
            table: self.table,
            sql: self.sql,
            rows,
        })
    }

    pub(crate) fn push_scope(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub(crate) fn pop_scope(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Hide the innermost scope while a non-lateral derived table is written.
    pub(crate) fn hide_scope(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    pub(crate) fn restore_scope(&mut self, scope: Option<Scope>) {
        if let Some(scope) = scope {
            self.scopes.push(scope);
        }
    }

    /// Resolve a field reference against the open scopes, innermost first.
    pub(crate) fn resolve(&self, field: &FieldRef) -> CompileResult<Resolved> {
        for scope in self.scopes.iter().rev() {
            if let Some(resolved) = scope.resolve(field, self.kind)? {
                return Ok(resolved);
            }
        }
        Err(CompileError::unknown_field(
            self.kind,
            field.field.table_name(),
            field.field.name(),
        ))
    }

    pub(crate) fn has_derived(&self, alias: &str) -> bool {
        self.scopes.iter().any(|s| s.has_derived(alias))
    }
}

#[cfg(test)]
mod tests;
