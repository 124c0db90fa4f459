use crate::ast::FieldRef;
use crate::error::{CompileError, CompileResult};
use crate::meta::{FieldMeta, TableMeta};
use crate::stmt::StmtKind;
use crate::value::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct ScopeTable {
    table: Arc<TableMeta>,
    alias: String,
    /// Caller alias this physical table answers to, when it differs from `alias`.
    logical: Option<String>,
}

/// The other half of an inheritance pair, reachable only through a correlated sub-query.
#[derive(Debug, Clone)]
pub(crate) struct Correlation {
    /// Alias of the table written by the statement.
    pub owner_alias: String,
    pub owner_id: Arc<FieldMeta>,
    pub other: Arc<TableMeta>,
    pub other_alias: String,
    /// `other.discriminator = code`, when `other` is the parent.
    pub discriminator: Option<(Arc<FieldMeta>, Value)>,
}

/// How a field reference is written.
#[derive(Debug, Clone)]
pub(crate) enum Resolved {
    /// `alias.column`
    Column { alias: String, column: String },
    /// `(SELECT o.column FROM other o WHERE o.id = alias.id ..)`
    Correlated(Correlation),
}

/// Tables visible to the expressions of one query level.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    tables: Vec<ScopeTable>,
    derived: Vec<String>,
    correlations: Vec<Correlation>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    fn alias_taken(&self, alias: &str) -> bool {
        self.tables.iter().any(|t| t.alias == alias) || self.derived.iter().any(|d| d == alias)
    }

    pub fn add_table(&mut self, table: &Arc<TableMeta>, alias: &str) -> CompileResult<()> {
        self.add(table, alias, None)
    }

    /// Add a physical table that the caller addresses as `logical`.
    pub fn add_hidden(&mut self, table: &Arc<TableMeta>, alias: &str, logical: &str) -> CompileResult<()> {
        self.add(table, alias, Some(logical.to_string()))
    }

    fn add(&mut self, table: &Arc<TableMeta>, alias: &str, logical: Option<String>) -> CompileResult<()> {
        if self.alias_taken(alias) {
            return Err(CompileError::DuplicateAlias {
                alias: alias.to_string(),
            });
        }
        self.tables.push(ScopeTable {
            table: table.clone(),
            alias: alias.to_string(),
            logical,
        });
        Ok(())
    }

    pub fn add_derived(&mut self, alias: &str) -> CompileResult<()> {
        if self.alias_taken(alias) {
            return Err(CompileError::DuplicateAlias {
                alias: alias.to_string(),
            });
        }
        self.derived.push(alias.to_string());
        Ok(())
    }

    pub fn add_correlation(&mut self, correlation: Correlation) {
        self.correlations.push(correlation);
    }

    pub fn has_derived(&self, alias: &str) -> bool {
        self.derived.iter().any(|d| d == alias)
    }

    /// `Ok(None)` when nothing in this scope answers to the reference.
    pub fn resolve(&self, r: &FieldRef, kind: StmtKind) -> CompileResult<Option<Resolved>> {
        let field = &r.field;
        let candidates: Vec<&ScopeTable> = match &r.qualifier {
            Some(q) => self
                .tables
                .iter()
                .filter(|t| t.alias == *q || t.logical.as_deref() == Some(q.as_str()))
                .collect(),
            None => self.tables.iter().collect(),
        };
        if candidates.is_empty() && r.qualifier.is_some() {
            return Ok(None);
        }

        let owners: Vec<&&ScopeTable> = candidates.iter().filter(|t| t.table.owns(field)).collect();
        match owners.as_slice() {
            [one] => {
                return Ok(Some(Resolved::Column {
                    alias: one.alias.clone(),
                    column: field.column().to_string(),
                }));
            }
            [_, _, ..] => {
                return Err(CompileError::AmbiguousSelfJoin {
                    table: field.table_name().to_string(),
                    field: field.name().to_string(),
                });
            }
            [] => {}
        }

        let correlation = self.correlations.iter().find(|c| {
            c.other.owns(field) && candidates.iter().any(|t| t.alias == c.owner_alias)
        });
        if let Some(c) = correlation {
            // Both halves share key values.
            if field.is_id() {
                return Ok(Some(Resolved::Column {
                    alias: c.owner_alias.clone(),
                    column: c.owner_id.column().to_string(),
                }));
            }
            return Ok(Some(Resolved::Correlated(c.clone())));
        }

        if r.qualifier.is_some() {
            return Err(CompileError::unknown_field(kind, field.table_name(), field.name()));
        }
        Ok(None)
    }
}
