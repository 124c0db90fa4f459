//! Compiled statements.
//!
//! A [`Stmt`] is what the execution layer receives: SQL text with one parameter per
//! placeholder, in placeholder order. Parent/child writes compile to a [`PairStmt`] whose
//! parent half must run first; when the child half needs ids the database generates, it holds
//! [`DelayedValue`]s that are resolved from the parent's results.

use crate::error::{CompileError, CompileResult};
use crate::meta::{FieldMeta, MappingType};
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Statement kind, used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Insert,
    Update,
    Delete,
    Select,
    Values,
}

impl StmtKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StmtKind::Insert => "INSERT",
            StmtKind::Update => "UPDATE",
            StmtKind::Delete => "DELETE",
            StmtKind::Select => "SELECT",
            StmtKind::Values => "VALUES",
        }
    }
}

impl fmt::Display for StmtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct Delayed {
    table: String,
    field: String,
    cell: OnceLock<Value>,
}

/// A parameter value produced by an earlier statement.
///
/// Clones share the same slot. Reading before [`resolve`](Self::resolve) fails with
/// [`CompileError::NotExecuted`].
#[derive(Debug, Clone)]
pub struct DelayedValue {
    inner: Arc<Delayed>,
}

impl DelayedValue {
    pub(crate) fn new(field: &FieldMeta) -> Self {
        Self {
            inner: Arc::new(Delayed {
                table: field.table_name().to_string(),
                field: field.name().to_string(),
                cell: OnceLock::new(),
            }),
        }
    }

    /// Current value, if the producing statement has run.
    pub fn get(&self) -> CompileResult<Value> {
        self.inner
            .cell
            .get()
            .cloned()
            .ok_or_else(|| CompileError::NotExecuted {
                table: self.inner.table.clone(),
                field: self.inner.field.clone(),
            })
    }

    /// Fill the slot. A slot can be resolved once.
    pub fn resolve(&self, value: Value) -> CompileResult<()> {
        self.inner
            .cell
            .set(value)
            .map_err(|_| CompileError::AlreadyResolved {
                table: self.inner.table.clone(),
                field: self.inner.field.clone(),
            })
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.cell.get().is_some()
    }

    /// Whether both handles share one slot.
    pub fn same_slot(&self, other: &DelayedValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// One statement parameter.
#[derive(Debug, Clone)]
pub enum Param {
    Value { mapping: MappingType, value: Value },
    Delayed { mapping: MappingType, value: DelayedValue },
    /// Placeholder of a batch template; replaced per row when the batch is expanded.
    Named { mapping: MappingType, name: String },
}

impl Param {
    pub fn mapping(&self) -> MappingType {
        match self {
            Param::Value { mapping, .. }
            | Param::Delayed { mapping, .. }
            | Param::Named { mapping, .. } => *mapping,
        }
    }

    /// Value to bind. Delayed values must be resolved first.
    pub fn value(&self) -> CompileResult<Value> {
        match self {
            Param::Value { value, .. } => Ok(value.clone()),
            Param::Delayed { value, .. } => value.get(),
            Param::Named { name, .. } => Err(CompileError::Config(format!(
                "named parameter '{name}' has no value outside a batch"
            ))),
        }
    }
}

/// A single statement.
#[derive(Debug, Clone)]
pub struct SimpleStmt {
    pub(crate) kind: StmtKind,
    pub(crate) table: Option<String>,
    pub(crate) sql: String,
    pub(crate) params: Vec<Param>,
    pub(crate) id_slots: Vec<DelayedValue>,
}

impl SimpleStmt {
    pub fn kind(&self) -> StmtKind {
        self.kind
    }

    /// Target table, absent for queries.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Bind values in placeholder order.
    pub fn values(&self) -> CompileResult<Vec<Value>> {
        self.params.iter().map(Param::value).collect()
    }

    /// One slot per inserted row for ids the database generates, in row order.
    pub fn id_slots(&self) -> &[DelayedValue] {
        &self.id_slots
    }

    /// Resolve every id slot from the ids the database returned, in row order.
    pub fn resolve_ids(&self, ids: impl IntoIterator<Item = Value>) -> CompileResult<()> {
        let ids: Vec<Value> = ids.into_iter().collect();
        if ids.len() != self.id_slots.len() {
            return Err(CompileError::IdCountMismatch {
                table: self.table.clone().unwrap_or_default(),
                expected: self.id_slots.len(),
                found: ids.len(),
            });
        }
        for (slot, id) in self.id_slots.iter().zip(ids) {
            slot.resolve(id)?;
        }
        Ok(())
    }
}

/// A statement executed once per parameter row.
#[derive(Debug, Clone)]
pub struct BatchStmt {
    pub(crate) kind: StmtKind,
    pub(crate) table: Option<String>,
    pub(crate) sql: String,
    pub(crate) rows: Vec<Vec<Param>>,
}

impl BatchStmt {
    pub fn kind(&self) -> StmtKind {
        self.kind
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter rows; every row has one entry per placeholder.
    pub fn rows(&self) -> &[Vec<Param>] {
        &self.rows
    }

    /// Placeholders per row.
    pub fn param_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Parent-then-child statements of an inheritance write.
///
/// The execution layer runs `parent` first and, for updates and deletes, runs `child` only
/// when the parent affected at least one row.
#[derive(Debug, Clone)]
pub struct PairStmt {
    pub(crate) parent: Box<Stmt>,
    pub(crate) child: Box<Stmt>,
}

impl PairStmt {
    pub fn parent(&self) -> &Stmt {
        &self.parent
    }

    pub fn child(&self) -> &Stmt {
        &self.child
    }

    /// Resolve the ids the parent insert produced, which the child half reads.
    pub fn resolve_parent_ids(&self, ids: impl IntoIterator<Item = Value>) -> CompileResult<()> {
        match self.parent.as_ref() {
            Stmt::Simple(parent) => parent.resolve_ids(ids),
            _ => Err(CompileError::Config(
                "parent half does not produce ids".to_string(),
            )),
        }
    }
}

/// A compiled statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    Simple(SimpleStmt),
    Batch(BatchStmt),
    Pair(PairStmt),
}

impl Stmt {
    pub fn kind(&self) -> StmtKind {
        match self {
            Stmt::Simple(s) => s.kind,
            Stmt::Batch(b) => b.kind,
            Stmt::Pair(p) => p.parent.kind(),
        }
    }

    /// SQL of every statement in execution order.
    pub fn sql_list(&self) -> Vec<&str> {
        match self {
            Stmt::Simple(s) => vec![s.sql()],
            Stmt::Batch(b) => vec![b.sql()],
            Stmt::Pair(p) => {
                let mut list = p.parent.sql_list();
                list.extend(p.child.sql_list());
                list
            }
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleStmt> {
        match self {
            Stmt::Simple(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_batch(&self) -> Option<&BatchStmt> {
        match self {
            Stmt::Batch(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&PairStmt> {
        match self {
            Stmt::Pair(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Stmt::Pair(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{FieldDef, FieldRole, HostType};

    fn id_field() -> FieldMeta {
        FieldDef::new("id", HostType::I64).build("users", FieldRole::Id)
    }

    #[test]
    fn delayed_value_reads_after_resolve() {
        let slot = DelayedValue::new(&id_field());
        let shared = slot.clone();
        assert!(slot.get().unwrap_err().is_not_executed());

        shared.resolve(Value::I64(42)).unwrap();
        assert_eq!(slot.get().unwrap(), Value::I64(42));
        assert!(slot.same_slot(&shared));
    }

    #[test]
    fn delayed_value_resolves_once() {
        let slot = DelayedValue::new(&id_field());
        slot.resolve(Value::I64(1)).unwrap();
        assert!(matches!(
            slot.resolve(Value::I64(2)),
            Err(CompileError::AlreadyResolved { .. })
        ));
    }

    #[test]
    fn resolve_ids_checks_count() {
        let field = id_field();
        let stmt = SimpleStmt {
            kind: StmtKind::Insert,
            table: Some("users".to_string()),
            sql: String::new(),
            params: Vec::new(),
            id_slots: vec![DelayedValue::new(&field), DelayedValue::new(&field)],
        };
        assert!(matches!(
            stmt.resolve_ids([Value::I64(1)]),
            Err(CompileError::IdCountMismatch { expected: 2, found: 1, .. })
        ));
        stmt.resolve_ids([Value::I64(1), Value::I64(2)]).unwrap();
        assert_eq!(stmt.id_slots()[1].get().unwrap(), Value::I64(2));
    }
}
