//! INSERT, UPDATE, and DELETE statements.

use super::expr::{Expr, FieldRef};
use super::predicate::Predicate;
use super::select::{Select, SubQuery, TableBlock};
use crate::meta::{FieldMeta, TableMeta};
use crate::row::RowAccessor;
use std::fmt;
use std::sync::Arc;

/// Where the rows of an INSERT come from.
pub enum InsertSource<'a> {
    /// Domain objects; managed and generated values are written back into them.
    Domain(Vec<&'a mut dyn RowAccessor>),
    /// Rows of expressions aligned with [`Insert::fields`].
    Values(Vec<Vec<Expr>>),
    /// A single row given as field/value pairs.
    Assignment(Vec<(Arc<FieldMeta>, Expr)>),
    /// `INSERT .. SELECT`; the select list is aligned with [`Insert::fields`].
    Query(Box<Select>),
}

impl InsertSource<'_> {
    /// Number of rows, `None` for a query source.
    pub fn row_count(&self) -> Option<usize> {
        match self {
            InsertSource::Domain(rows) => Some(rows.len()),
            InsertSource::Values(rows) => Some(rows.len()),
            InsertSource::Assignment(_) => Some(1),
            InsertSource::Query(_) => None,
        }
    }
}

impl fmt::Debug for InsertSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertSource::Domain(rows) => write!(f, "Domain({} rows)", rows.len()),
            InsertSource::Values(rows) => f.debug_tuple("Values").field(rows).finish(),
            InsertSource::Assignment(pairs) => f.debug_tuple("Assignment").field(pairs).finish(),
            InsertSource::Query(q) => f.debug_tuple("Query").field(q).finish(),
        }
    }
}

/// Conflict handling of an INSERT.
#[derive(Debug, Clone)]
pub enum Conflict {
    /// Skip conflicting rows.
    DoNothing,
    /// Update the existing row on conflict with the primary key.
    Update(Vec<Assignment>),
}

/// An INSERT statement.
///
/// Inserting into a child table writes two statements, the parent row first. Domain rows
/// carry both halves; values, assignment, and query sources need the parent half supplied
/// with [`Insert::with_parent`].
///
/// # Example
/// ```ignore
/// let mut rows = vec![&mut user as &mut dyn RowAccessor];
/// let mut stmt = Insert::domain(&user_table, rows);
/// let compiled = compiler.insert(&mut stmt)?;
/// ```
#[derive(Debug)]
#[must_use]
pub struct Insert<'a> {
    pub table: Arc<TableMeta>,
    /// Explicit column list; empty means every insertable field for domain rows.
    pub fields: Vec<Arc<FieldMeta>>,
    pub source: InsertSource<'a>,
    pub parent: Option<Box<Insert<'a>>>,
    /// Migration mode: every value is caller supplied and validated, nothing is generated.
    pub migration: bool,
    pub conflict: Option<Conflict>,
    /// Do not ask the database for generated ids.
    pub ignore_return_ids: bool,
}

impl<'a> Insert<'a> {
    fn new(table: &Arc<TableMeta>, fields: Vec<Arc<FieldMeta>>, source: InsertSource<'a>) -> Self {
        Self {
            table: table.clone(),
            fields,
            source,
            parent: None,
            migration: false,
            conflict: None,
            ignore_return_ids: false,
        }
    }

    /// Insert domain objects.
    pub fn domain(table: &Arc<TableMeta>, rows: Vec<&'a mut dyn RowAccessor>) -> Self {
        Self::new(table, Vec::new(), InsertSource::Domain(rows))
    }

    /// Insert rows of expressions.
    pub fn values(table: &Arc<TableMeta>, fields: Vec<Arc<FieldMeta>>, rows: Vec<Vec<Expr>>) -> Self {
        Self::new(table, fields, InsertSource::Values(rows))
    }

    /// Insert one row given as field/value pairs.
    pub fn assignment(table: &Arc<TableMeta>, pairs: Vec<(Arc<FieldMeta>, Expr)>) -> Self {
        let fields = pairs.iter().map(|(f, _)| f.clone()).collect();
        Self::new(table, fields, InsertSource::Assignment(pairs))
    }

    /// Insert the result of a query.
    pub fn query(table: &Arc<TableMeta>, fields: Vec<Arc<FieldMeta>>, query: Select) -> Self {
        Self::new(table, fields, InsertSource::Query(Box::new(query)))
    }

    /// Restrict a domain insert to these fields (managed fields are always written).
    pub fn only(mut self, fields: Vec<Arc<FieldMeta>>) -> Self {
        self.fields = fields;
        self
    }

    /// Parent half of a child-table insert.
    pub fn with_parent(mut self, parent: Insert<'a>) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn migration(mut self) -> Self {
        self.migration = true;
        self
    }

    pub fn on_conflict(mut self, conflict: Conflict) -> Self {
        self.conflict = Some(conflict);
        self
    }

    pub fn ignore_return_ids(mut self) -> Self {
        self.ignore_return_ids = true;
        self
    }
}

/// Right-hand side of a row assignment.
#[derive(Debug, Clone)]
pub enum RowValues {
    List(Vec<Expr>),
    Query(Box<SubQuery>),
}

/// An UPDATE SET item.
#[derive(Debug, Clone)]
pub enum Assignment {
    /// `col = expr`
    Field { target: FieldRef, value: Expr },
    /// `(a, b) = (x, y)` or `(a, b) = (SELECT ..)`
    Row { targets: Vec<FieldRef>, values: RowValues },
}

impl Assignment {
    pub fn set(target: impl Into<FieldRef>, value: impl Into<Expr>) -> Self {
        Assignment::Field {
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn row(targets: Vec<FieldRef>, values: RowValues) -> Self {
        Assignment::Row { targets, values }
    }

    /// Target fields in order.
    pub fn targets(&self) -> Vec<&FieldRef> {
        match self {
            Assignment::Field { target, .. } => vec![target],
            Assignment::Row { targets, .. } => targets.iter().collect(),
        }
    }

    /// Number of values on the right-hand side, `None` when unknown (`SELECT *`).
    pub(crate) fn value_count(&self) -> Option<usize> {
        match self {
            Assignment::Field { .. } => Some(1),
            Assignment::Row {
                values: RowValues::List(list),
                ..
            } => Some(list.len()),
            Assignment::Row {
                values: RowValues::Query(q),
                ..
            } => q.select.width(),
        }
    }
}

/// An UPDATE statement.
///
/// # Example
/// ```ignore
/// let stmt = Update::table(&user, "u")
///     .set(Assignment::set(&name, Expr::value("cat")))
///     .filter(Predicate::eq(user.id(), Expr::value(1i64)));
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Update {
    pub table: Arc<TableMeta>,
    pub alias: String,
    pub assignments: Vec<Assignment>,
    pub predicates: Vec<Predicate>,
    /// Additional tables of a multi-table update.
    pub joins: Vec<TableBlock>,
}

impl Update {
    pub fn table(table: &Arc<TableMeta>, alias: impl Into<String>) -> Self {
        Self {
            table: table.clone(),
            alias: alias.into(),
            assignments: Vec::new(),
            predicates: Vec::new(),
            joins: Vec::new(),
        }
    }

    pub fn set(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn join(mut self, block: TableBlock) -> Self {
        self.joins.push(block);
        self
    }
}

/// A DELETE statement.
#[derive(Debug, Clone)]
#[must_use]
pub struct Delete {
    pub table: Arc<TableMeta>,
    pub alias: String,
    pub predicates: Vec<Predicate>,
    /// Additional tables of a multi-table delete.
    pub joins: Vec<TableBlock>,
}

impl Delete {
    pub fn from(table: &Arc<TableMeta>, alias: impl Into<String>) -> Self {
        Self {
            table: table.clone(),
            alias: alias.into(),
            predicates: Vec::new(),
            joins: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn join(mut self, block: TableBlock) -> Self {
        self.joins.push(block);
        self
    }
}
