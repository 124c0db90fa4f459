//! INSERT compilation.
//!
//! A child-table insert becomes a [`PairStmt`]: the parent row first, then the child row
//! whose id is either the value written to the parent or, for a database-generated id, a
//! [`DelayedValue`] resolved after the parent statement ran.

use super::clause;
use super::update::{append_assignment, check_target};
use crate::Compiler;
use crate::ast::{Assignment, Conflict, Expr, Insert, InsertSource, Select};
use crate::context::{Scope, StatementContext};
use crate::dialect::ConflictStyle;
use crate::error::{CompileError, CompileResult};
use crate::meta::{FieldMeta, FieldRole, GeneratorKind, TableKind, TableMeta};
use crate::row::{RowAccessor, ValueRow};
use crate::stmt::{DelayedValue, PairStmt, Stmt, StmtKind};
use crate::value::Value;
use std::sync::Arc;
use tracing::trace;

/// One value of an inserted row.
#[derive(Debug, Clone)]
enum Cell<'e> {
    Expr(&'e Expr),
    Value(Value),
    Delayed(DelayedValue),
}

/// A half of an insert, ready to be written.
struct Rows<'e> {
    columns: Vec<Arc<FieldMeta>>,
    cells: Vec<Vec<Cell<'e>>>,
}

pub(crate) fn compile(cx: &Compiler, stmt: &mut Insert<'_>) -> CompileResult<Stmt> {
    let Insert {
        table,
        fields,
        source,
        parent,
        migration,
        conflict,
        ignore_return_ids,
    } = stmt;
    let conflict = conflict.as_ref();
    match source {
        InsertSource::Domain(rows) => domain(cx, table, fields, rows, *migration, conflict, *ignore_return_ids),
        InsertSource::Values(rows) => {
            let rows: Vec<Vec<&Expr>> = rows.iter().map(|r| r.iter().collect()).collect();
            expressions(cx, table, fields, rows, parent.as_deref(), *migration, conflict, *ignore_return_ids)
        }
        InsertSource::Assignment(pairs) => {
            let row = vec![pairs.iter().map(|(_, e)| e).collect()];
            expressions(cx, table, fields, row, parent.as_deref(), *migration, conflict, *ignore_return_ids)
        }
        InsertSource::Query(select) => query(cx, table, fields, select, parent.as_deref(), conflict),
    }
}

fn empty(table: &TableMeta) -> CompileError {
    CompileError::EmptyInsert {
        table: table.name().to_string(),
    }
}

fn null_required(field: &FieldMeta) -> CompileError {
    CompileError::NullRequired {
        kind: StmtKind::Insert,
        table: field.table_name().to_string(),
        field: field.name().to_string(),
    }
}

/// The statement that writes the first half: the parent of a child, or the table itself.
fn first_half(table: &Arc<TableMeta>) -> &Arc<TableMeta> {
    match table.kind() {
        TableKind::Child => table.parent().unwrap_or(table),
        TableKind::Single | TableKind::Parent => table,
    }
}

/// Whether the database generates the id of the first half.
fn post_id(half: &TableMeta, migration: bool) -> bool {
    !migration && *half.id().generator() == GeneratorKind::Post
}

fn pair_or_single(first: Stmt, child: Option<Stmt>) -> Stmt {
    match child {
        Some(child) => Stmt::Pair(PairStmt {
            parent: Box::new(first),
            child: Box::new(child),
        }),
        None => first,
    }
}

fn domain(
    cx: &Compiler,
    table: &Arc<TableMeta>,
    selected: &[Arc<FieldMeta>],
    rows: &mut [&mut dyn RowAccessor],
    migration: bool,
    conflict: Option<&Conflict>,
    ignore_return_ids: bool,
) -> CompileResult<Stmt> {
    if rows.is_empty() {
        return Err(empty(table));
    }
    for field in selected {
        let in_family = table.owns(field) || table.parent().is_some_and(|p| p.owns(field));
        if !in_family {
            return Err(CompileError::unknown_field(StmtKind::Insert, table.name(), field.name()));
        }
    }
    let generator = cx.field_generator();
    for row in rows.iter_mut() {
        if migration {
            generator.validate(table, &**row)?;
        } else {
            generator.generate(table, cx.config().manage_visible, &mut **row)?;
        }
    }

    let first = first_half(table);
    let post = post_id(first, migration);
    let is_child = table.kind() == TableKind::Child;
    if is_child && post && conflict.is_some() {
        return Err(cx.dialect().unsupported("conflict clause on child insert with generated id"));
    }
    let keep = |f: &Arc<FieldMeta>| {
        f.is_id() || f.is_managed() || selected.is_empty() || selected.iter().any(|s| s == f)
    };

    let columns: Vec<Arc<FieldMeta>> = first
        .insertable_fields()
        .filter(|f| !(f.is_id() && post))
        .filter(|f| keep(f))
        .cloned()
        .collect();
    let mut slots = Vec::new();
    let mut cells = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        let mut line = Vec::with_capacity(columns.len());
        for col in &columns {
            line.push(Cell::Value(row.get(col.name())?));
        }
        cells.push(line);
        if post {
            slots.push(DelayedValue::new(first.id()));
        }
    }
    let (first_conflict, child_conflict) = partition(conflict, first, table);
    let returning = post && !ignore_return_ids && cx.dialect().supports_returning();
    let mut ctx = cx.context_for(StmtKind::Insert, first.name());
    for slot in &slots {
        ctx.add_id_slot(slot.clone());
    }
    write(cx, &mut ctx, first, &Rows { columns, cells }, first_conflict.as_ref(), returning)?;
    let first_stmt = Stmt::Simple(ctx.build()?);
    if !is_child {
        return Ok(first_stmt);
    }

    let child_columns: Vec<Arc<FieldMeta>> = table.insertable_fields().filter(|f| keep(f)).cloned().collect();
    let mut cells = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let mut line = Vec::with_capacity(child_columns.len());
        for col in &child_columns {
            let cell = match slots.get(i) {
                Some(slot) if col.is_id() => Cell::Delayed(slot.clone()),
                _ => Cell::Value(row.get(col.name())?),
            };
            line.push(cell);
        }
        cells.push(line);
    }
    let mut ctx = cx.context_for(StmtKind::Insert, table.name());
    write(
        cx,
        &mut ctx,
        table,
        &Rows {
            columns: child_columns,
            cells,
        },
        child_conflict.as_ref(),
        false,
    )?;
    Ok(pair_or_single(first_stmt, Some(Stmt::Simple(ctx.build()?))))
}

/// Values or assignment insert. A child table takes its parent half from `parent`.
#[allow(clippy::too_many_arguments)]
fn expressions(
    cx: &Compiler,
    table: &Arc<TableMeta>,
    fields: &[Arc<FieldMeta>],
    rows: Vec<Vec<&Expr>>,
    parent: Option<&Insert<'_>>,
    migration: bool,
    conflict: Option<&Conflict>,
    ignore_return_ids: bool,
) -> CompileResult<Stmt> {
    if rows.is_empty() {
        return Err(empty(table));
    }
    if table.kind() != TableKind::Child {
        let half = expression_half(cx, table, table.discriminator_value(), fields, &rows, migration, None)?;
        let post = post_id(table, migration) && !half.columns.iter().any(|c| c.is_id());
        return write_first(cx, table, half, conflict, post, !ignore_return_ids).map(|(stmt, _)| stmt);
    }

    let parent_table = table.parent().ok_or_else(|| super::missing_parent(table))?;
    let Some(parent) = parent else {
        return Err(CompileError::MissingParent {
            table: table.name().to_string(),
            parent: parent_table.name().to_string(),
        });
    };
    if parent.table.as_ref() != parent_table.as_ref() {
        return Err(CompileError::Config(format!(
            "parent insert targets '{}', expected '{}'",
            parent.table.name(),
            parent_table.name()
        )));
    }
    let parent_rows: Vec<Vec<&Expr>> = match &parent.source {
        InsertSource::Values(rows) => rows.iter().map(|r| r.iter().collect()).collect(),
        InsertSource::Assignment(pairs) => vec![pairs.iter().map(|(_, e)| e).collect()],
        InsertSource::Domain(_) | InsertSource::Query(_) => {
            return Err(CompileError::Config(
                "parent of a values insert must be a values or assignment insert".to_string(),
            ));
        }
    };
    if parent_rows.len() != rows.len() {
        return Err(CompileError::ChildRowMismatch {
            table: table.name().to_string(),
            parent: parent_rows.len(),
            child: rows.len(),
        });
    }

    let parent_half = expression_half(
        cx,
        parent_table,
        table.discriminator_value(),
        &parent.fields,
        &parent_rows,
        migration,
        None,
    )?;
    let id_column = parent_half.columns.iter().position(|c| c.is_id());
    let post = id_column.is_none() && post_id(parent_table, migration);
    if post && conflict.is_some() {
        return Err(cx.dialect().unsupported("conflict clause on child insert with generated id"));
    }
    let (parent_conflict, child_conflict) = partition(conflict, parent_table, table);
    let ids: Vec<Cell<'_>> = match id_column {
        Some(i) => parent_half.cells.iter().map(|line| line[i].clone()).collect(),
        None => Vec::new(),
    };
    let (first, slots) = write_first(
        cx,
        parent_table,
        parent_half,
        parent_conflict.as_ref(),
        post,
        !ignore_return_ids,
    )?;
    let ids = if post {
        slots.into_iter().map(Cell::Delayed).collect()
    } else if ids.is_empty() {
        return Err(null_required(parent_table.id()));
    } else {
        ids
    };

    let child_half = expression_half(cx, table, None, fields, &rows, migration, Some(ids))?;
    let mut ctx = cx.context_for(StmtKind::Insert, table.name());
    write(cx, &mut ctx, table, &child_half, child_conflict.as_ref(), false)?;
    Ok(pair_or_single(first, Some(Stmt::Simple(ctx.build()?))))
}

/// Write the first half. With `post` and no caller-supplied id, one delayed id is registered
/// per row and returned with the statement.
fn write_first(
    cx: &Compiler,
    table: &Arc<TableMeta>,
    rows: Rows<'_>,
    conflict: Option<&Conflict>,
    post: bool,
    returning: bool,
) -> CompileResult<(Stmt, Vec<DelayedValue>)> {
    let mut ctx = cx.context_for(StmtKind::Insert, table.name());
    let mut slots = Vec::new();
    if post && !rows.columns.iter().any(|c| c.is_id()) {
        for _ in &rows.cells {
            let slot = DelayedValue::new(table.id());
            ctx.add_id_slot(slot.clone());
            slots.push(slot);
        }
    }
    let returning = returning && !slots.is_empty() && cx.dialect().supports_returning();
    write(cx, &mut ctx, table, &rows, conflict, returning)?;
    Ok((Stmt::Simple(ctx.build()?), slots))
}

/// Caller columns of one table plus the values the library supplies.
///
/// `code` is the discriminator written to a parent half. `child_ids` carries the per-row id of
/// a child half.
fn expression_half<'e>(
    cx: &Compiler,
    table: &TableMeta,
    code: Option<&Value>,
    fields: &[Arc<FieldMeta>],
    rows: &[Vec<&'e Expr>],
    migration: bool,
    child_ids: Option<Vec<Cell<'e>>>,
) -> CompileResult<Rows<'e>> {
    for field in fields {
        if !table.owns(field) {
            return Err(CompileError::unknown_field(StmtKind::Insert, table.name(), field.name()));
        }
        let child_id = child_ids.is_some() && field.is_id();
        if (field.is_managed() && !migration) || child_id {
            return Err(CompileError::managed_field(StmtKind::Insert, table.name(), field.name()));
        }
    }
    for row in rows {
        if row.len() != fields.len() {
            return Err(CompileError::SetArity {
                kind: StmtKind::Insert,
                table: table.name().to_string(),
                targets: fields.len(),
                values: row.len(),
            });
        }
    }

    let mut columns: Vec<Arc<FieldMeta>> = fields.to_vec();
    let mut cells: Vec<Vec<Cell<'e>>> = rows.iter().map(|r| r.iter().map(|e| Cell::Expr(*e)).collect()).collect();

    if let Some(ids) = child_ids {
        columns.insert(0, table.id().clone());
        for (line, id) in cells.iter_mut().zip(ids) {
            line.insert(0, id);
        }
    }

    let missing: Vec<&Arc<FieldMeta>> = table
        .insertable_fields()
        .filter(|f| !columns.iter().any(|c| c == *f))
        .collect();
    if migration {
        if let Some(field) = missing.iter().find(|f| f.is_id() || f.is_managed()) {
            return Err(null_required(field));
        }
        return Ok(Rows { columns, cells });
    }

    let generator = cx.field_generator();
    let now = cx.clock.now();
    let manage_visible = cx.config().manage_visible;
    let empty_row = ValueRow::new();
    for field in missing {
        if field.role() == FieldRole::Plain && *field.generator() == GeneratorKind::None {
            continue;
        }
        let mut values = Vec::with_capacity(cells.len());
        for _ in 0..cells.len() {
            match generator.managed_value(field, code, manage_visible, now, &empty_row)? {
                Some(value) => values.push(Cell::Value(value)),
                None => break,
            }
        }
        if values.len() != cells.len() {
            continue;
        }
        trace!(target: "armsql.sql", table = %table.name(), field = %field.name(), "appended managed column");
        columns.push(field.clone());
        for (line, value) in cells.iter_mut().zip(values) {
            line.push(value);
        }
    }
    Ok(Rows { columns, cells })
}

/// `INSERT INTO t (fields) SELECT ..`. A child table needs a parent query insert.
fn query(
    cx: &Compiler,
    table: &Arc<TableMeta>,
    fields: &[Arc<FieldMeta>],
    select: &Select,
    parent: Option<&Insert<'_>>,
    conflict: Option<&Conflict>,
) -> CompileResult<Stmt> {
    if table.kind() != TableKind::Child {
        return query_half(cx, table, fields, select, conflict);
    }
    let parent_table = table.parent().ok_or_else(|| super::missing_parent(table))?;
    let Some(Insert {
        table: parent_target,
        fields: parent_fields,
        source: InsertSource::Query(parent_select),
        ..
    }) = parent
    else {
        return Err(CompileError::MissingParent {
            table: table.name().to_string(),
            parent: parent_table.name().to_string(),
        });
    };
    if parent_target.as_ref() != parent_table.as_ref() {
        return Err(CompileError::Config(format!(
            "parent insert targets '{}', expected '{}'",
            parent_target.name(),
            parent_table.name()
        )));
    }
    let (parent_conflict, child_conflict) = partition(conflict, parent_table, table);
    let first = query_half(cx, parent_table, parent_fields, parent_select, parent_conflict.as_ref())?;
    let child = query_half(cx, table, fields, select, child_conflict.as_ref())?;
    Ok(pair_or_single(first, Some(child)))
}

fn query_half(
    cx: &Compiler,
    table: &Arc<TableMeta>,
    fields: &[Arc<FieldMeta>],
    select: &Select,
    conflict: Option<&Conflict>,
) -> CompileResult<Stmt> {
    for field in fields {
        if !table.owns(field) {
            return Err(CompileError::unknown_field(StmtKind::Insert, table.name(), field.name()));
        }
    }
    if let Some(width) = select.width() {
        if width != fields.len() {
            return Err(CompileError::SetArity {
                kind: StmtKind::Insert,
                table: table.name().to_string(),
                targets: fields.len(),
                values: width,
            });
        }
    }
    let manage_visible = cx.config().manage_visible;
    let required = table.insertable_fields().find(|f| {
        let needed = match f.role() {
            FieldRole::Id => table.kind() == TableKind::Child || *f.generator() != GeneratorKind::Post,
            FieldRole::Plain => false,
            FieldRole::Visible => manage_visible,
            _ => true,
        };
        needed && !fields.iter().any(|c| c == *f)
    });
    if let Some(field) = required {
        return Err(null_required(field));
    }

    let mut ctx = cx.context_for(StmtKind::Insert, table.name());
    open(&mut ctx, table, fields, conflict)?;
    ctx.push(" ");
    ctx.append_select(select)?;
    close(cx, &mut ctx, table, conflict)?;
    Ok(Stmt::Simple(ctx.build()?))
}

/// Split conflict updates between the first half and the child table.
fn partition(
    conflict: Option<&Conflict>,
    first: &TableMeta,
    table: &TableMeta,
) -> (Option<Conflict>, Option<Conflict>) {
    match conflict {
        None => (None, None),
        Some(Conflict::DoNothing) => (Some(Conflict::DoNothing), Some(Conflict::DoNothing)),
        Some(Conflict::Update(items)) if first == table => (Some(Conflict::Update(items.clone())), None),
        Some(Conflict::Update(items)) => {
            let (own, rest): (Vec<Assignment>, Vec<Assignment>) = items
                .iter()
                .cloned()
                .partition(|a| a.targets().iter().all(|t| first.owns(&t.field)));
            (Some(Conflict::Update(own)), Some(Conflict::Update(rest)))
        }
    }
}

/// `INSERT [IGNORE] INTO t (cols)`
fn open(
    ctx: &mut StatementContext<'_>,
    table: &TableMeta,
    columns: &[Arc<FieldMeta>],
    conflict: Option<&Conflict>,
) -> CompileResult<()> {
    let ignore = matches!(conflict, Some(Conflict::DoNothing))
        && ctx.dialect().conflict_style() == ConflictStyle::OnDuplicateKey;
    ctx.push(if ignore { "INSERT IGNORE INTO " } else { "INSERT INTO " });
    ctx.append_identifier(table.name())?;
    ctx.push(" (");
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        ctx.append_identifier(col.column())?;
    }
    ctx.push(")");
    Ok(())
}

fn write(
    cx: &Compiler,
    ctx: &mut StatementContext<'_>,
    table: &Arc<TableMeta>,
    rows: &Rows<'_>,
    conflict: Option<&Conflict>,
    returning: bool,
) -> CompileResult<()> {
    open(ctx, table, &rows.columns, conflict)?;
    ctx.push(" VALUES ");
    for (i, line) in rows.cells.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        ctx.push("(");
        for (j, (cell, col)) in line.iter().zip(&rows.columns).enumerate() {
            if j > 0 {
                ctx.push(", ");
            }
            match cell {
                Cell::Expr(e) => ctx.append_expr(e, Some(col))?,
                Cell::Value(v) => ctx.append_value(col.mapping(), col.codec(), v.clone())?,
                Cell::Delayed(d) => {
                    ctx.append_delayed(col.mapping(), d.clone());
                }
            }
        }
        ctx.push(")");
    }
    close(cx, ctx, table, conflict)?;
    if returning {
        ctx.push(" RETURNING ");
        ctx.append_identifier(table.id().column())?;
    }
    Ok(())
}

/// Conflict clause after the rows.
fn close(
    cx: &Compiler,
    ctx: &mut StatementContext<'_>,
    table: &Arc<TableMeta>,
    conflict: Option<&Conflict>,
) -> CompileResult<()> {
    let Some(conflict) = conflict else {
        return Ok(());
    };
    let style = ctx.dialect().conflict_style();
    let items = match (style, conflict) {
        (ConflictStyle::Unsupported, _) => return Err(ctx.dialect().unsupported("insert conflict clause")),
        (ConflictStyle::OnDuplicateKey, Conflict::DoNothing) => return Ok(()),
        (ConflictStyle::OnConflict, Conflict::DoNothing) => {
            return on_conflict_nothing(ctx, table);
        }
        (_, Conflict::Update(items)) => items,
    };
    if items.is_empty() && !clause::has_managed_set(table) {
        return match style {
            ConflictStyle::OnConflict => on_conflict_nothing(ctx, table),
            // no-op update
            _ => {
                ctx.push(" ON DUPLICATE KEY UPDATE ");
                ctx.append_identifier(table.id().column())?;
                ctx.push(" = ");
                ctx.append_identifier(table.id().column())
            }
        };
    }

    let mut scope = Scope::new();
    scope.add_table(table, table.name())?;
    if style == ConflictStyle::OnConflict {
        scope.add_derived("excluded")?;
        ctx.push(" ON CONFLICT (");
        ctx.append_identifier(table.id().column())?;
        ctx.push(") DO UPDATE SET ");
    } else {
        ctx.push(" ON DUPLICATE KEY UPDATE ");
    }
    ctx.push_scope(scope);
    let mut first = true;
    for item in items {
        for target in item.targets() {
            check_target(table, &target.field)?;
        }
        append_assignment(ctx, item, &mut first)?;
    }
    clause::managed_set(cx, ctx, table, table.name(), &mut first)?;
    ctx.pop_scope();
    Ok(())
}

fn on_conflict_nothing(ctx: &mut StatementContext<'_>, table: &TableMeta) -> CompileResult<()> {
    ctx.push(" ON CONFLICT (");
    ctx.append_identifier(table.id().column())?;
    ctx.push(") DO NOTHING");
    Ok(())
}
