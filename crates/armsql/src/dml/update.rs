use super::clause::{self, Conditions, set_separator};
use super::{child_alias, finish, missing_parent, parent_alias, register_joins};
use crate::Compiler;
use crate::ast::{Assignment, Predicate, RowValues, Update, Visible};
use crate::context::{Correlation, Scope, StatementContext};
use crate::dialect::JoinStyle;
use crate::error::{CompileError, CompileResult};
use crate::meta::{FieldMeta, TableKind, TableMeta, UpdateMode};
use crate::row::RowAccessor;
use crate::stmt::{PairStmt, Stmt, StmtKind};
use std::sync::Arc;
use tracing::trace;

pub(crate) fn compile(
    cx: &Compiler,
    stmt: &Update,
    visible: Visible,
    rows: Option<&[&dyn RowAccessor]>,
) -> CompileResult<Stmt> {
    check(stmt)?;
    let table = &stmt.table;
    if table.kind() != TableKind::Child {
        let ctx = single(cx, stmt, visible)?;
        return finish(ctx, rows);
    }
    let parent = table.parent().ok_or_else(|| missing_parent(table))?;
    if cx.dialect().supports_multi_table_update() {
        let ctx = joined(cx, stmt, parent, visible)?;
        return finish(ctx, rows);
    }
    if !stmt.joins.is_empty() {
        return Err(cx.dialect().unsupported("multi-table update of a child table"));
    }
    split(cx, stmt, parent, visible, rows)
}

fn check(stmt: &Update) -> CompileResult<()> {
    let table = &stmt.table;
    if stmt.predicates.is_empty() {
        return Err(CompileError::EmptyWhere {
            kind: StmtKind::Update,
            table: table.name().to_string(),
        });
    }
    if stmt.assignments.is_empty() {
        return Err(CompileError::EmptySet {
            kind: StmtKind::Update,
            table: table.name().to_string(),
        });
    }
    for a in &stmt.assignments {
        let targets = a.targets();
        for t in &targets {
            check_target(table, &t.field)?;
        }
        if let Some(values) = a.value_count() {
            if values != targets.len() {
                return Err(CompileError::SetArity {
                    kind: StmtKind::Update,
                    table: table.name().to_string(),
                    targets: targets.len(),
                    values,
                });
            }
        }
    }
    Ok(())
}

/// A SET target must belong to the table family and be assignable by the caller.
pub(crate) fn check_target(table: &TableMeta, field: &FieldMeta) -> CompileResult<()> {
    let in_family = table.owns(field) || table.parent().is_some_and(|p| p.owns(field));
    if !in_family {
        return Err(CompileError::unknown_field(StmtKind::Update, table.name(), field.name()));
    }
    if field.is_managed() {
        return Err(CompileError::managed_field(
            StmtKind::Update,
            field.table_name(),
            field.name(),
        ));
    }
    if field.is_id() || field.update_mode() == UpdateMode::Immutable {
        return Err(CompileError::NonUpdatable {
            kind: StmtKind::Update,
            table: field.table_name().to_string(),
            field: field.name().to_string(),
        });
    }
    Ok(())
}

pub(crate) fn append_assignment(
    ctx: &mut StatementContext<'_>,
    a: &Assignment,
    first: &mut bool,
) -> CompileResult<()> {
    match a {
        Assignment::Field { target, value } => {
            set_separator(ctx, first);
            ctx.append_set_target(target)?;
            ctx.push(" = ");
            ctx.append_expr(value, Some(&target.field))
        }
        Assignment::Row {
            targets,
            values: RowValues::List(list),
        } => {
            for (target, value) in targets.iter().zip(list) {
                set_separator(ctx, first);
                ctx.append_set_target(target)?;
                ctx.push(" = ");
                ctx.append_expr(value, Some(&target.field))?;
            }
            Ok(())
        }
        Assignment::Row {
            targets,
            values: RowValues::Query(query),
        } => {
            if !ctx.dialect().supports_row_set_query() {
                return Err(ctx.dialect().unsupported("row assignment from sub-query"));
            }
            set_separator(ctx, first);
            ctx.push("(");
            for (i, target) in targets.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                ctx.append_set_target(target)?;
            }
            ctx.push(") = ");
            ctx.append_subquery(query)
        }
    }
}

/// Guarded targets of `assignments` owned by `table`, written through `alias`.
fn guarded(assignments: &[Assignment], table: &TableMeta, alias: &str) -> Vec<(String, Arc<FieldMeta>)> {
    assignments
        .iter()
        .flat_map(Assignment::targets)
        .filter(|t| table.owns(&t.field))
        .filter(|t| {
            matches!(
                t.field.update_mode(),
                UpdateMode::OnlyIfNull | UpdateMode::OnlyIfDefault
            )
        })
        .map(|t| (alias.to_string(), t.field.clone()))
        .collect()
}

fn append_where(ctx: &mut StatementContext<'_>, cond: &mut Conditions, predicates: &[Predicate]) -> CompileResult<()> {
    for p in predicates {
        cond.next(ctx);
        ctx.append_predicate(p)?;
    }
    Ok(())
}

/// Single or parent table, optionally with extra joined tables.
///
/// A parent-table target addresses every row of the family, whatever its subtype, so no
/// discriminator filter is added. Subtype rows are narrowed by targeting the child table.
fn single<'c>(cx: &'c Compiler, stmt: &Update, visible: Visible) -> CompileResult<StatementContext<'c>> {
    let table = &stmt.table;
    let alias = stmt.alias.as_str();
    let mut ctx = cx.context(StmtKind::Update, visible).for_table(table.name());
    let mut scope = Scope::new();
    scope.add_table(table, alias)?;
    register_joins(&mut scope, &stmt.joins)?;
    ctx.push_scope(scope);

    let style = if stmt.joins.is_empty() {
        None
    } else {
        Some(cx.dialect().update_join_style())
    };
    ctx.push("UPDATE ");
    ctx.append_table(table.name(), alias)?;
    match style {
        Some(JoinStyle::Join) => ctx.append_joins(&stmt.joins)?,
        Some(JoinStyle::Unsupported) => return Err(cx.dialect().unsupported("multi-table update")),
        Some(JoinStyle::From) | None => {}
    }

    ctx.push(" SET ");
    let mut first = true;
    for a in &stmt.assignments {
        append_assignment(&mut ctx, a, &mut first)?;
    }
    clause::managed_set(cx, &mut ctx, table, alias, &mut first)?;

    let mut moved: &[Predicate] = &[];
    if style == Some(JoinStyle::From) {
        ctx.push(" FROM ");
        moved = ctx.append_from_list(&stmt.joins)?;
    }
    let mut cond = Conditions::new();
    append_where(&mut ctx, &mut cond, moved)?;
    append_where(&mut ctx, &mut cond, &stmt.predicates)?;
    clause::guards(&mut ctx, &mut cond, &guarded(&stmt.assignments, table, alias))?;
    clause::visible(&mut ctx, &mut cond, table, alias)?;
    Ok(ctx)
}

/// Child and parent updated by one statement joining both tables.
fn joined<'c>(
    cx: &'c Compiler,
    stmt: &Update,
    parent: &Arc<TableMeta>,
    visible: Visible,
) -> CompileResult<StatementContext<'c>> {
    let child = &stmt.table;
    let alias = stmt.alias.as_str();
    let palias = parent_alias(alias);
    let mut ctx = cx.context(StmtKind::Update, visible).for_table(child.name());
    let mut scope = Scope::new();
    scope.add_table(child, alias)?;
    scope.add_hidden(parent, &palias, alias)?;
    register_joins(&mut scope, &stmt.joins)?;
    ctx.push_scope(scope);

    if !stmt.joins.is_empty() && cx.dialect().update_join_style() != JoinStyle::Join {
        return Err(cx.dialect().unsupported("multi-table update of a child table"));
    }
    ctx.push("UPDATE ");
    ctx.append_table(child.name(), alias)?;
    ctx.push(" JOIN ");
    ctx.append_table(parent.name(), &palias)?;
    ctx.push(" ON ");
    ctx.append_qualified(&palias, parent.id().column())?;
    ctx.push(" = ");
    ctx.append_qualified(alias, child.id().column())?;
    ctx.append_joins(&stmt.joins)?;

    ctx.push(" SET ");
    let mut first = true;
    for a in &stmt.assignments {
        append_assignment(&mut ctx, a, &mut first)?;
    }
    clause::managed_set(cx, &mut ctx, parent, &palias, &mut first)?;
    clause::managed_set(cx, &mut ctx, child, alias, &mut first)?;

    let mut cond = Conditions::new();
    append_where(&mut ctx, &mut cond, &stmt.predicates)?;
    let mut targets = guarded(&stmt.assignments, parent, &palias);
    targets.extend(guarded(&stmt.assignments, child, alias));
    clause::guards(&mut ctx, &mut cond, &targets)?;
    clause::discriminator(&mut ctx, &mut cond, child, &palias)?;
    clause::visible(&mut ctx, &mut cond, parent, &palias)?;
    clause::visible(&mut ctx, &mut cond, child, alias)?;
    Ok(ctx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    Parent,
    Child,
    /// Child statement without a parent statement: parent checks become a sub-query.
    ChildOnly,
}

fn split(
    cx: &Compiler,
    stmt: &Update,
    parent: &Arc<TableMeta>,
    visible: Visible,
    rows: Option<&[&dyn RowAccessor]>,
) -> CompileResult<Stmt> {
    let child = &stmt.table;
    let mut parent_items = Vec::new();
    let mut child_items = Vec::new();
    for a in &stmt.assignments {
        let targets = a.targets();
        let owned = targets.iter().filter(|t| parent.owns(&t.field)).count();
        if owned == targets.len() {
            parent_items.push(a.clone());
        } else if owned == 0 {
            child_items.push(a.clone());
        } else {
            let Assignment::Row {
                targets,
                values: RowValues::List(list),
            } = a
            else {
                return Err(cx
                    .dialect()
                    .unsupported("row assignment across parent and child tables"));
            };
            for (target, value) in targets.iter().zip(list) {
                let item = Assignment::set(target.clone(), value.clone());
                if parent.owns(&target.field) {
                    parent_items.push(item);
                } else {
                    child_items.push(item);
                }
            }
        }
    }

    let parent_needed = !parent_items.is_empty() || clause::has_managed_set(parent);
    let child_needed = !child_items.is_empty() || clause::has_managed_set(child);
    trace!(
        target: "armsql.sql",
        table = %child.name(),
        parent = parent_needed,
        child = child_needed,
        "split child update"
    );

    let primary_first = stmt.predicates.first().is_some_and(|p| p.is_primary(child));
    match (parent_needed, child_needed) {
        (true, true) => {
            if !primary_first {
                return Err(no_primary(child));
            }
            let p = half(cx, stmt, parent, Half::Parent, &parent_items, &stmt.predicates, visible)?;
            let c = half(cx, stmt, parent, Half::Child, &child_items, &stmt.predicates[..1], visible)?;
            Ok(Stmt::Pair(PairStmt {
                parent: Box::new(finish(p, rows)?),
                child: Box::new(finish(c, rows)?),
            }))
        }
        (true, false) => {
            if !primary_first && stmt.predicates.iter().any(|p| p.references(child)) {
                return Err(no_primary(child));
            }
            let p = half(cx, stmt, parent, Half::Parent, &parent_items, &stmt.predicates, visible)?;
            finish(p, rows)
        }
        (false, _) => {
            let c = half(cx, stmt, parent, Half::ChildOnly, &child_items, &stmt.predicates, visible)?;
            finish(c, rows)
        }
    }
}

fn no_primary(table: &TableMeta) -> CompileError {
    CompileError::NoPrimaryPredicate {
        kind: StmtKind::Update,
        table: table.name().to_string(),
    }
}

/// One statement of a split child update, written against the caller's alias.
fn half<'c>(
    cx: &'c Compiler,
    stmt: &Update,
    parent: &Arc<TableMeta>,
    side: Half,
    items: &[Assignment],
    predicates: &[Predicate],
    visible: Visible,
) -> CompileResult<StatementContext<'c>> {
    let child = &stmt.table;
    let alias = stmt.alias.as_str();
    let (target, correlation) = match side {
        Half::Parent => (
            parent,
            Correlation {
                owner_alias: alias.to_string(),
                owner_id: parent.id().clone(),
                other: child.clone(),
                other_alias: child_alias(alias),
                discriminator: None,
            },
        ),
        Half::Child | Half::ChildOnly => (
            child,
            Correlation {
                owner_alias: alias.to_string(),
                owner_id: child.id().clone(),
                other: parent.clone(),
                other_alias: parent_alias(alias),
                discriminator: child
                    .discriminator()
                    .cloned()
                    .zip(child.discriminator_value().cloned()),
            },
        ),
    };
    let mut ctx = cx.context(StmtKind::Update, visible).for_table(target.name());
    let mut scope = Scope::new();
    scope.add_table(target, alias)?;
    scope.add_correlation(correlation);
    ctx.push_scope(scope);

    ctx.push("UPDATE ");
    ctx.append_table(target.name(), alias)?;
    ctx.push(" SET ");
    let mut first = true;
    for a in items {
        append_assignment(&mut ctx, a, &mut first)?;
    }
    clause::managed_set(cx, &mut ctx, target, alias, &mut first)?;

    let mut cond = Conditions::new();
    append_where(&mut ctx, &mut cond, predicates)?;
    clause::guards(&mut ctx, &mut cond, &guarded(items, target, alias))?;
    match side {
        Half::Parent => {
            clause::discriminator(&mut ctx, &mut cond, child, alias)?;
            clause::visible(&mut ctx, &mut cond, parent, alias)?;
            clause::child_exists(&mut ctx, &mut cond, child, alias, &child_alias(alias))?;
        }
        Half::Child => clause::visible(&mut ctx, &mut cond, child, alias)?,
        Half::ChildOnly => {
            clause::visible(&mut ctx, &mut cond, child, alias)?;
            clause::parent_exists(&mut ctx, &mut cond, child, alias, &parent_alias(alias))?;
        }
    }
    Ok(ctx)
}
