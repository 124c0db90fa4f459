use super::clause::{self, Conditions};
use super::{child_alias, finish, missing_parent, parent_alias, register_joins};
use crate::Compiler;
use crate::ast::{Delete, Predicate, Visible};
use crate::context::{Correlation, Scope, StatementContext};
use crate::dialect::JoinStyle;
use crate::error::{CompileError, CompileResult};
use crate::meta::{TableKind, TableMeta};
use crate::row::RowAccessor;
use crate::stmt::{PairStmt, Stmt, StmtKind};
use std::sync::Arc;

pub(crate) fn compile(
    cx: &Compiler,
    stmt: &Delete,
    visible: Visible,
    rows: Option<&[&dyn RowAccessor]>,
) -> CompileResult<Stmt> {
    let table = &stmt.table;
    if stmt.predicates.is_empty() {
        return Err(CompileError::EmptyWhere {
            kind: StmtKind::Delete,
            table: table.name().to_string(),
        });
    }
    if table.kind() != TableKind::Child {
        let ctx = single(cx, stmt, visible)?;
        return finish(ctx, rows);
    }
    let parent = table.parent().ok_or_else(|| missing_parent(table))?;
    if cx.dialect().supports_multi_table_delete() {
        let ctx = joined(cx, stmt, parent, visible)?;
        return finish(ctx, rows);
    }
    if !stmt.joins.is_empty() {
        return Err(cx.dialect().unsupported("multi-table delete of a child table"));
    }
    if !stmt.predicates[0].is_primary(table) {
        return Err(CompileError::NoPrimaryPredicate {
            kind: StmtKind::Delete,
            table: table.name().to_string(),
        });
    }
    let p = parent_half(cx, stmt, parent, visible)?;
    let c = child_half(cx, stmt, visible)?;
    Ok(Stmt::Pair(PairStmt {
        parent: Box::new(finish(p, rows)?),
        child: Box::new(finish(c, rows)?),
    }))
}

fn append_where(ctx: &mut StatementContext<'_>, cond: &mut Conditions, predicates: &[Predicate]) -> CompileResult<()> {
    for p in predicates {
        cond.next(ctx);
        ctx.append_predicate(p)?;
    }
    Ok(())
}

/// Single or parent table.
///
/// A parent-table target addresses every row of the family, whatever its subtype, so no
/// discriminator filter is added. Subtype rows are narrowed by targeting the child table.
fn single<'c>(cx: &'c Compiler, stmt: &Delete, visible: Visible) -> CompileResult<StatementContext<'c>> {
    let table = &stmt.table;
    let alias = stmt.alias.as_str();
    let mut ctx = cx.context(StmtKind::Delete, visible).for_table(table.name());
    let mut scope = Scope::new();
    scope.add_table(table, alias)?;
    register_joins(&mut scope, &stmt.joins)?;
    ctx.push_scope(scope);

    let mut moved: &[Predicate] = &[];
    if stmt.joins.is_empty() {
        ctx.push("DELETE FROM ");
        ctx.append_table(table.name(), alias)?;
    } else {
        match cx.dialect().delete_join_style() {
            JoinStyle::Join => {
                ctx.push("DELETE ");
                ctx.append_identifier(alias)?;
                ctx.push(" FROM ");
                ctx.append_table(table.name(), alias)?;
                ctx.append_joins(&stmt.joins)?;
            }
            JoinStyle::From => {
                ctx.push("DELETE FROM ");
                ctx.append_table(table.name(), alias)?;
                ctx.push(" USING ");
                moved = ctx.append_from_list(&stmt.joins)?;
            }
            JoinStyle::Unsupported => return Err(cx.dialect().unsupported("multi-table delete")),
        }
    }
    let mut cond = Conditions::new();
    append_where(&mut ctx, &mut cond, moved)?;
    append_where(&mut ctx, &mut cond, &stmt.predicates)?;
    clause::visible(&mut ctx, &mut cond, table, alias)?;
    Ok(ctx)
}

/// `DELETE a, p FROM child AS a JOIN parent AS p ON p.id = a.id ..`
fn joined<'c>(
    cx: &'c Compiler,
    stmt: &Delete,
    parent: &Arc<TableMeta>,
    visible: Visible,
) -> CompileResult<StatementContext<'c>> {
    let child = &stmt.table;
    let alias = stmt.alias.as_str();
    let palias = parent_alias(alias);
    if !stmt.joins.is_empty() && cx.dialect().delete_join_style() != JoinStyle::Join {
        return Err(cx.dialect().unsupported("multi-table delete of a child table"));
    }
    let mut ctx = cx.context(StmtKind::Delete, visible).for_table(child.name());
    let mut scope = Scope::new();
    scope.add_table(child, alias)?;
    scope.add_hidden(parent, &palias, alias)?;
    register_joins(&mut scope, &stmt.joins)?;
    ctx.push_scope(scope);

    ctx.push("DELETE ");
    ctx.append_identifier(alias)?;
    ctx.push(", ");
    ctx.append_identifier(&palias)?;
    ctx.push(" FROM ");
    ctx.append_table(child.name(), alias)?;
    ctx.push(" JOIN ");
    ctx.append_table(parent.name(), &palias)?;
    ctx.push(" ON ");
    ctx.append_qualified(&palias, parent.id().column())?;
    ctx.push(" = ");
    ctx.append_qualified(alias, child.id().column())?;
    ctx.append_joins(&stmt.joins)?;

    let mut cond = Conditions::new();
    append_where(&mut ctx, &mut cond, &stmt.predicates)?;
    clause::discriminator(&mut ctx, &mut cond, child, &palias)?;
    clause::visible(&mut ctx, &mut cond, parent, &palias)?;
    clause::visible(&mut ctx, &mut cond, child, alias)?;
    Ok(ctx)
}

/// Parent rows first, with every predicate; child fields read through a correlated lookup.
fn parent_half<'c>(
    cx: &'c Compiler,
    stmt: &Delete,
    parent: &Arc<TableMeta>,
    visible: Visible,
) -> CompileResult<StatementContext<'c>> {
    let child = &stmt.table;
    let alias = stmt.alias.as_str();
    let mut ctx = cx.context(StmtKind::Delete, visible).for_table(parent.name());
    let mut scope = Scope::new();
    scope.add_table(parent, alias)?;
    scope.add_correlation(Correlation {
        owner_alias: alias.to_string(),
        owner_id: parent.id().clone(),
        other: child.clone(),
        other_alias: child_alias(alias),
        discriminator: None,
    });
    ctx.push_scope(scope);

    ctx.push("DELETE FROM ");
    ctx.append_table(parent.name(), alias)?;
    let mut cond = Conditions::new();
    append_where(&mut ctx, &mut cond, &stmt.predicates)?;
    clause::discriminator(&mut ctx, &mut cond, child, alias)?;
    clause::visible(&mut ctx, &mut cond, parent, alias)?;
    clause::child_exists(&mut ctx, &mut cond, child, alias, &child_alias(alias))?;
    Ok(ctx)
}

/// Child rows keyed by the leading primary predicate.
fn child_half<'c>(cx: &'c Compiler, stmt: &Delete, visible: Visible) -> CompileResult<StatementContext<'c>> {
    let child = &stmt.table;
    let alias = stmt.alias.as_str();
    let mut ctx = cx.context(StmtKind::Delete, visible).for_table(child.name());
    let mut scope = Scope::new();
    scope.add_table(child, alias)?;
    if let Some(parent) = child.parent() {
        scope.add_correlation(Correlation {
            owner_alias: alias.to_string(),
            owner_id: child.id().clone(),
            other: parent.clone(),
            other_alias: parent_alias(alias),
            discriminator: child.discriminator().cloned().zip(child.discriminator_value().cloned()),
        });
    }
    ctx.push_scope(scope);

    ctx.push("DELETE FROM ");
    ctx.append_table(child.name(), alias)?;
    let mut cond = Conditions::new();
    append_where(&mut ctx, &mut cond, &stmt.predicates[..1])?;
    clause::visible(&mut ctx, &mut cond, child, alias)?;
    Ok(ctx)
}
