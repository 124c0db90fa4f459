//! Clauses the compiler adds on its own: visibility and discriminator filters, update
//! guards, and managed SET items.

use crate::Compiler;
use crate::context::StatementContext;
use crate::error::CompileResult;
use crate::meta::{FieldMeta, TableMeta, UpdateMode};
use crate::value::Value;
use std::sync::Arc;

/// Writes ` WHERE ` before the first condition and ` AND ` before the rest.
#[derive(Debug)]
pub(crate) struct Conditions {
    started: bool,
}

impl Conditions {
    pub fn new() -> Self {
        Self { started: false }
    }

    /// A WHERE clause already opened by someone else.
    pub fn continued(started: bool) -> Self {
        Self { started }
    }

    pub fn next(&mut self, ctx: &mut StatementContext<'_>) {
        ctx.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
    }
}

/// `alias.visible = TRUE|FALSE`, when the table tracks visibility and a filter is requested.
pub(crate) fn visible(
    ctx: &mut StatementContext<'_>,
    cond: &mut Conditions,
    table: &TableMeta,
    alias: &str,
) -> CompileResult<()> {
    let (Some(field), Some(value)) = (table.visible(), ctx.visible().value()) else {
        return Ok(());
    };
    cond.next(ctx);
    ctx.append_qualified(alias, field.column())?;
    ctx.push(" = ");
    ctx.append_literal(field.mapping(), &Value::Bool(value))
}

/// `parent_alias.discriminator = code` for rows of `child`.
pub(crate) fn discriminator(
    ctx: &mut StatementContext<'_>,
    cond: &mut Conditions,
    child: &TableMeta,
    parent_alias: &str,
) -> CompileResult<()> {
    let (Some(field), Some(code)) = (child.discriminator(), child.discriminator_value()) else {
        return Ok(());
    };
    cond.next(ctx);
    ctx.append_qualified(parent_alias, field.column())?;
    ctx.push(" = ");
    ctx.append_literal(field.mapping(), code)
}

/// Parent checks of a statement that only touches the child table:
/// `EXISTS (SELECT 1 FROM parent AS p WHERE p.id = a.id AND p.disc = code [AND p.visible = ..])`
pub(crate) fn parent_exists(
    ctx: &mut StatementContext<'_>,
    cond: &mut Conditions,
    child: &TableMeta,
    child_alias: &str,
    parent_alias: &str,
) -> CompileResult<()> {
    let Some(parent) = child.parent() else {
        return Ok(());
    };
    cond.next(ctx);
    ctx.push("EXISTS (SELECT 1 FROM ");
    ctx.append_table(parent.name(), parent_alias)?;
    ctx.push(" WHERE ");
    ctx.append_qualified(parent_alias, parent.id().column())?;
    ctx.push(" = ");
    ctx.append_qualified(child_alias, child.id().column())?;
    let mut inner = Conditions::continued(true);
    discriminator(ctx, &mut inner, child, parent_alias)?;
    visible(ctx, &mut inner, parent, parent_alias)?;
    ctx.push(")");
    Ok(())
}

/// Child visibility of a statement that only touches the parent table:
/// `EXISTS (SELECT 1 FROM child AS c WHERE c.id = a.id AND c.visible = ..)`
///
/// Written only when the child tracks visibility and a filter is requested.
pub(crate) fn child_exists(
    ctx: &mut StatementContext<'_>,
    cond: &mut Conditions,
    child: &TableMeta,
    parent_alias: &str,
    child_alias: &str,
) -> CompileResult<()> {
    let Some(parent) = child.parent() else {
        return Ok(());
    };
    if child.visible().is_none() || ctx.visible().value().is_none() {
        return Ok(());
    }
    cond.next(ctx);
    ctx.push("EXISTS (SELECT 1 FROM ");
    ctx.append_table(child.name(), child_alias)?;
    ctx.push(" WHERE ");
    ctx.append_qualified(child_alias, child.id().column())?;
    ctx.push(" = ");
    ctx.append_qualified(parent_alias, parent.id().column())?;
    let mut inner = Conditions::continued(true);
    visible(ctx, &mut inner, child, child_alias)?;
    ctx.push(")");
    Ok(())
}

/// Guards of only-if-null and only-if-default targets.
pub(crate) fn guards(
    ctx: &mut StatementContext<'_>,
    cond: &mut Conditions,
    targets: &[(String, Arc<FieldMeta>)],
) -> CompileResult<()> {
    for (alias, field) in targets {
        match field.update_mode() {
            UpdateMode::OnlyIfNull => {
                cond.next(ctx);
                ctx.append_qualified(alias, field.column())?;
                ctx.push(" IS NULL");
            }
            UpdateMode::OnlyIfDefault => {
                if !ctx.dialect().supports_only_default() {
                    return Err(ctx.dialect().unsupported("only-if-default update"));
                }
                cond.next(ctx);
                ctx.append_qualified(alias, field.column())?;
                ctx.push(" = DEFAULT(");
                ctx.append_qualified(alias, field.column())?;
                ctx.push(")");
            }
            UpdateMode::Updatable | UpdateMode::Immutable => {}
        }
    }
    Ok(())
}

/// Separator of SET items.
pub(crate) fn set_separator(ctx: &mut StatementContext<'_>, first: &mut bool) {
    if !*first {
        ctx.push(", ");
    }
    *first = false;
}

fn set_target(ctx: &mut StatementContext<'_>, alias: &str, field: &FieldMeta) -> CompileResult<()> {
    if ctx.dialect().set_clause_table_alias() {
        ctx.append_qualified(alias, field.column())
    } else {
        ctx.append_identifier(field.column())
    }
}

/// `version = alias.version + 1` and `update_time = ?` for `table`.
pub(crate) fn managed_set(
    cx: &Compiler,
    ctx: &mut StatementContext<'_>,
    table: &TableMeta,
    alias: &str,
    first: &mut bool,
) -> CompileResult<()> {
    if let Some(version) = table.version() {
        set_separator(ctx, first);
        set_target(ctx, alias, version)?;
        ctx.push(" = ");
        ctx.append_qualified(alias, version.column())?;
        ctx.push(" + 1");
    }
    if let Some(update_time) = table.update_time() {
        let now = cx.managed.now_for(update_time, cx.clock.now())?;
        set_separator(ctx, first);
        set_target(ctx, alias, update_time)?;
        ctx.push(" = ");
        ctx.append_value(update_time.mapping(), update_time.codec(), now)?;
    }
    Ok(())
}

/// Whether `table` gets managed SET items.
pub(crate) fn has_managed_set(table: &TableMeta) -> bool {
    table.version().is_some() || table.update_time().is_some()
}
