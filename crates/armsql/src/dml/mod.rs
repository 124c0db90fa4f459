//! Statement compilers.
//!
//! Each compiler walks its syntax tree once, writing through a [`StatementContext`]. Writes to
//! a child table either use one multi-table statement (when the dialect has one) or split into
//! a parent-first [`PairStmt`](crate::PairStmt).

mod clause;
pub(crate) mod delete;
pub(crate) mod insert;
mod render;
mod select;
pub(crate) mod update;

use crate::ast::{JoinType, Predicate, TableBlock, TableItem};
use crate::context::{Scope, StatementContext};
use crate::error::{CompileError, CompileResult};
use crate::row::RowAccessor;
use crate::stmt::Stmt;

/// Alias of the parent table joined or correlated for a child aliased `alias`.
pub(crate) fn parent_alias(alias: &str) -> String {
    format!("p_of_{alias}")
}

/// Alias of the child table correlated from the parent half.
pub(crate) fn child_alias(alias: &str) -> String {
    format!("c_of_{alias}")
}

/// Add the extra tables of a multi-table statement to `scope`.
pub(crate) fn register_joins(scope: &mut Scope, joins: &[TableBlock]) -> CompileResult<()> {
    for block in joins {
        match &block.item {
            TableItem::Table { table, alias } => scope.add_table(table, alias)?,
            TableItem::Derived { alias, .. } => scope.add_derived(alias)?,
        }
    }
    Ok(())
}

impl StatementContext<'_> {
    /// ` JOIN item ON ..` for each block; a block without join type is an inner join.
    pub(crate) fn append_joins(&mut self, joins: &[TableBlock]) -> CompileResult<()> {
        for block in joins {
            let join = match block.join {
                JoinType::None => JoinType::Inner,
                other => other,
            };
            self.push(" ");
            self.push(join.keyword());
            self.push(" ");
            self.append_table_item(&block.item)?;
            if !block.on.is_empty() {
                self.push(" ON ");
                self.append_conjunction(&block.on)?;
            }
        }
        Ok(())
    }

    /// `item [JOIN ..]` as a FROM/USING list. The first block's ON predicates are returned so
    /// the caller can move them into WHERE.
    pub(crate) fn append_from_list<'b>(&mut self, joins: &'b [TableBlock]) -> CompileResult<&'b [Predicate]> {
        let Some((first, rest)) = joins.split_first() else {
            return Ok(&[]);
        };
        if first.join.is_outer() {
            return Err(self.dialect().unsupported("outer join as first joined table"));
        }
        self.append_table_item(&first.item)?;
        self.append_joins(rest)?;
        Ok(&first.on)
    }
}

/// Finish as a batch when rows are given.
pub(crate) fn finish(ctx: StatementContext<'_>, rows: Option<&[&dyn RowAccessor]>) -> CompileResult<Stmt> {
    Ok(match rows {
        Some(rows) => Stmt::Batch(ctx.build_batch(rows)?),
        None => Stmt::Simple(ctx.build()?),
    })
}

pub(crate) fn missing_parent(table: &crate::meta::TableMeta) -> CompileError {
    CompileError::Config(format!("child table '{}' has no parent", table.name()))
}
