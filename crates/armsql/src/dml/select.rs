//! SELECT and standalone VALUES.

use super::clause::{self, Conditions};
use crate::ast::{JoinType, OrderItem, Select, SelectItem, TableBlock, TableItem, Values};
use crate::context::{Scope, StatementContext};
use crate::error::{CompileError, CompileResult};
use crate::meta::TableKind;

impl StatementContext<'_> {
    /// Write a SELECT at a new scope level.
    pub(crate) fn append_select(&mut self, select: &Select) -> CompileResult<()> {
        let mut scope = Scope::new();
        for block in &select.from {
            match &block.item {
                TableItem::Table { table, alias } => scope.add_table(table, alias)?,
                TableItem::Derived { alias, .. } => scope.add_derived(alias)?,
            }
        }
        self.push_scope(scope);
        let result = self.append_select_body(select);
        self.pop_scope();
        result
    }

    fn append_select_body(&mut self, select: &Select) -> CompileResult<()> {
        self.push("SELECT ");
        if select.distinct {
            self.push("DISTINCT ");
        }
        if select.items.is_empty() {
            self.push("*");
        }
        for (i, item) in select.items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            match item {
                SelectItem::Expr { expr, alias } => {
                    self.append_expr(expr, None)?;
                    if let Some(alias) = alias {
                        self.push(" AS ");
                        self.append_identifier(alias)?;
                    }
                }
                SelectItem::All(None) => {
                    self.push("*");
                }
                SelectItem::All(Some(alias)) => {
                    self.append_identifier(alias)?;
                    self.push(".*");
                }
            }
        }

        for (i, block) in select.from.iter().enumerate() {
            self.append_block(block, i == 0)?;
        }

        let mut cond = Conditions::new();
        for p in &select.predicates {
            cond.next(self);
            self.append_predicate(p)?;
        }
        self.append_injected(select, &mut cond)?;

        if !select.group_by.is_empty() {
            self.push(" GROUP BY ");
            for (i, e) in select.group_by.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.append_expr(e, None)?;
            }
        }
        if !select.having.is_empty() {
            self.push(" HAVING ");
            self.append_conjunction(&select.having)?;
        }
        self.append_order_by(&select.order_by)?;
        let dialect = self.dialect();
        let mut tail = String::new();
        dialect.write_limit_offset(&mut tail, select.limit, select.offset);
        if let Some(lock) = &select.lock {
            dialect.write_lock(&mut tail, lock)?;
        }
        self.push(&tail);
        Ok(())
    }

    /// Discriminator and visibility filters of the FROM tables.
    fn append_injected(&mut self, select: &Select, cond: &mut Conditions) -> CompileResult<()> {
        let tables: Vec<_> = select
            .from
            .iter()
            .filter_map(|b| match &b.item {
                TableItem::Table { table, alias } => Some((table.clone(), alias.clone())),
                TableItem::Derived { .. } => None,
            })
            .collect();

        for (table, _) in tables.iter().filter(|(t, _)| t.kind() == TableKind::Child) {
            let parent_alias = table.parent().and_then(|parent| {
                tables
                    .iter()
                    .find(|(t, _)| t.as_ref() == parent.as_ref())
                    .map(|(_, a)| a.clone())
            });
            if let Some(parent_alias) = parent_alias {
                clause::discriminator(self, cond, table, &parent_alias)?;
            }
        }
        for (table, alias) in &tables {
            clause::visible(self, cond, table, alias)?;
        }
        Ok(())
    }

    fn append_block(&mut self, block: &TableBlock, first: bool) -> CompileResult<()> {
        if first {
            self.push(" FROM ");
        } else {
            self.push(" ");
            self.push(block.join.keyword());
            self.push(" ");
        }
        self.append_table_item(&block.item)?;
        if !block.on.is_empty() {
            if first || block.join == JoinType::Cross {
                return Err(CompileError::Config(format!(
                    "ON clause not allowed on FROM item '{}'",
                    block.item.alias()
                )));
            }
            self.push(" ON ");
            self.append_conjunction(&block.on)?;
        }
        Ok(())
    }

    pub(crate) fn append_table_item(&mut self, item: &TableItem) -> CompileResult<()> {
        match item {
            TableItem::Table { table, alias } => self.append_table(table.name(), alias),
            TableItem::Derived { query, alias } => {
                if query.lateral {
                    if !self.dialect().supports_lateral() {
                        return Err(self.dialect().unsupported("LATERAL"));
                    }
                    self.push("LATERAL (");
                    self.append_select(&query.select)?;
                } else {
                    self.push("(");
                    let hidden = self.hide_scope();
                    let result = self.append_select(&query.select);
                    self.restore_scope(hidden);
                    result?;
                }
                self.push(if self.dialect().table_alias_after_as() { ") AS " } else { ") " });
                self.append_identifier(alias)
            }
        }
    }

    fn append_order_by(&mut self, items: &[OrderItem]) -> CompileResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.push(" ORDER BY ");
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.append_expr(&item.expr, None)?;
            if item.desc {
                self.push(" DESC");
            }
        }
        Ok(())
    }

    /// Write a standalone VALUES statement.
    pub(crate) fn append_values(&mut self, values: &Values) -> CompileResult<()> {
        if !self.dialect().supports_values_statement() {
            return Err(self.dialect().unsupported("VALUES statement"));
        }
        let Some(width) = values.rows.first().map(Vec::len) else {
            return Err(CompileError::EmptyInsert {
                table: "VALUES".to_string(),
            });
        };
        let prefix = self.dialect().values_row_prefix();
        self.push("VALUES ");
        for (i, row) in values.rows.iter().enumerate() {
            if row.len() != width {
                return Err(CompileError::SetArity {
                    kind: self.kind(),
                    table: "VALUES".to_string(),
                    targets: width,
                    values: row.len(),
                });
            }
            if i > 0 {
                self.push(", ");
            }
            self.push(prefix);
            self.push("(");
            for (j, e) in row.iter().enumerate() {
                if j > 0 {
                    self.push(", ");
                }
                self.append_expr(e, None)?;
            }
            self.push(")");
        }
        self.append_order_by(&values.order_by)?;
        let mut tail = String::new();
        self.dialect().write_limit_offset(&mut tail, values.limit, values.offset);
        self.push(&tail);
        Ok(())
    }
}
