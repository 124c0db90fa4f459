//! SELECT, sub-queries, and standalone VALUES.

use super::expr::{Expr, FieldRef};
use super::predicate::Predicate;
use crate::meta::TableMeta;
use std::sync::Arc;

/// Join operator of a FROM block. The first block uses [`JoinType::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    None,
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinType::None => "",
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }

    /// Outer joins cannot be moved into a FROM list.
    pub fn is_outer(self) -> bool {
        matches!(self, JoinType::Left | JoinType::Right | JoinType::Full)
    }
}

/// Source of a FROM block.
#[derive(Debug, Clone)]
pub enum TableItem {
    Table { table: Arc<TableMeta>, alias: String },
    /// Derived table; lateral only when [`SubQuery::lateral`] is set.
    Derived { query: Box<SubQuery>, alias: String },
}

impl TableItem {
    pub fn alias(&self) -> &str {
        match self {
            TableItem::Table { alias, .. } | TableItem::Derived { alias, .. } => alias,
        }
    }
}

/// A FROM/JOIN entry.
#[derive(Debug, Clone)]
pub struct TableBlock {
    pub join: JoinType,
    pub item: TableItem,
    pub on: Vec<Predicate>,
}

impl TableBlock {
    /// First block of a FROM clause.
    pub fn table(table: &Arc<TableMeta>, alias: impl Into<String>) -> Self {
        Self {
            join: JoinType::None,
            item: TableItem::Table {
                table: table.clone(),
                alias: alias.into(),
            },
            on: Vec::new(),
        }
    }

    pub fn join(join: JoinType, table: &Arc<TableMeta>, alias: impl Into<String>, on: Vec<Predicate>) -> Self {
        Self {
            join,
            item: TableItem::Table {
                table: table.clone(),
                alias: alias.into(),
            },
            on,
        }
    }

    pub fn derived(join: JoinType, query: SubQuery, alias: impl Into<String>, on: Vec<Predicate>) -> Self {
        Self {
            join,
            item: TableItem::Derived {
                query: Box::new(query),
                alias: alias.into(),
            },
            on,
        }
    }
}

/// An entry of the select list.
#[derive(Debug, Clone)]
pub enum SelectItem {
    Expr { expr: Expr, alias: Option<String> },
    /// `*` or `alias.*`.
    All(Option<String>),
}

/// ORDER BY entry.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub expr: Expr,
    pub desc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Update,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockWait {
    #[default]
    Wait,
    NoWait,
    SkipLocked,
}

/// Row lock clause of a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lock {
    pub mode: LockMode,
    pub wait: LockWait,
}

impl Lock {
    pub fn update() -> Self {
        Self {
            mode: LockMode::Update,
            wait: LockWait::Wait,
        }
    }

    pub fn share() -> Self {
        Self {
            mode: LockMode::Share,
            wait: LockWait::Wait,
        }
    }

    pub fn nowait(mut self) -> Self {
        self.wait = LockWait::NoWait;
        self
    }

    pub fn skip_locked(mut self) -> Self {
        self.wait = LockWait::SkipLocked;
        self
    }
}

/// A SELECT statement.
///
/// # Example
/// ```ignore
/// let stmt = Select::from(&user, "u")
///     .item(Expr::field_of("u", user.id()), None)
///     .filter(Predicate::eq(Expr::field_of("u", &name), Expr::value("cat")))
///     .limit(10);
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Select {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    pub from: Vec<TableBlock>,
    pub predicates: Vec<Predicate>,
    pub group_by: Vec<Expr>,
    pub having: Vec<Predicate>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lock: Option<Lock>,
}

impl Select {
    /// Select from `table` aliased `alias`.
    pub fn from(table: &Arc<TableMeta>, alias: impl Into<String>) -> Self {
        Self {
            from: vec![TableBlock::table(table, alias)],
            ..Self::default()
        }
    }

    /// Select from a derived table.
    pub fn from_derived(query: SubQuery, alias: impl Into<String>) -> Self {
        Self {
            from: vec![TableBlock::derived(JoinType::None, query, alias, Vec::new())],
            ..Self::default()
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn item(mut self, expr: impl Into<Expr>, alias: Option<&str>) -> Self {
        self.items.push(SelectItem::Expr {
            expr: expr.into(),
            alias: alias.map(str::to_string),
        });
        self
    }

    /// `*`, or `alias.*` when `alias` is given.
    pub fn all(mut self, alias: Option<&str>) -> Self {
        self.items.push(SelectItem::All(alias.map(str::to_string)));
        self
    }

    pub fn join(mut self, block: TableBlock) -> Self {
        self.from.push(block);
        self
    }

    /// Add a WHERE predicate, ANDed with the others.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn group_by(mut self, expr: impl Into<Expr>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having.push(predicate);
        self
    }

    pub fn order_by(mut self, expr: impl Into<Expr>, desc: bool) -> Self {
        self.order_by.push(OrderItem {
            expr: expr.into(),
            desc,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn lock(mut self, lock: Lock) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Wrap as a sub-query.
    pub fn sub(self) -> SubQuery {
        SubQuery {
            select: self,
            lateral: false,
        }
    }

    /// Wrap as a lateral derived table.
    pub fn lateral(self) -> SubQuery {
        SubQuery {
            select: self,
            lateral: true,
        }
    }

    /// Number of select-list columns, `None` when a `*` item makes it unknown.
    pub fn width(&self) -> Option<usize> {
        let mut n = 0;
        for item in &self.items {
            match item {
                SelectItem::Expr { .. } => n += 1,
                SelectItem::All(_) => return None,
            }
        }
        Some(n)
    }

    /// Visit every field reference, including nested sub-queries.
    pub fn visit_fields(&self, f: &mut dyn FnMut(&FieldRef)) {
        for item in &self.items {
            if let SelectItem::Expr { expr, .. } = item {
                expr.visit_fields(f);
            }
        }
        for block in &self.from {
            if let TableItem::Derived { query, .. } = &block.item {
                query.select.visit_fields(f);
            }
            block.on.iter().for_each(|p| p.visit_fields(f));
        }
        self.predicates.iter().for_each(|p| p.visit_fields(f));
        self.group_by.iter().for_each(|e| e.visit_fields(f));
        self.having.iter().for_each(|p| p.visit_fields(f));
        self.order_by.iter().for_each(|o| o.expr.visit_fields(f));
    }
}

/// A SELECT used as an expression, a predicate operand, or a derived table.
#[derive(Debug, Clone)]
pub struct SubQuery {
    pub select: Select,
    /// Lateral derived tables may reference earlier FROM blocks; only valid in FROM/JOIN.
    pub lateral: bool,
}

/// Standalone `VALUES` statement.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Values {
    pub rows: Vec<Vec<Expr>>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, row: Vec<Expr>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn order_by(mut self, expr: impl Into<Expr>, desc: bool) -> Self {
        self.order_by.push(OrderItem {
            expr: expr.into(),
            desc,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}
