//! Statement syntax trees handed to the [`Compiler`](crate::Compiler).
//!
//! Trees reference tables and fields through shared metadata ([`TableMeta`](crate::TableMeta),
//! [`FieldMeta`](crate::FieldMeta)), so a field can only be written where a table that owns
//! it is in scope. The trees are plain data: compile them as often as needed.

mod dml;
mod expr;
mod predicate;
mod select;

pub use dml::{Assignment, Conflict, Delete, Insert, InsertSource, RowValues, Update};
pub use expr::{BinaryOp, Expr, FieldRef};
pub use predicate::{CompareOp, Predicate};
pub use select::{
    JoinType, Lock, LockMode, LockWait, OrderItem, Select, SelectItem, SubQuery, TableBlock,
    TableItem, Values,
};

use serde::Deserialize;

/// Row visibility filter for tables with a `visible` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Visible {
    /// `visible = TRUE`
    #[default]
    OnlyVisible,
    /// `visible = FALSE`
    OnlyNonVisible,
    /// No filter.
    Both,
}

impl Visible {
    /// Value the visible column is compared with, `None` for no filter.
    pub fn value(self) -> Option<bool> {
        match self {
            Visible::OnlyVisible => Some(true),
            Visible::OnlyNonVisible => Some(false),
            Visible::Both => None,
        }
    }
}
