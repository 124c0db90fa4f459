//! Boolean predicates for WHERE, ON, and HAVING.

use super::expr::{Expr, FieldRef};
use super::select::SubQuery;
use crate::meta::TableMeta;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
        }
    }
}

/// A predicate tree.
///
/// A list of predicates on a statement is joined with `AND`; nested `Or` and `And` groups are
/// parenthesized when rendered.
///
/// # Example
/// ```ignore
/// Predicate::eq(user.id(), Expr::value(1i64))
///     .and(Predicate::eq(&name, Expr::named("name")).or(Predicate::is_null(&name)))
/// ```
#[derive(Debug, Clone)]
pub enum Predicate {
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    IsNull {
        expr: Expr,
        negated: bool,
    },
    /// `expr IN (..)`; an empty list never matches.
    In {
        expr: Expr,
        list: Vec<Expr>,
        negated: bool,
    },
    InQuery {
        expr: Expr,
        query: Box<SubQuery>,
        negated: bool,
    },
    Between {
        expr: Expr,
        low: Expr,
        high: Expr,
        negated: bool,
    },
    Exists {
        query: Box<SubQuery>,
        negated: bool,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(left: impl Into<Expr>, op: CompareOp, right: impl Into<Expr>) -> Self {
        Predicate::Compare {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    /// Create an equality predicate.
    pub fn eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(left, CompareOp::Eq, right)
    }

    /// Create a not-equal predicate.
    pub fn ne(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(left, CompareOp::Ne, right)
    }

    pub fn lt(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(left, CompareOp::Lt, right)
    }

    pub fn gt(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(left, CompareOp::Gt, right)
    }

    pub fn like(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(left, CompareOp::Like, right)
    }

    pub fn is_null(expr: impl Into<Expr>) -> Self {
        Predicate::IsNull {
            expr: expr.into(),
            negated: false,
        }
    }

    pub fn is_not_null(expr: impl Into<Expr>) -> Self {
        Predicate::IsNull {
            expr: expr.into(),
            negated: true,
        }
    }

    pub fn in_list(expr: impl Into<Expr>, list: Vec<Expr>) -> Self {
        Predicate::In {
            expr: expr.into(),
            list,
            negated: false,
        }
    }

    pub fn in_query(expr: impl Into<Expr>, query: SubQuery) -> Self {
        Predicate::InQuery {
            expr: expr.into(),
            query: Box::new(query),
            negated: false,
        }
    }

    pub fn between(expr: impl Into<Expr>, low: impl Into<Expr>, high: impl Into<Expr>) -> Self {
        Predicate::Between {
            expr: expr.into(),
            low: low.into(),
            high: high.into(),
            negated: false,
        }
    }

    pub fn exists(query: SubQuery) -> Self {
        Predicate::Exists {
            query: Box::new(query),
            negated: false,
        }
    }

    pub fn not_exists(query: SubQuery) -> Self {
        Predicate::Exists {
            query: Box::new(query),
            negated: true,
        }
    }

    /// Combine with `AND`, flattening nested groups.
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut list) => {
                list.push(other);
                Predicate::And(list)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    /// Combine with `OR`, flattening nested groups.
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut list) => {
                list.push(other);
                Predicate::Or(list)
            }
            first => Predicate::Or(vec![first, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Visit every field reference, including those inside sub-queries.
    pub fn visit_fields(&self, f: &mut dyn FnMut(&FieldRef)) {
        match self {
            Predicate::Compare { left, right, .. } => {
                left.visit_fields(f);
                right.visit_fields(f);
            }
            Predicate::IsNull { expr, .. } => expr.visit_fields(f),
            Predicate::In { expr, list, .. } => {
                expr.visit_fields(f);
                list.iter().for_each(|e| e.visit_fields(f));
            }
            Predicate::InQuery { expr, query, .. } => {
                expr.visit_fields(f);
                query.select.visit_fields(f);
            }
            Predicate::Between {
                expr, low, high, ..
            } => {
                expr.visit_fields(f);
                low.visit_fields(f);
                high.visit_fields(f);
            }
            Predicate::Exists { query, .. } => query.select.visit_fields(f),
            Predicate::And(list) | Predicate::Or(list) => {
                list.iter().for_each(|p| p.visit_fields(f))
            }
            Predicate::Not(p) => p.visit_fields(f),
        }
    }

    /// Whether this is a primary-key predicate of `table`.
    ///
    /// Accepted shapes are `id = constant` and `constant = id`, where `id` is the primary key of
    /// `table` or of its parent (both halves share key values). A split statement keys its child
    /// half on this predicate alone, so it must address at most one row; `id IN (..)` does not
    /// qualify.
    pub fn is_primary(&self, table: &TableMeta) -> bool {
        let is_key = |e: &Expr| {
            e.as_field().is_some_and(|r| {
                r.field.is_id()
                    && (table.owns(&r.field) || table.parent().is_some_and(|p| p.owns(&r.field)))
            })
        };
        match self {
            Predicate::Compare {
                left,
                op: CompareOp::Eq,
                right,
            } => (is_key(left) && right.is_constant()) || (is_key(right) && left.is_constant()),
            _ => false,
        }
    }

    /// Whether any field of `table` is referenced.
    pub fn references(&self, table: &TableMeta) -> bool {
        let mut found = false;
        self.visit_fields(&mut |r| found |= table.owns(&r.field));
        found
    }
}
