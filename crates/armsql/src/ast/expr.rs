//! Scalar expressions.

use super::select::SubQuery;
use crate::meta::{FieldMeta, TableMeta};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A column reference, optionally qualified by the alias of a FROM block.
///
/// An unqualified reference is resolved against the tables in scope by owner; when the same
/// table appears twice the reference must be qualified.
#[derive(Debug, Clone)]
pub struct FieldRef {
    pub field: Arc<FieldMeta>,
    pub qualifier: Option<String>,
}

impl FieldRef {
    pub fn new(field: &Arc<FieldMeta>) -> Self {
        Self {
            field: field.clone(),
            qualifier: None,
        }
    }

    /// Reference `field` through the FROM block aliased `alias`.
    pub fn of(alias: impl Into<String>, field: &Arc<FieldMeta>) -> Self {
        Self {
            field: field.clone(),
            qualifier: Some(alias.into()),
        }
    }

    /// Look up `name` in `table` (or its parent) and reference it unqualified.
    ///
    /// Returns `None` when neither table declares the field.
    pub fn named(table: &TableMeta, name: &str) -> Option<Self> {
        table
            .field(name)
            .or_else(|| table.parent().and_then(|p| p.field(name)))
            .map(Self::new)
    }
}

impl From<&Arc<FieldMeta>> for FieldRef {
    fn from(field: &Arc<FieldMeta>) -> Self {
        Self::new(field)
    }
}

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
}

impl BinaryOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A scalar expression.
///
/// Values are typed by the column they meet: in `col = value` or `SET col = value` the value
/// takes the column's SQL type. Elsewhere it takes the default SQL type of its host type.
#[derive(Debug, Clone)]
pub enum Expr {
    Field(FieldRef),
    /// Column of a derived table: `alias.column`.
    Column { alias: String, column: String },
    /// Bound parameter (inlined only under [`LiteralMode::PreferLiteral`](crate::LiteralMode)).
    Value(Value),
    /// Inlined as SQL text when the SQL type allows it, otherwise bound.
    Literal(Value),
    /// Named parameter filled per row of a batch.
    Named(String),
    Null,
    Default,
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Function call; `name` must be a simple identifier.
    Func { name: String, args: Vec<Expr> },
    /// Scalar sub-query.
    Scalar(Box<SubQuery>),
}

impl Expr {
    /// Create a field reference.
    pub fn field(field: &Arc<FieldMeta>) -> Self {
        Expr::Field(FieldRef::new(field))
    }

    /// Create a qualified field reference.
    pub fn field_of(alias: impl Into<String>, field: &Arc<FieldMeta>) -> Self {
        Expr::Field(FieldRef::of(alias, field))
    }

    /// Create a bound value.
    pub fn value(value: impl Into<Value>) -> Self {
        Expr::Value(value.into())
    }

    /// Create a literal.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Create a named batch parameter.
    pub fn named(name: impl Into<String>) -> Self {
        Expr::Named(name.into())
    }

    pub fn column(alias: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::Column {
            alias: alias.into(),
            column: column.into(),
        }
    }

    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Func {
            name: name.into(),
            args,
        }
    }

    pub fn scalar(query: SubQuery) -> Self {
        Expr::Scalar(Box::new(query))
    }

    pub fn binary(self, op: BinaryOp, right: impl Into<Expr>) -> Self {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right.into()),
        }
    }

    pub fn plus(self, right: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Plus, right)
    }

    pub fn minus(self, right: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Minus, right)
    }

    /// Field referenced directly by this expression, if it is a plain column.
    pub fn as_field(&self) -> Option<&FieldRef> {
        match self {
            Expr::Field(f) => Some(f),
            _ => None,
        }
    }

    /// A value, literal, or named parameter: something that does not read a column.
    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Value(_) | Expr::Literal(_) | Expr::Named(_))
    }

    /// Visit every field reference, including those inside sub-queries.
    pub fn visit_fields(&self, f: &mut dyn FnMut(&FieldRef)) {
        match self {
            Expr::Field(r) => f(r),
            Expr::Binary { left, right, .. } => {
                left.visit_fields(f);
                right.visit_fields(f);
            }
            Expr::Func { args, .. } => args.iter().for_each(|a| a.visit_fields(f)),
            Expr::Scalar(q) => q.select.visit_fields(f),
            Expr::Column { .. }
            | Expr::Value(_)
            | Expr::Literal(_)
            | Expr::Named(_)
            | Expr::Null
            | Expr::Default => {}
        }
    }
}

impl From<&Arc<FieldMeta>> for Expr {
    fn from(field: &Arc<FieldMeta>) -> Self {
        Expr::field(field)
    }
}

impl From<FieldRef> for Expr {
    fn from(field: FieldRef) -> Self {
        Expr::Field(field)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

macro_rules! expr_from_value {
    ($($ty:ty),+ $(,)?) => {
        $(impl From<$ty> for Expr {
            fn from(v: $ty) -> Self {
                Expr::Value(Value::from(v))
            }
        })+
    };
}

expr_from_value!(bool, i16, i32, i64, f64, &str, String);
