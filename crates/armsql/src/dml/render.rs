//! Expression and predicate rendering.

use crate::ast::{Expr, FieldRef, Predicate, SubQuery};
use crate::context::{Correlation, Resolved, StatementContext};
use crate::error::{CompileError, CompileResult};
use crate::ident;
use crate::meta::{FieldMeta, MappingType};
use crate::value::Value;

/// SQL type and codec flag of a value that meets `hint`.
fn typing(hint: Option<&FieldMeta>, value: &Value) -> (MappingType, bool) {
    match hint {
        Some(field) => (field.mapping(), field.codec()),
        None => (
            value
                .host_type()
                .map_or(MappingType::Varchar, |h| h.default_mapping()),
            false,
        ),
    }
}

impl StatementContext<'_> {
    /// `alias.column`
    pub(crate) fn append_qualified(&mut self, alias: &str, column: &str) -> CompileResult<()> {
        self.append_identifier(alias)?;
        self.push(".");
        self.append_identifier(column)
    }

    pub(crate) fn append_field(&mut self, r: &FieldRef) -> CompileResult<()> {
        match self.resolve(r)? {
            Resolved::Column { alias, column } => self.append_qualified(&alias, &column),
            Resolved::Correlated(c) => self.append_correlated(&c, &r.field),
        }
    }

    /// Target of a SET item: qualified only where the dialect accepts it.
    pub(crate) fn append_set_target(&mut self, r: &FieldRef) -> CompileResult<()> {
        match self.resolve(r)? {
            Resolved::Column { alias, column } => {
                if self.dialect().set_clause_table_alias() {
                    self.append_qualified(&alias, &column)
                } else {
                    self.append_identifier(&column)
                }
            }
            Resolved::Correlated(_) => Err(CompileError::unknown_field(
                self.kind(),
                r.field.table_name(),
                r.field.name(),
            )),
        }
    }

    /// `(SELECT o.col FROM other AS o WHERE o.id = a.id [AND o.disc = code])`
    fn append_correlated(&mut self, c: &Correlation, field: &FieldMeta) -> CompileResult<()> {
        self.push("(SELECT ");
        self.append_qualified(&c.other_alias, field.column())?;
        self.push(" FROM ");
        self.append_table(c.other.name(), &c.other_alias)?;
        self.push(" WHERE ");
        self.append_qualified(&c.other_alias, c.other.id().column())?;
        self.push(" = ");
        self.append_qualified(&c.owner_alias, c.owner_id.column())?;
        if let Some((disc, code)) = &c.discriminator {
            self.push(" AND ");
            self.append_qualified(&c.other_alias, disc.column())?;
            self.push(" = ");
            self.append_literal(disc.mapping(), code)?;
        }
        self.push(")");
        Ok(())
    }

    /// Render `expr`; values take the SQL type of `hint` when given.
    pub(crate) fn append_expr(&mut self, expr: &Expr, hint: Option<&FieldMeta>) -> CompileResult<()> {
        match expr {
            Expr::Field(r) => self.append_field(r),
            Expr::Column { alias, column } => {
                if !self.has_derived(alias) {
                    return Err(CompileError::unknown_field(self.kind(), alias.as_str(), column.as_str()));
                }
                self.append_qualified(alias, column)
            }
            Expr::Value(v) => {
                let (mapping, codec) = typing(hint, v);
                self.append_value(mapping, codec, v.clone())
            }
            Expr::Literal(v) => {
                let (mapping, codec) = typing(hint, v);
                if codec {
                    self.append_value(mapping, true, v.clone())
                } else {
                    self.append_literal(mapping, v)
                }
            }
            Expr::Named(name) => {
                let mapping = hint.map_or(MappingType::Varchar, |f| f.mapping());
                self.append_named(mapping, name.as_str());
                Ok(())
            }
            Expr::Null => {
                self.push("NULL");
                Ok(())
            }
            Expr::Default => {
                self.push("DEFAULT");
                Ok(())
            }
            Expr::Binary { left, op, right } => {
                let hint = hint
                    .or_else(|| left.as_field().map(|r| r.field.as_ref()))
                    .or_else(|| right.as_field().map(|r| r.field.as_ref()));
                self.append_operand(left, hint)?;
                self.push(" ");
                self.push(op.as_sql());
                self.push(" ");
                self.append_operand(right, hint)
            }
            Expr::Func { name, args } => {
                if !ident::is_simple(name) {
                    return Err(CompileError::InvalidIdent(format!("function name {name:?}")));
                }
                self.push(name);
                self.push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.append_expr(arg, None)?;
                }
                self.push(")");
                Ok(())
            }
            Expr::Scalar(q) => self.append_subquery(q),
        }
    }

    fn append_operand(&mut self, expr: &Expr, hint: Option<&FieldMeta>) -> CompileResult<()> {
        if matches!(expr, Expr::Binary { .. }) {
            self.push("(");
            self.append_expr(expr, hint)?;
            self.push(")");
            Ok(())
        } else {
            self.append_expr(expr, hint)
        }
    }

    /// `(SELECT ..)` in an expression position.
    pub(crate) fn append_subquery(&mut self, q: &SubQuery) -> CompileResult<()> {
        if q.lateral {
            return Err(CompileError::LateralOutsideFrom);
        }
        self.push("(");
        self.append_select(&q.select)?;
        self.push(")");
        Ok(())
    }

    pub(crate) fn append_predicate(&mut self, p: &Predicate) -> CompileResult<()> {
        match p {
            Predicate::Compare { left, op, right } => {
                let hint = left.as_field().or_else(|| right.as_field()).map(|r| r.field.clone());
                self.append_expr(left, hint.as_deref())?;
                self.push(" ");
                self.push(op.as_sql());
                self.push(" ");
                self.append_expr(right, hint.as_deref())
            }
            Predicate::IsNull { expr, negated } => {
                self.append_expr(expr, None)?;
                self.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
                Ok(())
            }
            Predicate::In { expr, list, negated } => {
                if list.is_empty() {
                    self.push(if *negated { "1 = 1" } else { "1 = 0" });
                    return Ok(());
                }
                let hint = expr.as_field().map(|r| r.field.clone());
                self.append_expr(expr, None)?;
                self.push(if *negated { " NOT IN (" } else { " IN (" });
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.append_expr(item, hint.as_deref())?;
                }
                self.push(")");
                Ok(())
            }
            Predicate::InQuery {
                expr,
                query,
                negated,
            } => {
                self.append_expr(expr, None)?;
                self.push(if *negated { " NOT IN " } else { " IN " });
                self.append_subquery(query)
            }
            Predicate::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let hint = expr.as_field().map(|r| r.field.clone());
                self.append_expr(expr, None)?;
                self.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.append_expr(low, hint.as_deref())?;
                self.push(" AND ");
                self.append_expr(high, hint.as_deref())
            }
            Predicate::Exists { query, negated } => {
                self.push(if *negated { "NOT EXISTS " } else { "EXISTS " });
                self.append_subquery(query)
            }
            Predicate::And(list) => self.append_group(list, " AND "),
            Predicate::Or(list) => self.append_group(list, " OR "),
            Predicate::Not(inner) => {
                self.push("NOT (");
                self.append_predicate(inner)?;
                self.push(")");
                Ok(())
            }
        }
    }

    fn append_group(&mut self, list: &[Predicate], sep: &str) -> CompileResult<()> {
        if list.is_empty() {
            self.push(if sep == " AND " { "1 = 1" } else { "1 = 0" });
            return Ok(());
        }
        self.push("(");
        for (i, p) in list.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            self.append_predicate(p)?;
        }
        self.push(")");
        Ok(())
    }

    /// Predicates joined with `AND`, without surrounding parentheses.
    pub(crate) fn append_conjunction(&mut self, list: &[Predicate]) -> CompileResult<()> {
        for (i, p) in list.iter().enumerate() {
            if i > 0 {
                self.push(" AND ");
            }
            self.append_predicate(p)?;
        }
        Ok(())
    }
}
