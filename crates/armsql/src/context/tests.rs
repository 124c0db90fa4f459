use super::*;
use crate::dialect::Database;
use crate::meta::{FieldDef, GeneratorKind, HostType, TableMeta};
use crate::row::ValueRow;
use std::sync::Arc;

fn users() -> Arc<TableMeta> {
    TableMeta::single("users")
        .id(HostType::I64, GeneratorKind::Post)
        .field(FieldDef::new("name", HostType::Text))
        .build()
        .unwrap()
}

fn placeholder_count(sql: &str, marker: char) -> usize {
    sql.chars().filter(|c| *c == marker).count()
}

#[test]
fn placeholders_and_params_stay_in_lockstep() {
    let dialect = Database::PostgreSql.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Select);
    ctx.push("SELECT * FROM t WHERE a = ");
    ctx.append_value(MappingType::Integer, false, Value::I32(1)).unwrap();
    ctx.push(" AND b = ");
    ctx.append_value(MappingType::Varchar, false, Value::from("x")).unwrap();
    ctx.push(" AND c = ");
    ctx.append_literal(MappingType::Integer, &Value::I32(3)).unwrap();

    let stmt = ctx.build().unwrap();
    assert_eq!(stmt.sql(), "SELECT * FROM t WHERE a = $1 AND b = $2 AND c = 3");
    assert_eq!(stmt.params().len(), 2);
    assert_eq!(stmt.values().unwrap(), vec![Value::I32(1), Value::from("x")]);
}

#[test]
fn prefer_literal_still_binds_text_and_codec_values() {
    let dialect = Database::MySql.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Select)
        .with_literal_mode(LiteralMode::PreferLiteral);
    ctx.append_value(MappingType::Integer, false, Value::I32(5)).unwrap();
    ctx.push(", ");
    ctx.append_value(MappingType::Varchar, false, Value::from("o'neil")).unwrap();
    ctx.push(", ");
    ctx.append_value(MappingType::Integer, true, Value::I32(6)).unwrap();

    assert_eq!(ctx.sql(), "5, ?, ?");
    assert_eq!(ctx.params().len(), placeholder_count(ctx.sql(), '?'));
}

#[test]
fn text_is_bound_even_as_metadata_literal() {
    let dialect = Database::MySql.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Select);
    ctx.append_literal(MappingType::Varchar, &Value::from("dog")).unwrap();
    assert_eq!(ctx.sql(), "?");
    assert_eq!(ctx.params().len(), 1);
}

#[test]
fn identifiers_follow_quote_mode() {
    let dialect = Database::MySql.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Select);
    ctx.append_identifier("users").unwrap();
    ctx.push(" ");
    ctx.append_identifier("order").unwrap();
    assert_eq!(ctx.sql(), "users `order`");

    let ctx = StatementContext::new(dialect.as_ref(), StmtKind::Select).with_quote_mode(QuoteMode::Always);
    assert_eq!(ctx.safe_object_name("users").unwrap(), "`users`");
    assert_eq!(ctx.safe_object_name("a`b").unwrap(), "`a``b`");
    assert!(ctx.safe_object_name("").is_err());
}

#[test]
fn table_alias_rendering() {
    let pg = Database::PostgreSql.dialect();
    let mut ctx = StatementContext::new(pg.as_ref(), StmtKind::Select);
    ctx.append_table("users", "u").unwrap();
    ctx.push(", ");
    ctx.append_table("users", "users").unwrap();
    assert_eq!(ctx.sql(), "users AS u, users");

    let oracle = Database::Oracle.dialect();
    let mut ctx = StatementContext::new(oracle.as_ref(), StmtKind::Select);
    ctx.append_table("users", "u").unwrap();
    assert_eq!(ctx.sql(), "users u");
}

#[test]
fn named_param_requires_batch() {
    let dialect = Database::H2.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Update);
    ctx.push("UPDATE t SET a = ");
    ctx.append_named(MappingType::Varchar, "name");
    assert!(ctx.has_named_param());
    assert!(matches!(
        ctx.build(),
        Err(CompileError::NamedParamInNonBatch { name, .. }) if name == "name"
    ));
}

#[test]
fn batch_requires_named_param() {
    let dialect = Database::H2.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Delete);
    ctx.push("DELETE FROM t WHERE id = ");
    ctx.append_value(MappingType::BigInt, false, Value::I64(1)).unwrap();
    let row = ValueRow::new();
    assert!(matches!(
        ctx.build_batch(&[&row]),
        Err(CompileError::NoNamedParamInBatch { kind: StmtKind::Delete })
    ));
}

#[test]
fn batch_expands_named_params_per_row() {
    let dialect = Database::Sqlite.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Update).for_table("t");
    ctx.push("UPDATE t SET a = ");
    ctx.append_named(MappingType::Varchar, "name");
    ctx.push(" WHERE id = ");
    ctx.append_named(MappingType::BigInt, "id");

    let a = ValueRow::new().with("id", 1i64).with("name", "a");
    let b = ValueRow::new().with("id", 2i64).with("name", "b");
    let batch = ctx.build_batch(&[&a, &b]).unwrap();
    assert_eq!(batch.sql(), "UPDATE t SET a = ?1 WHERE id = ?2");
    assert_eq!(batch.table(), Some("t"));
    assert_eq!(batch.rows().len(), 2);
    assert_eq!(batch.rows()[1][0].value().unwrap(), Value::from("b"));
    assert_eq!(batch.rows()[1][1].value().unwrap(), Value::I64(2));
}

#[test]
fn delayed_param_is_read_at_execution_time() {
    let table = users();
    let slot = DelayedValue::new(table.id());
    let dialect = Database::MySql.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Insert);
    ctx.push("INSERT INTO child (id) VALUES (");
    ctx.append_delayed(MappingType::BigInt, slot.clone());
    ctx.push(")");
    let stmt = ctx.build().unwrap();

    assert!(matches!(stmt.params()[0].value(), Err(CompileError::NotExecuted { .. })));
    slot.resolve(Value::I64(42)).unwrap();
    assert_eq!(stmt.params()[0].value().unwrap(), Value::I64(42));
}

#[test]
fn scope_resolution() {
    let table = users();
    let name = table.field("name").unwrap();
    let mut scope = Scope::new();
    scope.add_table(&table, "u").unwrap();
    assert!(matches!(
        scope.add_table(&table, "u"),
        Err(CompileError::DuplicateAlias { alias }) if alias == "u"
    ));

    match scope.resolve(&FieldRef::new(name), StmtKind::Select).unwrap() {
        Some(Resolved::Column { alias, column }) => {
            assert_eq!(alias, "u");
            assert_eq!(column, "name");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(scope.resolve(&FieldRef::of("x", name), StmtKind::Select).unwrap().is_none());
}

#[test]
fn self_join_needs_qualifier() {
    let table = users();
    let name = table.field("name").unwrap();
    let mut scope = Scope::new();
    scope.add_table(&table, "a").unwrap();
    scope.add_table(&table, "b").unwrap();

    assert!(matches!(
        scope.resolve(&FieldRef::new(name), StmtKind::Select),
        Err(CompileError::AmbiguousSelfJoin { .. })
    ));
    assert!(matches!(
        scope.resolve(&FieldRef::of("b", name), StmtKind::Select).unwrap(),
        Some(Resolved::Column { alias, .. }) if alias == "b"
    ));
}

#[test]
fn unresolved_field_is_unknown() {
    let table = users();
    let other = TableMeta::single("other")
        .id(HostType::I64, GeneratorKind::Post)
        .build()
        .unwrap();
    let dialect = Database::MySql.dialect();
    let mut ctx = StatementContext::new(dialect.as_ref(), StmtKind::Select);
    let mut scope = Scope::new();
    scope.add_table(&table, "u").unwrap();
    ctx.push_scope(scope);
    assert!(matches!(
        ctx.resolve(&FieldRef::new(other.id())),
        Err(CompileError::UnknownField { table, .. }) if table == "other"
    ));
}
