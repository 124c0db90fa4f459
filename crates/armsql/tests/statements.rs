//! Single-table statements across dialects: injected filters, joins, sub-queries, conflict
//! clauses, and batches.

use armsql::{
    Assignment, Compiler, CompilerConfig, CompileError, Conflict, Database, Delete, Expr,
    FieldDef, FieldMeta, GeneratorKind, HostType, Insert, JoinType, LiteralMode, Lock, Predicate,
    QuoteMode, RowAccessor, Select, SimpleStmt, Stmt, TableBlock, TableMeta, Update, Value,
    ValueRow, Values, Visible,
};
use std::sync::Arc;

struct Schema {
    users: Arc<TableMeta>,
    orders: Arc<TableMeta>,
    accounts: Arc<TableMeta>,
}

impl Schema {
    fn new() -> Self {
        let users = TableMeta::single("users")
            .id(HostType::I64, GeneratorKind::Post)
            .version(HostType::I32)
            .visible()
            .field(FieldDef::new("name", HostType::Text))
            .field(FieldDef::new("nick", HostType::Text).nullable().only_if_null())
            .build()
            .unwrap();
        let orders = TableMeta::single("orders")
            .id(HostType::I64, GeneratorKind::Post)
            .field(FieldDef::new("owner_id", HostType::I64))
            .field(FieldDef::new("amount", HostType::I64))
            .build()
            .unwrap();
        let accounts = TableMeta::single("accounts")
            .id(HostType::I64, GeneratorKind::None)
            .version(HostType::I32)
            .field(FieldDef::new("name", HostType::Text))
            .build()
            .unwrap();
        Self {
            users,
            orders,
            accounts,
        }
    }

    fn user(&self, name: &str) -> &Arc<FieldMeta> {
        self.users.field(name).unwrap()
    }

    fn order(&self, name: &str) -> &Arc<FieldMeta> {
        self.orders.field(name).unwrap()
    }

    fn account(&self, name: &str) -> &Arc<FieldMeta> {
        self.accounts.field(name).unwrap()
    }

    fn rename(&self, alias: &str) -> Update {
        Update::table(&self.users, alias)
            .set(Assignment::set(self.user("name"), "alice"))
            .filter(Predicate::eq(Expr::field(self.users.id()), 1_i64))
    }
}

fn compiler(db: Database) -> Compiler {
    Compiler::new(CompilerConfig::new(db)).unwrap()
}

fn simple(stmt: &Stmt) -> &SimpleStmt {
    stmt.as_simple().expect("simple statement")
}

fn sql(stmt: Compiled) -> String {
    simple(&stmt.unwrap()).sql().to_string()
}

type Compiled = armsql::CompileResult<Stmt>;

#[test]
fn update_per_dialect() {
    let s = Schema::new();
    let stmt = s.rename("u");
    assert_eq!(
        sql(compiler(Database::PostgreSql).update(&stmt, Visible::OnlyVisible)),
        "UPDATE users AS u SET name = $1, version = u.version + 1 WHERE u.id = $2 AND u.visible = TRUE"
    );
    assert_eq!(
        sql(compiler(Database::MySql).update(&stmt, Visible::OnlyVisible)),
        "UPDATE users AS u SET u.name = ?, u.version = u.version + 1 WHERE u.id = ? AND u.visible = TRUE"
    );
    assert_eq!(
        sql(compiler(Database::Oracle).update(&stmt, Visible::OnlyVisible)),
        "UPDATE users u SET name = :1, version = u.version + 1 WHERE u.id = :2 AND u.visible = 1"
    );
    assert_eq!(
        sql(compiler(Database::Sqlite).update(&stmt, Visible::OnlyNonVisible)),
        "UPDATE users AS u SET name = ?1, version = u.version + 1 WHERE u.id = ?2 AND u.visible = 0"
    );
    assert_eq!(
        sql(compiler(Database::H2).update(&stmt, Visible::Both)),
        "UPDATE users AS u SET u.name = ?, u.version = u.version + 1 WHERE u.id = ?"
    );
}

#[test]
fn version_bump_is_written_once() {
    let s = Schema::new();
    let stmt = s
        .rename("u")
        .set(Assignment::set(s.user("nick"), "al"));
    let text = sql(compiler(Database::PostgreSql).update(&stmt, Visible::Both));
    assert_eq!(text.matches("version = u.version + 1").count(), 1);
}

#[test]
fn only_if_null_target_adds_guard() {
    let s = Schema::new();
    let stmt = Update::table(&s.users, "u")
        .set(Assignment::set(s.user("nick"), "al"))
        .filter(Predicate::eq(Expr::field(s.users.id()), 1_i64));
    assert_eq!(
        sql(compiler(Database::MySql).update(&stmt, Visible::OnlyVisible)),
        "UPDATE users AS u SET u.nick = ?, u.version = u.version + 1 WHERE u.id = ? AND u.nick IS NULL AND u.visible = TRUE"
    );
}

#[test]
fn only_if_default_guard_is_dialect_gated() {
    let profiles = TableMeta::single("profiles")
        .id(HostType::I64, GeneratorKind::Post)
        .field(FieldDef::new("theme", HostType::Text).only_if_default())
        .build()
        .unwrap();
    let stmt = Update::table(&profiles, "p")
        .set(Assignment::set(profiles.field("theme").unwrap(), "dark"))
        .filter(Predicate::eq(Expr::field(profiles.id()), 3_i64));
    assert_eq!(
        sql(compiler(Database::MySql).update(&stmt, Visible::Both)),
        "UPDATE profiles AS p SET p.theme = ? WHERE p.id = ? AND p.theme = DEFAULT(p.theme)"
    );
    assert!(
        compiler(Database::PostgreSql)
            .update(&stmt, Visible::Both)
            .unwrap_err()
            .is_unsupported()
    );
}

#[test]
fn update_requires_where_and_set() {
    let s = Schema::new();
    let compiler = compiler(Database::PostgreSql);

    let no_where = Update::table(&s.users, "u").set(Assignment::set(s.user("name"), "x"));
    assert!(matches!(
        compiler.update(&no_where, Visible::Both),
        Err(CompileError::EmptyWhere { .. })
    ));

    let no_set = Update::table(&s.users, "u").filter(Predicate::eq(Expr::field(s.users.id()), 1_i64));
    assert!(matches!(
        compiler.update(&no_set, Visible::Both),
        Err(CompileError::EmptySet { .. })
    ));

    let foreign = Update::table(&s.users, "u")
        .set(Assignment::set(s.order("amount"), 3_i64))
        .filter(Predicate::eq(Expr::field(s.users.id()), 1_i64));
    assert!(matches!(
        compiler.update(&foreign, Visible::Both),
        Err(CompileError::UnknownField { .. })
    ));
}

#[test]
fn row_assignment_arity_is_checked() {
    let s = Schema::new();
    let stmt = Update::table(&s.users, "u")
        .set(Assignment::row(
            vec![s.user("name").into(), s.user("nick").into()],
            armsql::RowValues::List(vec![Expr::value("a")]),
        ))
        .filter(Predicate::eq(Expr::field(s.users.id()), 1_i64));
    assert!(matches!(
        compiler(Database::PostgreSql).update(&stmt, Visible::Both),
        Err(CompileError::SetArity { targets: 2, values: 1, .. })
    ));
}

#[test]
fn row_assignment_from_query_needs_dialect_support() {
    let s = Schema::new();
    let source = Select::from(&s.accounts, "a")
        .item(Expr::field(s.account("name")), None)
        .filter(Predicate::eq(Expr::field(s.accounts.id()), Expr::field_of("u", s.users.id())));
    let stmt = Update::table(&s.users, "u")
        .set(Assignment::row(
            vec![s.user("name").into()],
            armsql::RowValues::Query(Box::new(source.sub())),
        ))
        .filter(Predicate::eq(Expr::field(s.users.id()), 1_i64));

    assert_eq!(
        sql(compiler(Database::PostgreSql).update(&stmt, Visible::Both)),
        "UPDATE users AS u SET (name) = (SELECT a.name FROM accounts AS a WHERE a.id = u.id), \
         version = u.version + 1 WHERE u.id = $1"
    );
    assert!(
        compiler(Database::MySql)
            .update(&stmt, Visible::Both)
            .unwrap_err()
            .is_unsupported()
    );
}

#[test]
fn multi_table_update_styles() {
    let s = Schema::new();
    let stmt = Update::table(&s.users, "u")
        .join(TableBlock::table(&s.orders, "o"))
        .set(Assignment::set(s.user("name"), "big"))
        .filter(Predicate::eq(Expr::field(s.order("owner_id")), Expr::field(s.users.id())))
        .filter(Predicate::gt(Expr::field(s.order("amount")), 100_i64));

    assert_eq!(
        sql(compiler(Database::PostgreSql).update(&stmt, Visible::Both)),
        "UPDATE users AS u SET name = $1, version = u.version + 1 FROM orders AS o \
         WHERE o.owner_id = u.id AND o.amount > $2"
    );
    assert_eq!(
        sql(compiler(Database::MySql).update(&stmt, Visible::Both)),
        "UPDATE users AS u JOIN orders AS o SET u.name = ?, u.version = u.version + 1 \
         WHERE o.owner_id = u.id AND o.amount > ?"
    );
    assert!(
        compiler(Database::Oracle)
            .update(&stmt, Visible::Both)
            .unwrap_err()
            .is_unsupported()
    );
}

#[test]
fn delete_forms() {
    let s = Schema::new();
    let plain = Delete::from(&s.users, "u").filter(Predicate::eq(Expr::field(s.users.id()), 1_i64));
    assert_eq!(
        sql(compiler(Database::PostgreSql).delete(&plain, Visible::OnlyVisible)),
        "DELETE FROM users AS u WHERE u.id = $1 AND u.visible = TRUE"
    );

    let joined = Delete::from(&s.users, "u")
        .join(TableBlock::table(&s.orders, "o"))
        .filter(Predicate::eq(Expr::field(s.order("owner_id")), Expr::field(s.users.id())));
    assert_eq!(
        sql(compiler(Database::PostgreSql).delete(&joined, Visible::Both)),
        "DELETE FROM users AS u USING orders AS o WHERE o.owner_id = u.id"
    );
    assert_eq!(
        sql(compiler(Database::MySql).delete(&joined, Visible::Both)),
        "DELETE u FROM users AS u JOIN orders AS o WHERE o.owner_id = u.id"
    );
    assert!(
        compiler(Database::Sqlite)
            .delete(&joined, Visible::Both)
            .unwrap_err()
            .is_unsupported()
    );

    let unfiltered = Delete::from(&s.users, "u");
    assert!(matches!(
        compiler(Database::H2).delete(&unfiltered, Visible::Both),
        Err(CompileError::EmptyWhere { .. })
    ));
}

#[test]
fn select_with_correlated_scalar_subquery() {
    let s = Schema::new();
    let count = Select::from(&s.orders, "o")
        .item(Expr::func("count", vec![Expr::literal(1)]), None)
        .filter(Predicate::eq(
            Expr::field(s.order("owner_id")),
            Expr::field_of("u", s.users.id()),
        ));
    let stmt = Select::from(&s.users, "u")
        .item(Expr::field(s.user("name")), None)
        .item(Expr::scalar(count.sub()), Some("total"))
        .order_by(Expr::field(s.user("name")), false)
        .limit(10)
        .offset(20);

    let compiled = compiler(Database::PostgreSql)
        .select(&stmt, Visible::OnlyVisible)
        .unwrap();
    assert_eq!(
        simple(&compiled).sql(),
        "SELECT u.name, (SELECT count(1) FROM orders AS o WHERE o.owner_id = u.id) AS total \
         FROM users AS u WHERE u.visible = TRUE ORDER BY u.name LIMIT 10 OFFSET 20"
    );
    assert!(simple(&compiled).params().is_empty());
    assert_eq!(simple(&compiled).table(), None);
}

#[test]
fn select_lock_on_oracle() {
    let s = Schema::new();
    let stmt = Select::from(&s.users, "u")
        .item(Expr::field(s.user("name")), None)
        .filter(Predicate::eq(Expr::field(s.users.id()), 1_i64))
        .lock(Lock::update().nowait());
    assert_eq!(
        sql(compiler(Database::Oracle).select(&stmt, Visible::Both)),
        "SELECT u.name FROM users u WHERE u.id = :1 FOR UPDATE NOWAIT"
    );
    assert!(
        compiler(Database::Sqlite)
            .select(&stmt, Visible::Both)
            .unwrap_err()
            .is_unsupported()
    );
}

#[test]
fn self_join_requires_qualified_fields() {
    let s = Schema::new();
    let on = vec![Predicate::eq(
        Expr::field_of("a", s.users.id()),
        Expr::field_of("b", s.users.id()),
    )];
    let ambiguous = Select::from(&s.users, "a")
        .join(TableBlock::join(JoinType::Left, &s.users, "b", on.clone()))
        .item(Expr::field(s.user("name")), None);
    assert!(matches!(
        compiler(Database::PostgreSql).select(&ambiguous, Visible::Both),
        Err(CompileError::AmbiguousSelfJoin { .. })
    ));

    let qualified = Select::from(&s.users, "a")
        .join(TableBlock::join(JoinType::Left, &s.users, "b", on))
        .item(Expr::field_of("b", s.user("name")), None);
    assert_eq!(
        sql(compiler(Database::PostgreSql).select(&qualified, Visible::Both)),
        "SELECT b.name FROM users AS a LEFT JOIN users AS b ON a.id = b.id"
    );
}

#[test]
fn lateral_derived_tables() {
    let s = Schema::new();
    let recent = Select::from(&s.orders, "o")
        .item(Expr::field(s.order("amount")), None)
        .filter(Predicate::eq(
            Expr::field(s.order("owner_id")),
            Expr::field_of("u", s.users.id()),
        ))
        .limit(1);
    let stmt = Select::from(&s.users, "u").join(TableBlock::derived(
        JoinType::Cross,
        recent.clone().lateral(),
        "recent",
        Vec::new(),
    ));
    assert_eq!(
        sql(compiler(Database::PostgreSql).select(&stmt, Visible::Both)),
        "SELECT * FROM users AS u CROSS JOIN LATERAL (SELECT o.amount FROM orders AS o \
         WHERE o.owner_id = u.id LIMIT 1) AS recent"
    );
    assert!(
        compiler(Database::H2)
            .select(&stmt, Visible::Both)
            .unwrap_err()
            .is_unsupported()
    );

    let misplaced = Select::from(&s.users, "u").item(Expr::scalar(recent.lateral()), None);
    assert!(matches!(
        compiler(Database::PostgreSql).select(&misplaced, Visible::Both),
        Err(CompileError::LateralOutsideFrom)
    ));
}

#[test]
fn standalone_values() {
    let values = Values::new()
        .row(vec![Expr::value(1), Expr::value("a")])
        .row(vec![Expr::value(2), Expr::value("b")]);
    assert_eq!(
        sql(compiler(Database::PostgreSql).values(&values)),
        "VALUES ($1, $2), ($3, $4)"
    );
    assert_eq!(
        sql(compiler(Database::MySql).values(&values)),
        "VALUES ROW(?, ?), ROW(?, ?)"
    );
    assert!(compiler(Database::Oracle).values(&values).unwrap_err().is_unsupported());

    let ragged = Values::new()
        .row(vec![Expr::value(1)])
        .row(vec![Expr::value(2), Expr::value(3)]);
    assert!(matches!(
        compiler(Database::H2).values(&ragged),
        Err(CompileError::SetArity { .. })
    ));
}

#[test]
fn prefer_literal_inlines_numbers_only() {
    let s = Schema::new();
    let config = CompilerConfig::new(Database::MySql).with_literal_mode(LiteralMode::PreferLiteral);
    let compiled = Compiler::new(config)
        .unwrap()
        .update(&s.rename("u"), Visible::OnlyVisible)
        .unwrap();
    let stmt = simple(&compiled);
    assert_eq!(
        stmt.sql(),
        "UPDATE users AS u SET u.name = ?, u.version = u.version + 1 WHERE u.id = 1 AND u.visible = TRUE"
    );
    assert_eq!(stmt.values().unwrap(), vec![Value::from("alice")]);
}

#[test]
fn always_quote_identifiers() {
    let s = Schema::new();
    let config = CompilerConfig::new(Database::PostgreSql).with_identifier_quoting(QuoteMode::Always);
    let stmt = Select::from(&s.users, "u").item(Expr::field(s.user("name")), None);
    assert_eq!(
        sql(Compiler::new(config).unwrap().select(&stmt, Visible::Both)),
        r#"SELECT "u"."name" FROM "users" AS "u""#
    );
}

#[test]
fn insert_values_returns_generated_ids() {
    let s = Schema::new();
    let mut stmt = Insert::values(
        &s.users,
        vec![s.user("name").clone()],
        vec![vec![Expr::value("a")], vec![Expr::value("b")]],
    );
    let compiled = compiler(Database::PostgreSql).insert(&mut stmt).unwrap();
    let insert = simple(&compiled);
    assert_eq!(
        insert.sql(),
        "INSERT INTO users (name, version, visible) VALUES ($1, $2, $3), ($4, $5, $6) RETURNING id"
    );
    assert_eq!(insert.id_slots().len(), 2);
    insert.resolve_ids([Value::I64(7), Value::I64(8)]).unwrap();
    assert_eq!(insert.id_slots()[1].get().unwrap(), Value::I64(8));

    let mut quiet = Insert::values(&s.users, vec![s.user("name").clone()], vec![vec![Expr::value("a")]])
        .ignore_return_ids();
    assert_eq!(
        sql(compiler(Database::PostgreSql).insert(&mut quiet)),
        "INSERT INTO users (name, version, visible) VALUES ($1, $2, $3)"
    );
}

#[test]
fn insert_rejects_managed_columns_and_bad_arity() {
    let s = Schema::new();
    let compiler = compiler(Database::MySql);

    let mut managed = Insert::values(
        &s.users,
        vec![s.users.version().unwrap().clone()],
        vec![vec![Expr::value(3)]],
    );
    assert!(matches!(
        compiler.insert(&mut managed),
        Err(CompileError::ManagedField { .. })
    ));

    let mut ragged = Insert::values(
        &s.users,
        vec![s.user("name").clone()],
        vec![vec![Expr::value("a"), Expr::value("b")]],
    );
    assert!(matches!(
        compiler.insert(&mut ragged),
        Err(CompileError::SetArity { .. })
    ));

    let mut empty = Insert::values(&s.users, vec![s.user("name").clone()], Vec::new());
    assert!(matches!(
        compiler.insert(&mut empty),
        Err(CompileError::EmptyInsert { .. })
    ));
}

fn account_row(s: &Schema, conflict: Conflict) -> Insert<'static> {
    Insert::assignment(
        &s.accounts,
        vec![
            (s.accounts.id().clone(), Expr::value(7_i64)),
            (s.account("name").clone(), Expr::value("a")),
        ],
    )
    .on_conflict(conflict)
}

#[test]
fn conflict_clauses() {
    let s = Schema::new();
    let upsert = || {
        Conflict::Update(vec![Assignment::set(
            s.account("name"),
            Expr::column("excluded", "name"),
        )])
    };
    assert_eq!(
        sql(compiler(Database::PostgreSql).insert(&mut account_row(&s, upsert()))),
        "INSERT INTO accounts (id, name, version) VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO UPDATE SET name = excluded.name, version = accounts.version + 1"
    );
    assert_eq!(
        sql(compiler(Database::PostgreSql).insert(&mut account_row(&s, Conflict::DoNothing))),
        "INSERT INTO accounts (id, name, version) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING"
    );

    let overwrite = Conflict::Update(vec![Assignment::set(s.account("name"), "b")]);
    assert_eq!(
        sql(compiler(Database::MySql).insert(&mut account_row(&s, overwrite))),
        "INSERT INTO accounts (id, name, version) VALUES (?, ?, ?) \
         ON DUPLICATE KEY UPDATE accounts.name = ?, accounts.version = accounts.version + 1"
    );
    assert_eq!(
        sql(compiler(Database::MySql).insert(&mut account_row(&s, Conflict::DoNothing))),
        "INSERT IGNORE INTO accounts (id, name, version) VALUES (?, ?, ?)"
    );
    assert!(
        compiler(Database::Oracle)
            .insert(&mut account_row(&s, Conflict::DoNothing))
            .unwrap_err()
            .is_unsupported()
    );
}

#[test]
fn insert_from_query() {
    let s = Schema::new();
    let source = Select::from(&s.users, "u")
        .item(Expr::field(s.users.id()), None)
        .item(Expr::field(s.user("name")), None)
        .item(Expr::literal(0), None);
    let fields = vec![
        s.accounts.id().clone(),
        s.account("name").clone(),
        s.accounts.version().unwrap().clone(),
    ];
    let mut stmt = Insert::query(&s.accounts, fields, source);
    assert_eq!(
        sql(compiler(Database::PostgreSql).insert(&mut stmt)),
        "INSERT INTO accounts (id, name, version) SELECT u.id, u.name, 0 FROM users AS u"
    );

    let narrow = Select::from(&s.users, "u")
        .item(Expr::field(s.users.id()), None)
        .item(Expr::field(s.user("name")), None);
    let mut missing_version = Insert::query(
        &s.accounts,
        vec![s.accounts.id().clone(), s.account("name").clone()],
        narrow.clone(),
    );
    assert!(matches!(
        compiler(Database::PostgreSql).insert(&mut missing_version),
        Err(CompileError::NullRequired { field, .. }) if field == "version"
    ));

    let mut too_wide = Insert::query(&s.accounts, vec![s.accounts.id().clone()], narrow);
    assert!(matches!(
        compiler(Database::PostgreSql).insert(&mut too_wide),
        Err(CompileError::SetArity { .. })
    ));
}

#[test]
fn domain_insert_generates_precede_ids() {
    let article = TableMeta::single("article")
        .id(HostType::Text, GeneratorKind::Precede("uuid".into()))
        .field(FieldDef::new("title", HostType::Text))
        .build()
        .unwrap();
    let mut row = ValueRow::new().with("title", "hello");
    let compiled = {
        let mut stmt = Insert::domain(&article, vec![&mut row as &mut dyn RowAccessor]);
        compiler(Database::Sqlite).insert(&mut stmt).unwrap()
    };
    let insert = simple(&compiled);
    assert_eq!(insert.sql(), "INSERT INTO article (id, title) VALUES (?1, ?2)");
    assert!(insert.id_slots().is_empty());

    let Some(Value::Text(id)) = row.value("id") else {
        panic!("id was not generated");
    };
    assert_eq!(insert.values().unwrap()[0], Value::Text(id.clone()));
}

#[test]
fn migration_rows_must_be_complete() {
    let s = Schema::new();
    let mut row = ValueRow::new().with("id", 1_i64).with("name", "a").with("visible", true);
    let mut stmt = Insert::domain(&s.users, vec![&mut row as &mut dyn RowAccessor]).migration();
    assert!(matches!(
        compiler(Database::PostgreSql).insert(&mut stmt),
        Err(CompileError::NullRequired { field, .. }) if field == "version"
    ));
}

#[test]
fn batch_update_binds_each_row() {
    let s = Schema::new();
    let stmt = Update::table(&s.users, "u")
        .set(Assignment::set(s.user("name"), Expr::named("name")))
        .filter(Predicate::eq(Expr::field(s.users.id()), Expr::named("id")));
    let a = ValueRow::new().with("id", 1_i64).with("name", "a");
    let b = ValueRow::new().with("id", 2_i64).with("name", "b");
    let compiler = compiler(Database::H2);

    let compiled = compiler
        .update_batch(&stmt, Visible::OnlyVisible, &[&a, &b])
        .unwrap();
    let batch = compiled.as_batch().expect("batch statement");
    assert_eq!(
        batch.sql(),
        "UPDATE users AS u SET u.name = ?, u.version = u.version + 1 WHERE u.id = ? AND u.visible = TRUE"
    );
    assert_eq!(batch.rows().len(), 2);
    assert_eq!(batch.param_count(), 2);
    assert_eq!(batch.rows()[1][0].value().unwrap(), Value::from("b"));
    assert_eq!(batch.rows()[1][1].value().unwrap(), Value::I64(2));

    assert!(matches!(
        compiler.update(&stmt, Visible::OnlyVisible),
        Err(CompileError::NamedParamInNonBatch { .. })
    ));
    assert!(matches!(
        compiler.update_batch(&s.rename("u"), Visible::OnlyVisible, &[&a]),
        Err(CompileError::NoNamedParamInBatch { .. })
    ));
}

#[test]
fn batch_delete() {
    let s = Schema::new();
    let stmt = Delete::from(&s.users, "u").filter(Predicate::eq(Expr::field(s.users.id()), Expr::named("id")));
    let rows: Vec<ValueRow> = (1..=3_i64).map(|id| ValueRow::new().with("id", id)).collect();
    let refs: Vec<&dyn RowAccessor> = rows.iter().map(|r| r as &dyn RowAccessor).collect();

    let compiled = compiler(Database::Oracle)
        .delete_batch(&stmt, Visible::Both, &refs)
        .unwrap();
    let batch = compiled.as_batch().unwrap();
    assert_eq!(batch.sql(), "DELETE FROM users u WHERE u.id = :1");
    let ids: Vec<Value> = batch.rows().iter().map(|r| r[0].value().unwrap()).collect();
    assert_eq!(ids, vec![Value::I64(1), Value::I64(2), Value::I64(3)]);
}

fn placeholders(db: Database, sql: &str) -> usize {
    let marker = match db {
        Database::PostgreSql => '$',
        Database::Oracle => ':',
        Database::MySql | Database::H2 | Database::Sqlite => '?',
    };
    sql.matches(marker).count()
}

#[test]
fn placeholders_match_params_in_every_dialect() {
    let s = Schema::new();
    let select = Select::from(&s.users, "u")
        .item(Expr::field(s.user("name")), None)
        .filter(Predicate::in_list(
            Expr::field(s.users.id()),
            vec![Expr::value(1_i64), Expr::value(2_i64), Expr::value(3_i64)],
        ))
        .filter(Predicate::like(Expr::field(s.user("name")), "a%"));
    let delete = Delete::from(&s.users, "u").filter(Predicate::between(
        Expr::field(s.users.id()),
        10_i64,
        20_i64,
    ));

    for db in [Database::MySql, Database::PostgreSql, Database::Oracle, Database::H2, Database::Sqlite] {
        let compiler = compiler(db);
        let mut insert = Insert::values(
            &s.users,
            vec![s.user("name").clone(), s.user("nick").clone()],
            vec![vec![Expr::value("a"), Expr::Null], vec![Expr::value("b"), Expr::value("bee")]],
        );
        let compiled = [
            compiler.update(&s.rename("u"), Visible::OnlyVisible).unwrap(),
            compiler.select(&select, Visible::OnlyNonVisible).unwrap(),
            compiler.delete(&delete, Visible::Both).unwrap(),
            compiler.insert(&mut insert).unwrap(),
        ];
        for stmt in &compiled {
            let one = simple(stmt);
            assert_eq!(
                placeholders(db, one.sql()),
                one.params().len(),
                "{db}: {}",
                one.sql()
            );
        }
    }
}
