use super::*;
use crate::ast::Lock;
use chrono::{FixedOffset, NaiveDate, TimeZone};

fn placeholders(db: Database) -> String {
    let dialect = db.dialect();
    let mut out = String::new();
    for i in 1..=3 {
        if i > 1 {
            out.push(',');
        }
        dialect.write_placeholder(&mut out, i);
    }
    out
}

fn literal(db: Database, mapping: MappingType, value: Value) -> String {
    let mut out = String::new();
    db.dialect().write_literal(&mut out, mapping, &value).unwrap();
    out
}

#[test]
fn placeholder_styles() {
    assert_eq!(placeholders(Database::MySql), "?,?,?");
    assert_eq!(placeholders(Database::H2), "?,?,?");
    assert_eq!(placeholders(Database::PostgreSql), "$1,$2,$3");
    assert_eq!(placeholders(Database::Oracle), ":1,:2,:3");
    assert_eq!(placeholders(Database::Sqlite), "?1,?2,?3");
}

#[test]
fn quote_chars() {
    assert_eq!(Database::MySql.dialect().quote_char(), '`');
    assert_eq!(Database::PostgreSql.dialect().quote_char(), '"');
    assert_eq!(Database::Oracle.dialect().quote_char(), '"');
}

#[test]
fn reserved_words_are_case_insensitive() {
    let mysql = Database::MySql.dialect();
    assert!(mysql.is_reserved("order"));
    assert!(mysql.is_reserved("Key"));
    assert!(!mysql.is_reserved("users"));
    assert!(Database::PostgreSql.dialect().is_reserved("returning"));
    assert!(!Database::MySql.dialect().is_reserved("returning"));
}

#[test]
fn boolean_literals() {
    assert_eq!(literal(Database::PostgreSql, MappingType::Boolean, Value::Bool(true)), "TRUE");
    assert_eq!(literal(Database::Oracle, MappingType::Boolean, Value::Bool(true)), "1");
    assert_eq!(literal(Database::Sqlite, MappingType::Boolean, Value::Bool(false)), "0");
}

#[test]
fn string_literal_escaping() {
    assert_eq!(
        literal(Database::PostgreSql, MappingType::Varchar, Value::from("it's a\\b")),
        "'it''s a\\b'"
    );
    assert_eq!(
        literal(Database::MySql, MappingType::Varchar, Value::from("it's a\\b")),
        "'it''s a\\\\b'"
    );
}

#[test]
fn temporal_literals() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(
        literal(Database::PostgreSql, MappingType::Date, Value::Date(date)),
        "DATE '2024-02-29'"
    );
    assert_eq!(literal(Database::Sqlite, MappingType::Date, Value::Date(date)), "'2024-02-29'");

    let zone = FixedOffset::east_opt(8 * 3600).unwrap();
    let ts = zone.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(
        literal(Database::PostgreSql, MappingType::TimestampTz, Value::OffsetDateTime(ts)),
        "TIMESTAMP WITH TIME ZONE '2024-01-02 03:04:05+08:00'"
    );
    assert_eq!(
        literal(Database::MySql, MappingType::TimestampTz, Value::OffsetDateTime(ts)),
        "TIMESTAMP '2024-01-02 03:04:05+08:00'"
    );
}

#[test]
fn oracle_has_no_time_literal() {
    let time = chrono::NaiveTime::from_hms_opt(1, 2, 3).unwrap();
    let mut out = String::new();
    let err = Database::Oracle
        .dialect()
        .write_literal(&mut out, MappingType::Time, &Value::Time(time))
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn bytes_literals() {
    let bytes = Value::Bytes(vec![0x0a, 0xff]);
    assert_eq!(literal(Database::MySql, MappingType::Binary, bytes.clone()), "X'0aff'");
    assert_eq!(literal(Database::PostgreSql, MappingType::Binary, bytes.clone()), "'\\x0aff'::bytea");
    assert_eq!(literal(Database::Oracle, MappingType::Binary, bytes), "HEXTORAW('0aff')");
}

#[test]
fn non_finite_floats_are_rejected() {
    let mut out = String::new();
    assert!(
        Database::H2
            .dialect()
            .write_literal(&mut out, MappingType::Double, &Value::F64(f64::NAN))
            .is_err()
    );
}

#[test]
fn limit_offset_forms() {
    let render = |db: Database, limit, offset| {
        let mut out = String::new();
        db.dialect().write_limit_offset(&mut out, limit, offset);
        out
    };
    assert_eq!(render(Database::PostgreSql, Some(10), Some(20)), " LIMIT 10 OFFSET 20");
    assert_eq!(render(Database::PostgreSql, None, Some(20)), " OFFSET 20");
    assert_eq!(
        render(Database::MySql, None, Some(5)),
        format!(" LIMIT {} OFFSET 5", u64::MAX)
    );
    assert_eq!(render(Database::Sqlite, None, Some(5)), " LIMIT -1 OFFSET 5");
    assert_eq!(
        render(Database::Oracle, Some(10), Some(20)),
        " OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
    assert_eq!(render(Database::H2, None, None), "");
}

#[test]
fn lock_clauses() {
    let render = |db: Database, lock: Lock| {
        let mut out = String::new();
        db.dialect().write_lock(&mut out, &lock).map(|()| out)
    };
    assert_eq!(render(Database::PostgreSql, Lock::update().skip_locked()).unwrap(), " FOR UPDATE SKIP LOCKED");
    assert_eq!(render(Database::MySql, Lock::share().nowait()).unwrap(), " FOR SHARE NOWAIT");
    assert_eq!(render(Database::Oracle, Lock::update()).unwrap(), " FOR UPDATE");
    assert!(render(Database::Oracle, Lock::share()).unwrap_err().is_unsupported());
    assert!(render(Database::H2, Lock::update().nowait()).is_err());
    assert!(render(Database::Sqlite, Lock::update()).is_err());
}

#[test]
fn capability_matrix() {
    let mysql = Database::MySql.dialect();
    assert!(mysql.supports_multi_table_update());
    assert_eq!(mysql.update_join_style(), JoinStyle::Join);
    assert!(!mysql.supports_row_set_query());
    assert_eq!(mysql.conflict_style(), ConflictStyle::OnDuplicateKey);

    let pg = Database::PostgreSql.dialect();
    assert!(!pg.supports_multi_table_update());
    assert_eq!(pg.delete_join_style(), JoinStyle::From);
    assert!(pg.supports_returning());

    let oracle = Database::Oracle.dialect();
    assert!(!oracle.table_alias_after_as());
    assert!(!oracle.supports_values_statement());
    assert_eq!(oracle.conflict_style(), ConflictStyle::Unsupported);

    let sqlite = Database::Sqlite.dialect();
    assert_eq!(sqlite.update_join_style(), JoinStyle::From);
    assert_eq!(sqlite.delete_join_style(), JoinStyle::Unsupported);
    assert!(!Database::H2.dialect().supports_lateral());
}
