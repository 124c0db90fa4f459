use super::*;
use crate::meta::{FieldDef, GeneratorKind, TableMeta};
use crate::row::ValueRow;
use chrono::{TimeZone, Utc};

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap().fixed_offset())
}

fn article() -> Arc<crate::meta::TableMeta> {
    TableMeta::single("article")
        .id(HostType::Text, GeneratorKind::Precede("uuid".into()))
        .create_time(HostType::LocalDateTime)
        .update_time(HostType::OffsetDateTime)
        .version(HostType::I32)
        .visible()
        .field(FieldDef::new("title", HostType::Text))
        .build()
        .unwrap()
}

#[test]
fn uuid_generator_follows_host_type() {
    let table = article();
    let row = ValueRow::new();
    let value = UuidGenerator.next(table.id(), &row).unwrap();
    let Value::Text(text) = value else {
        panic!("expected text, got {value:?}");
    };
    assert_eq!(text.len(), 36);
}

#[test]
fn sequence_generator_counts_up() {
    let table = TableMeta::single("t")
        .id(HostType::I32, GeneratorKind::Precede("seq".into()))
        .build()
        .unwrap();
    let seq = SequenceGenerator::starting_at(10);
    let row = ValueRow::new();
    assert_eq!(seq.next(table.id(), &row).unwrap(), Value::I32(10));
    assert_eq!(seq.next(table.id(), &row).unwrap(), Value::I32(11));
}

#[test]
fn registry_lookup() {
    let registry = GeneratorRegistry::with_defaults().register("seq", SequenceGenerator::default());
    assert!(registry.get("uuid").is_some());
    assert!(registry.get("seq").is_some());
    assert!(registry.get("snowflake").is_none());
}

#[test]
fn generate_fills_only_missing_values() {
    let table = article();
    let managed = ManagedValues::new();
    let registry = GeneratorRegistry::with_defaults();
    let clock = clock();
    let generator = FieldValueGenerator::new(&managed, &registry, &clock);

    let mut row = ValueRow::new().with("title", "hello").with("version", 7);
    generator.generate(&table, true, &mut row).unwrap();

    assert!(matches!(row.value("id"), Some(Value::Text(_))));
    assert_eq!(row.value("version"), Some(&Value::I32(7)));
    assert_eq!(row.value("visible"), Some(&Value::Bool(true)));
    assert_eq!(
        row.value("create_time"),
        Some(&Value::DateTime(clock.0.naive_local()))
    );
    assert_eq!(row.value("update_time"), Some(&Value::OffsetDateTime(clock.0)));
}

#[test]
fn visible_left_alone_when_not_managed() {
    let table = article();
    let managed = ManagedValues::new();
    let registry = GeneratorRegistry::with_defaults();
    let clock = clock();
    let generator = FieldValueGenerator::new(&managed, &registry, &clock);

    let mut row = ValueRow::new();
    generator.generate(&table, false, &mut row).unwrap();
    assert_eq!(row.value("visible"), None);
    assert_eq!(row.value("version"), Some(&Value::I32(0)));
}

#[test]
fn missing_generator_is_reported() {
    let table = article();
    let managed = ManagedValues::new();
    let registry = GeneratorRegistry::new();
    let clock = clock();
    let generator = FieldValueGenerator::new(&managed, &registry, &clock);

    let mut row = ValueRow::new();
    assert!(matches!(
        generator.generate(&table, true, &mut row),
        Err(CompileError::NoGenerator { generator, .. }) if generator == "uuid"
    ));
}

#[test]
fn wrong_generator_type_is_reported() {
    let table = TableMeta::single("t")
        .id(HostType::Uuid, GeneratorKind::Precede("seq".into()))
        .build()
        .unwrap();
    let managed = ManagedValues::new();
    let registry = GeneratorRegistry::new().register("seq", SequenceGenerator::default());
    let clock = clock();
    let generator = FieldValueGenerator::new(&managed, &registry, &clock);

    let mut row = ValueRow::new();
    assert!(matches!(
        generator.generate(&table, true, &mut row),
        Err(CompileError::GeneratorType { .. })
    ));
}

#[test]
fn id_without_generator_must_be_supplied() {
    let table = TableMeta::single("t")
        .id(HostType::I64, GeneratorKind::None)
        .build()
        .unwrap();
    let managed = ManagedValues::new();
    let registry = GeneratorRegistry::new();
    let clock = clock();
    let generator = FieldValueGenerator::new(&managed, &registry, &clock);

    let mut row = ValueRow::new();
    assert!(matches!(
        generator.generate(&table, true, &mut row),
        Err(CompileError::NullRequired { .. })
    ));
    let mut row = ValueRow::new().with("id", 5i64);
    generator.generate(&table, true, &mut row).unwrap();
}

#[test]
fn child_rows_take_the_child_code() {
    let animal = TableMeta::root("animal", 0)
        .id(HostType::I64, GeneratorKind::Post)
        .discriminator("kind", HostType::I32)
        .build()
        .unwrap();
    let dog = TableMeta::child("dog", &animal, 2)
        .id(HostType::I64, GeneratorKind::None)
        .field(FieldDef::new("breed", HostType::Text))
        .build()
        .unwrap();
    let managed = ManagedValues::new();
    let registry = GeneratorRegistry::new();
    let clock = clock();
    let generator = FieldValueGenerator::new(&managed, &registry, &clock);

    let mut row = ValueRow::new().with("kind", 9);
    generator.generate(&dog, true, &mut row).unwrap();
    assert_eq!(row.value("kind"), Some(&Value::I32(2)));
    assert_eq!(row.value("id"), None);
}

#[test]
fn validate_checks_migration_rows() {
    let table = article();
    let managed = ManagedValues::new();
    let registry = GeneratorRegistry::new();
    let clock = clock();
    let generator = FieldValueGenerator::new(&managed, &registry, &clock);

    let complete = ValueRow::new()
        .with("id", "a")
        .with("create_time", Value::DateTime(clock.0.naive_local()))
        .with("update_time", clock.0)
        .with("version", 3)
        .with("visible", false)
        .with("title", "t");
    generator.validate(&table, &complete).unwrap();

    let missing = complete.clone().with("version", Value::Null);
    assert!(matches!(
        generator.validate(&table, &missing),
        Err(CompileError::NullRequired { field, .. }) if field == "version"
    ));

    let mistyped = complete.with("version", "three");
    assert!(matches!(
        generator.validate(&table, &mistyped),
        Err(CompileError::Conversion { .. })
    ));
}

#[test]
fn unmappable_managed_host_type() {
    let table = TableMeta::single("t")
        .id(HostType::I64, GeneratorKind::Post)
        .version(HostType::Text)
        .build()
        .unwrap();
    let managed = ManagedValues::new();
    assert!(matches!(
        managed.zero_for(table.version().unwrap()),
        Err(CompileError::UnmappableHostType { .. })
    ));
}
