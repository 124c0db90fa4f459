use crate::error::{CompileError, CompileResult};
use crate::meta::{FieldMeta, HostType};
use crate::value::Value;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use std::collections::HashMap;

type NowFn = fn(DateTime<FixedOffset>) -> Value;

/// Lookup tables for managed column values, keyed by host type.
///
/// Timestamps (`create_time`, `update_time`) take the current instant converted to the
/// column's host type; `version` starts at zero of its host type. Host types missing from
/// the tables cannot carry managed values.
#[derive(Debug, Clone)]
pub struct ManagedValues {
    now: HashMap<HostType, NowFn>,
    zero: HashMap<HostType, Value>,
}

impl ManagedValues {
    pub fn new() -> Self {
        let mut now: HashMap<HostType, NowFn> = HashMap::new();
        now.insert(HostType::LocalDateTime, |t| Value::DateTime(t.naive_local()));
        now.insert(HostType::OffsetDateTime, Value::OffsetDateTime);
        now.insert(HostType::ZonedDateTime, Value::ZonedDateTime);

        let zero = HashMap::from([
            (HostType::I16, Value::I16(0)),
            (HostType::I32, Value::I32(0)),
            (HostType::I64, Value::I64(0)),
            (HostType::BigInt, Value::BigInt(Decimal::ZERO)),
        ]);
        Self { now, zero }
    }

    /// `now` as a value of the field's host type.
    pub fn now_for(&self, field: &FieldMeta, now: DateTime<FixedOffset>) -> CompileResult<Value> {
        self.now
            .get(&field.host())
            .map(|f| f(now))
            .ok_or_else(|| unmappable(field))
    }

    /// Initial version value of the field's host type.
    pub fn zero_for(&self, field: &FieldMeta) -> CompileResult<Value> {
        self.zero
            .get(&field.host())
            .cloned()
            .ok_or_else(|| unmappable(field))
    }
}

impl Default for ManagedValues {
    fn default() -> Self {
        Self::new()
    }
}

fn unmappable(field: &FieldMeta) -> CompileError {
    CompileError::UnmappableHostType {
        table: field.table_name().to_string(),
        field: field.name().to_string(),
        host: field.host().to_string(),
    }
}
