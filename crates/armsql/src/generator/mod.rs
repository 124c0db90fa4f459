//! Values the library supplies on insert.
//!
//! - Precede fields (including primary keys) are filled by a named [`FieldGenerator`] before
//!   the statement is sent.
//! - Managed fields (create/update time, version, visible, discriminator) are filled from
//!   [`ManagedValues`] and the [`Clock`].
//! - Post fields are left to the database.
//!
//! Values are written back into the row, so the statement and the caller's object agree.

mod clock;
mod field_values;
mod managed;

pub use clock::{Clock, FixedClock, SystemClock};
pub use field_values::FieldValueGenerator;
pub use managed::ManagedValues;

use crate::error::{CompileError, CompileResult};
use crate::meta::{FieldMeta, HostType};
use crate::row::RowAccessor;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

/// Produces the value of a Precede field.
pub trait FieldGenerator: Send + Sync + fmt::Debug {
    /// Next value for `field`; `row` holds the values known so far.
    fn next(&self, field: &FieldMeta, row: &dyn RowAccessor) -> CompileResult<Value>;
}

/// Random (v4) UUIDs; text fields get the hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl FieldGenerator for UuidGenerator {
    fn next(&self, field: &FieldMeta, _row: &dyn RowAccessor) -> CompileResult<Value> {
        let id = Uuid::new_v4();
        Ok(match field.host() {
            HostType::Text => Value::Text(id.to_string()),
            _ => Value::Uuid(id),
        })
    }
}

/// Process-local increasing integers.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: AtomicI64,
}

impl SequenceGenerator {
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl FieldGenerator for SequenceGenerator {
    fn next(&self, field: &FieldMeta, _row: &dyn RowAccessor) -> CompileResult<Value> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        match field.host() {
            HostType::I32 => i32::try_from(n)
                .map(Value::I32)
                .map_err(|e| CompileError::conversion(field.name(), e.to_string())),
            _ => Ok(Value::I64(n)),
        }
    }
}

/// Named generators available to Precede fields.
#[derive(Debug, Clone, Default)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Arc<dyn FieldGenerator>>,
}

impl GeneratorRegistry {
    /// Registry with no generators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `uuid` registered.
    pub fn with_defaults() -> Self {
        Self::new().register("uuid", UuidGenerator)
    }

    #[must_use]
    pub fn register(mut self, name: impl Into<String>, generator: impl FieldGenerator + 'static) -> Self {
        self.generators.insert(name.into(), Arc::new(generator));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FieldGenerator>> {
        self.generators.get(name)
    }
}

#[cfg(test)]
mod tests;
