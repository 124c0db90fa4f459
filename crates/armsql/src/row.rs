//! Property access on domain rows.
//!
//! Domain inserts and batch statements read (and, for generated values, write) row
//! properties by name through [`RowAccessor`]. Structs get an implementation from
//! `#[derive(RowAccessor)]`; [`ValueRow`] covers dynamically shaped rows.

use crate::error::{CompileError, CompileResult};
use crate::value::Value;
use std::collections::BTreeMap;

/// Read/write a named property of a row object.
pub trait RowAccessor {
    /// Read a property. Unknown properties are an error.
    fn get(&self, property: &str) -> CompileResult<Value>;

    /// Write a property, converting from [`Value`]. Unknown properties are an error.
    fn set(&mut self, property: &str, value: Value) -> CompileResult<()>;
}

impl<R: RowAccessor + ?Sized> RowAccessor for &mut R {
    fn get(&self, property: &str) -> CompileResult<Value> {
        (**self).get(property)
    }

    fn set(&mut self, property: &str, value: Value) -> CompileResult<()> {
        (**self).set(property, value)
    }
}

impl<R: RowAccessor + ?Sized> RowAccessor for Box<R> {
    fn get(&self, property: &str) -> CompileResult<Value> {
        (**self).get(property)
    }

    fn set(&mut self, property: &str, value: Value) -> CompileResult<()> {
        (**self).set(property, value)
    }
}

/// A row keyed by property name. Missing properties read as `NULL`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueRow {
    values: BTreeMap<String, Value>,
}

impl ValueRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(property.into(), value.into());
        self
    }

    /// Borrow a property without cloning.
    pub fn value(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl RowAccessor for ValueRow {
    fn get(&self, property: &str) -> CompileResult<Value> {
        Ok(self.values.get(property).cloned().unwrap_or(Value::Null))
    }

    fn set(&mut self, property: &str, value: Value) -> CompileResult<()> {
        if property.is_empty() {
            return Err(CompileError::conversion(property, "empty property name"));
        }
        self.values.insert(property.to_string(), value);
        Ok(())
    }
}
