//! Read-only table and column metadata.
//!
//! The compilers never mutate metadata; a [`TableMeta`] is shared as `Arc<TableMeta>` across
//! threads and compilations.

mod field;
mod table;
mod types;

pub use field::{FieldDef, FieldMeta};
pub use table::{
    CREATE_TIME, ID, TableBuilder, TableKind, TableMeta, UPDATE_TIME, VERSION, VISIBLE,
};
pub use types::{FieldRole, GeneratorKind, HostType, MappingType, UpdateMode};
