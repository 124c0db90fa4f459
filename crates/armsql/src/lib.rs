//! # armsql
//!
//! The SQL-compilation core of a parent/child-aware object relational mapper.
//!
//! ## Features
//!
//! - **Parameter parity**: every placeholder in the SQL text has exactly one parameter
//! - **Five dialects**: MySQL, PostgreSQL, Oracle, H2, and SQLite, selected once per compiler
//! - **Inheritance**: writes to a child table become one joined statement or a parent-first pair
//! - **Managed columns**: ids, timestamps, version, visible, and discriminator filled on insert
//! - **Injected filters**: visibility, discriminator, and optimistic-lock clauses added for you
//! - **Batches**: named parameters expanded once per row
//!
//! ## Example
//!
//! ```ignore
//! use armsql::*;
//!
//! let user = TableMeta::single("users")
//!     .id(HostType::I64, GeneratorKind::Post)
//!     .version(HostType::I32)
//!     .visible()
//!     .field(FieldDef::new("name", HostType::Text))
//!     .build()?;
//!
//! let compiler = Compiler::new(CompilerConfig::new(Database::MySql))?;
//!
//! // UPDATE users AS u SET u.name = ?, u.version = u.version + 1
//! //   WHERE u.id = ? AND u.visible = TRUE
//! let stmt = Update::table(&user, "u")
//!     .set(Assignment::set(user.field("name").unwrap(), "alice"))
//!     .filter(Predicate::eq(Expr::field(user.id()), 1_i64));
//! let compiled = compiler.update(&stmt, Visible::OnlyVisible)?;
//! ```
//!
//! Compiled statements are plain data ([`Stmt`]); executing them is left to the caller.

pub mod ast;
mod batch;
pub mod compiler;
pub mod config;
pub mod context;
pub mod dialect;
mod dml;
pub mod error;
pub mod generator;
pub mod ident;
pub mod meta;
pub mod row;
pub mod stmt;
pub mod value;

pub use ast::{
    Assignment, BinaryOp, CompareOp, Conflict, Delete, Expr, FieldRef, Insert, InsertSource,
    JoinType, Lock, LockMode, LockWait, OrderItem, Predicate, RowValues, Select, SelectItem,
    SubQuery, TableBlock, TableItem, Update, Values, Visible,
};
pub use compiler::Compiler;
pub use config::CompilerConfig;
pub use context::{LiteralMode, StatementContext};
pub use dialect::{ConflictStyle, Database, Dialect, JoinStyle};
pub use error::{CompileError, CompileResult};
pub use generator::{
    Clock, FieldGenerator, FieldValueGenerator, FixedClock, GeneratorRegistry, ManagedValues,
    SequenceGenerator, SystemClock, UuidGenerator,
};
pub use ident::QuoteMode;
pub use meta::{
    FieldDef, FieldMeta, FieldRole, GeneratorKind, HostType, MappingType, TableBuilder, TableKind,
    TableMeta, UpdateMode,
};
pub use row::{RowAccessor, ValueRow};
pub use stmt::{BatchStmt, DelayedValue, PairStmt, Param, SimpleStmt, Stmt, StmtKind};
pub use value::{FromValue, Value};

#[cfg(feature = "derive")]
pub use armsql_derive::RowAccessor;
