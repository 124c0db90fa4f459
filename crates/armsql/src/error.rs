//! Error types for armsql

use crate::stmt::StmtKind;
use thiserror::Error;

/// Result type alias for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised while compiling a statement.
///
/// None of these are retryable: they describe a malformed statement, a dialect gap, a bad
/// value, or a contract violation by the execution layer.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A field does not belong to any table referenced by the statement
    #[error("{kind}: field '{field}' does not belong to table '{table}'")]
    UnknownField {
        kind: StmtKind,
        table: String,
        field: String,
    },

    /// UPDATE/DELETE without any WHERE predicate
    #[error("{kind} on '{table}' has an empty WHERE clause")]
    EmptyWhere { kind: StmtKind, table: String },

    /// UPDATE without any caller assignment
    #[error("{kind} on '{table}' has an empty SET clause")]
    EmptySet { kind: StmtKind, table: String },

    /// Row assignment target/value arity mismatch
    #[error("{kind} on '{table}': {targets} target field(s) but {values} value(s)")]
    SetArity {
        kind: StmtKind,
        table: String,
        targets: usize,
        values: usize,
    },

    /// Caller assigned a field whose value the library manages
    #[error("{kind}: field '{table}.{field}' is managed and cannot be set by the caller")]
    ManagedField {
        kind: StmtKind,
        table: String,
        field: String,
    },

    /// Caller assigned an immutable field
    #[error("{kind}: field '{table}.{field}' is immutable")]
    NonUpdatable {
        kind: StmtKind,
        table: String,
        field: String,
    },

    /// Parent/child split requires a leading primary-key predicate
    #[error("{kind} on child table '{table}': no primary predicate, the first predicate must be a primary key equality")]
    NoPrimaryPredicate { kind: StmtKind, table: String },

    /// Unqualified reference to a table that appears more than once in FROM
    #[error("ambiguous self-join: column '{field}' of table '{table}' needs a table alias")]
    AmbiguousSelfJoin { table: String, field: String },

    /// Two FROM blocks share the same alias
    #[error("duplicate table alias '{alias}'")]
    DuplicateAlias { alias: String },

    /// Lateral sub-query used outside FROM/JOIN
    #[error("lateral sub-query is only allowed directly in FROM/JOIN")]
    LateralOutsideFrom,

    /// Child values-insert row count differs from the parent half
    #[error("insert into child '{table}': {child} child row(s) but {parent} parent row(s)")]
    ChildRowMismatch {
        table: String,
        parent: usize,
        child: usize,
    },

    /// Values/assignment insert into a child table without a parent half
    #[error("insert into child '{table}' requires a parent statement for '{parent}'")]
    MissingParent { table: String, parent: String },

    /// Insert without rows
    #[error("insert into '{table}' has no rows")]
    EmptyInsert { table: String },

    /// Dialect does not support a requested feature
    #[error("{feature} is unsupported by dialect {dialect}")]
    Unsupported {
        dialect: &'static str,
        feature: String,
    },

    /// Migration-mode validation found a required column null
    #[error("{kind}: required field '{table}.{field}' is null")]
    NullRequired {
        kind: StmtKind,
        table: String,
        field: String,
    },

    /// A generator produced a value of the wrong host type
    #[error("generator for '{table}.{field}' returned {found}, expected {expected}")]
    GeneratorType {
        table: String,
        field: String,
        expected: String,
        found: String,
    },

    /// A Precede field has no registered generator
    #[error("no generator '{generator}' registered for '{table}.{field}'")]
    NoGenerator {
        table: String,
        field: String,
        generator: String,
    },

    /// Managed temporal/numeric column with an unsupported host type
    #[error("field '{table}.{field}' has host type {host} which cannot carry a managed value")]
    UnmappableHostType {
        table: String,
        field: String,
        host: String,
    },

    /// Delayed parameter read before its producing statement executed
    #[error("value of '{table}.{field}' is unavailable: statement not yet executed")]
    NotExecuted { table: String, field: String },

    /// Number of harvested ids differs from the number of inserted rows
    #[error("insert into '{table}' produced {expected} row(s) but {found} id(s) were supplied")]
    IdCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// Migration-mode row carries a discriminator that does not match its table
    #[error("'{table}' discriminator must be {expected}, found {found}")]
    DiscriminatorMismatch {
        table: String,
        expected: String,
        found: String,
    },

    /// Delayed parameter resolved more than once
    #[error("value of '{table}.{field}' was already resolved")]
    AlreadyResolved { table: String, field: String },

    /// Named parameter found in a statement finalized as non-batch
    #[error("{kind}: named parameter '{name}' in non-batch statement")]
    NamedParamInNonBatch { kind: StmtKind, name: String },

    /// Batch statement without any named parameter
    #[error("{kind}: batch statement has no named parameter")]
    NoNamedParamInBatch { kind: StmtKind },

    /// Identifier that cannot be rendered safely
    #[error("Invalid identifier: {0}")]
    InvalidIdent(String),

    /// Row accessor conversion failure
    #[error("Conversion error on property '{property}': {message}")]
    Conversion { property: String, message: String },

    /// Malformed configuration
    #[error("Config error: {0}")]
    Config(String),
}

impl CompileError {
    /// Create an unsupported-feature error
    pub fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }

    /// Create a conversion error for a specific property
    pub fn conversion(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-field error
    pub fn unknown_field(kind: StmtKind, table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            kind,
            table: table.into(),
            field: field.into(),
        }
    }

    /// Create a managed-field error
    pub fn managed_field(kind: StmtKind, table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ManagedField {
            kind,
            table: table.into(),
            field: field.into(),
        }
    }

    /// Check if this is a dialect capability gap
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if this is a delayed-value read before execution
    pub fn is_not_executed(&self) -> bool {
        matches!(self, Self::NotExecuted { .. })
    }

    /// Check if this error was raised by migration-mode validation or a generator
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::NullRequired { .. }
                | Self::GeneratorType { .. }
                | Self::NoGenerator { .. }
                | Self::UnmappableHostType { .. }
                | Self::Conversion { .. }
        )
    }
}

impl From<toml::de::Error> for CompileError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
