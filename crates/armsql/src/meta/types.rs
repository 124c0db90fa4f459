use serde::{Deserialize, Serialize};
use std::fmt;

/// Host representation of a column value.
///
/// Managed columns pick their generated value from this: a `version` column of host type
/// `I32` starts at `0i32`, an `OffsetDateTime` updated-at column gets `now` with offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    Bool,
    I16,
    I32,
    I64,
    BigInt,
    Decimal,
    F32,
    F64,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    LocalDateTime,
    OffsetDateTime,
    ZonedDateTime,
    Json,
}

impl HostType {
    /// SQL type used when the field does not name one explicitly.
    pub fn default_mapping(self) -> MappingType {
        match self {
            HostType::Bool => MappingType::Boolean,
            HostType::I16 => MappingType::SmallInt,
            HostType::I32 => MappingType::Integer,
            HostType::I64 => MappingType::BigInt,
            HostType::BigInt | HostType::Decimal => MappingType::Numeric,
            HostType::F32 => MappingType::Real,
            HostType::F64 => MappingType::Double,
            HostType::Text => MappingType::Varchar,
            HostType::Bytes => MappingType::Binary,
            HostType::Uuid => MappingType::Uuid,
            HostType::Date => MappingType::Date,
            HostType::Time => MappingType::Time,
            HostType::LocalDateTime => MappingType::Timestamp,
            HostType::OffsetDateTime | HostType::ZonedDateTime => MappingType::TimestampTz,
            HostType::Json => MappingType::Json,
        }
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            HostType::LocalDateTime | HostType::OffsetDateTime | HostType::ZonedDateTime
        )
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// SQL type of a column, used for literal rendering decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Numeric,
    Real,
    Double,
    Varchar,
    Text,
    Binary,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
}

impl MappingType {
    /// Whether values of this type may be inlined as SQL text.
    ///
    /// Character, binary, and JSON types are always bound: their content is caller controlled.
    pub fn supports_literal(self) -> bool {
        !matches!(
            self,
            MappingType::Varchar | MappingType::Text | MappingType::Binary | MappingType::Json
        )
    }
}

/// How a field may appear in an UPDATE SET clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    #[default]
    Updatable,
    Immutable,
    /// Assignable only while the column is still NULL.
    OnlyIfNull,
    /// Assignable only while the column still holds its default.
    OnlyIfDefault,
}

/// Who supplies the value of a generated field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeneratorKind {
    #[default]
    None,
    /// Supplied by the application before the statement is sent, by the named generator.
    Precede(String),
    /// Supplied by the database after execution (auto-increment, serial).
    Post,
}

/// Role of a field the library manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Plain,
    Id,
    CreateTime,
    UpdateTime,
    Version,
    Visible,
    Discriminator,
}

impl FieldRole {
    /// Managed fields other than the primary key.
    pub fn is_managed(self) -> bool {
        !matches!(self, FieldRole::Plain | FieldRole::Id)
    }
}
