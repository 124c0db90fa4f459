use super::types::{FieldRole, GeneratorKind, HostType, MappingType, UpdateMode};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A column of a table.
///
/// Identity is `(table, name)`; two `FieldMeta` with the same owner and property name compare
/// equal regardless of the rest of their attributes.
#[derive(Debug, Clone)]
pub struct FieldMeta {
    pub(crate) table: String,
    pub(crate) name: String,
    pub(crate) column: String,
    pub(crate) host: HostType,
    pub(crate) mapping: MappingType,
    pub(crate) nullable: bool,
    pub(crate) insertable: bool,
    pub(crate) update_mode: UpdateMode,
    pub(crate) generator: GeneratorKind,
    pub(crate) codec: bool,
    pub(crate) role: FieldRole,
}

impl FieldMeta {
    /// Owning table name.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Property name, the key used with [`RowAccessor`](crate::RowAccessor).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn host(&self) -> HostType {
        self.host
    }

    pub fn mapping(&self) -> MappingType {
        self.mapping
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn insertable(&self) -> bool {
        self.insertable
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }

    pub fn generator(&self) -> &GeneratorKind {
        &self.generator
    }

    /// Encoded fields are never rendered as literals.
    pub fn codec(&self) -> bool {
        self.codec
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn is_id(&self) -> bool {
        self.role == FieldRole::Id
    }

    /// Version, timestamps, visible, and discriminator: never assignable by callers.
    pub fn is_managed(&self) -> bool {
        self.role.is_managed()
    }
}

impl PartialEq for FieldMeta {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.name == other.name
    }
}

impl Eq for FieldMeta {}

impl Hash for FieldMeta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for FieldMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// Builder for a plain column, added to a table with
/// [`TableBuilder::field`](super::TableBuilder::field).
///
/// # Example
/// ```ignore
/// FieldDef::new("nick_name", HostType::Text).nullable().only_if_null()
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct FieldDef {
    pub(crate) name: String,
    pub(crate) column: Option<String>,
    pub(crate) host: HostType,
    pub(crate) mapping: Option<MappingType>,
    pub(crate) nullable: bool,
    pub(crate) insertable: bool,
    pub(crate) update_mode: UpdateMode,
    pub(crate) generator: GeneratorKind,
    pub(crate) codec: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, host: HostType) -> Self {
        Self {
            name: name.into(),
            column: None,
            host,
            mapping: None,
            nullable: false,
            insertable: true,
            update_mode: UpdateMode::Updatable,
            generator: GeneratorKind::None,
            codec: false,
        }
    }

    /// Use a column name different from the property name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Override the SQL type derived from the host type.
    pub fn mapping(mut self, mapping: MappingType) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Exclude the column from INSERT column lists.
    pub fn not_insertable(mut self) -> Self {
        self.insertable = false;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.update_mode = UpdateMode::Immutable;
        self
    }

    pub fn only_if_null(mut self) -> Self {
        self.update_mode = UpdateMode::OnlyIfNull;
        self
    }

    pub fn only_if_default(mut self) -> Self {
        self.update_mode = UpdateMode::OnlyIfDefault;
        self
    }

    /// Fill the value with a named Precede generator when the caller leaves it null.
    pub fn generated_by(mut self, generator: impl Into<String>) -> Self {
        self.generator = GeneratorKind::Precede(generator.into());
        self
    }

    pub fn codec(mut self) -> Self {
        self.codec = true;
        self
    }

    pub(crate) fn build(self, table: &str, role: FieldRole) -> FieldMeta {
        FieldMeta {
            table: table.to_string(),
            column: self.column.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            host: self.host,
            mapping: self.mapping.unwrap_or_else(|| self.host.default_mapping()),
            nullable: self.nullable,
            insertable: self.insertable,
            update_mode: self.update_mode,
            generator: self.generator,
            codec: self.codec,
            role,
        }
    }
}
