use super::field::{FieldDef, FieldMeta};
use super::types::{FieldRole, GeneratorKind, HostType};
use crate::error::{CompileError, CompileResult};
use crate::value::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Default property names of managed fields.
pub const ID: &str = "id";
pub const CREATE_TIME: &str = "create_time";
pub const UPDATE_TIME: &str = "update_time";
pub const VERSION: &str = "version";
pub const VISIBLE: &str = "visible";

/// Position of a table in a two-table inheritance family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// No inheritance.
    Single,
    /// Root of an inheritance family, holds shared and discriminator columns.
    Parent,
    /// Subtype table, shares its primary key value with the parent row.
    Child,
}

/// Read-only description of a table.
#[derive(Debug)]
pub struct TableMeta {
    name: String,
    kind: TableKind,
    fields: Vec<Arc<FieldMeta>>,
    id: Arc<FieldMeta>,
    parent: Option<Arc<TableMeta>>,
    discriminator_value: Option<Value>,
}

impl TableMeta {
    /// Start describing a table without inheritance.
    pub fn single(name: impl Into<String>) -> TableBuilder {
        TableBuilder::new(name.into(), TableKind::Single, None, None)
    }

    /// Start describing the root of an inheritance family.
    ///
    /// `code` is the discriminator value of rows that belong to no subtype.
    pub fn root(name: impl Into<String>, code: impl Into<Value>) -> TableBuilder {
        TableBuilder::new(name.into(), TableKind::Parent, None, Some(code.into()))
    }

    /// Start describing a subtype table of `parent` identified by `code`.
    pub fn child(
        name: impl Into<String>,
        parent: &Arc<TableMeta>,
        code: impl Into<Value>,
    ) -> TableBuilder {
        TableBuilder::new(
            name.into(),
            TableKind::Child,
            Some(parent.clone()),
            Some(code.into()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn is_child(&self) -> bool {
        self.kind == TableKind::Child
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Arc<FieldMeta>] {
        &self.fields
    }

    /// Look up a field by property name.
    pub fn field(&self, name: &str) -> Option<&Arc<FieldMeta>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Whether `field` is declared by this table (not its parent).
    pub fn owns(&self, field: &FieldMeta) -> bool {
        field.table_name() == self.name
    }

    pub fn id(&self) -> &Arc<FieldMeta> {
        &self.id
    }

    /// First field with the given role declared by this table.
    pub fn role(&self, role: FieldRole) -> Option<&Arc<FieldMeta>> {
        self.fields.iter().find(|f| f.role() == role)
    }

    pub fn create_time(&self) -> Option<&Arc<FieldMeta>> {
        self.role(FieldRole::CreateTime)
    }

    pub fn update_time(&self) -> Option<&Arc<FieldMeta>> {
        self.role(FieldRole::UpdateTime)
    }

    pub fn version(&self) -> Option<&Arc<FieldMeta>> {
        self.role(FieldRole::Version)
    }

    pub fn visible(&self) -> Option<&Arc<FieldMeta>> {
        self.role(FieldRole::Visible)
    }

    /// Parent table of a child.
    pub fn parent(&self) -> Option<&Arc<TableMeta>> {
        self.parent.as_ref()
    }

    /// Fixed discriminator code of a parent or child table.
    pub fn discriminator_value(&self) -> Option<&Value> {
        self.discriminator_value.as_ref()
    }

    /// Discriminator column of the inheritance family (declared by the parent).
    pub fn discriminator(&self) -> Option<&Arc<FieldMeta>> {
        match self.kind {
            TableKind::Single => None,
            TableKind::Parent => self.role(FieldRole::Discriminator),
            TableKind::Child => self
                .parent
                .as_ref()
                .and_then(|p| p.role(FieldRole::Discriminator)),
        }
    }

    /// Fields that appear in INSERT column lists.
    pub fn insertable_fields(&self) -> impl Iterator<Item = &Arc<FieldMeta>> {
        self.fields.iter().filter(|f| f.insertable())
    }
}

impl PartialEq for TableMeta {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TableMeta {}

/// Builder for [`TableMeta`].
///
/// # Example
/// ```ignore
/// let user = TableMeta::single("users")
///     .id(HostType::I64, GeneratorKind::Post)
///     .create_time(HostType::LocalDateTime)
///     .update_time(HostType::LocalDateTime)
///     .version(HostType::I32)
///     .visible()
///     .field(FieldDef::new("name", HostType::Text))
///     .build()?;
/// ```
#[must_use]
pub struct TableBuilder {
    name: String,
    kind: TableKind,
    parent: Option<Arc<TableMeta>>,
    discriminator_value: Option<Value>,
    fields: Vec<(FieldDef, FieldRole)>,
}

impl TableBuilder {
    fn new(
        name: String,
        kind: TableKind,
        parent: Option<Arc<TableMeta>>,
        discriminator_value: Option<Value>,
    ) -> Self {
        Self {
            name,
            kind,
            parent,
            discriminator_value,
            fields: Vec::new(),
        }
    }

    /// Primary key named `id`.
    pub fn id(self, host: HostType, generator: GeneratorKind) -> Self {
        let mut def = FieldDef::new(ID, host).immutable();
        def.generator = generator;
        self.managed(def, FieldRole::Id)
    }

    pub fn create_time(self, host: HostType) -> Self {
        self.managed(FieldDef::new(CREATE_TIME, host).immutable(), FieldRole::CreateTime)
    }

    pub fn update_time(self, host: HostType) -> Self {
        self.managed(FieldDef::new(UPDATE_TIME, host), FieldRole::UpdateTime)
    }

    pub fn version(self, host: HostType) -> Self {
        self.managed(FieldDef::new(VERSION, host), FieldRole::Version)
    }

    pub fn visible(self) -> Self {
        self.managed(FieldDef::new(VISIBLE, HostType::Bool), FieldRole::Visible)
    }

    /// Discriminator column of a parent table.
    pub fn discriminator(self, name: impl Into<String>, host: HostType) -> Self {
        self.managed(FieldDef::new(name, host).immutable(), FieldRole::Discriminator)
    }

    /// Add a managed field with a custom definition.
    pub fn managed(mut self, def: FieldDef, role: FieldRole) -> Self {
        self.fields.push((def, role));
        self
    }

    /// Add a plain field.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push((def, FieldRole::Plain));
        self
    }

    pub fn build(self) -> CompileResult<Arc<TableMeta>> {
        let table = self.name;
        let config = |msg: String| CompileError::Config(format!("table '{table}': {msg}"));

        let mut seen = HashSet::new();
        for (def, _) in &self.fields {
            if !seen.insert(def.name.as_str()) {
                return Err(config(format!("duplicate field '{}'", def.name)));
            }
        }

        let roles: Vec<FieldRole> = self.fields.iter().map(|(_, r)| *r).collect();
        let count = |role: FieldRole| roles.iter().filter(|r| **r == role).count();
        if count(FieldRole::Id) != 1 {
            return Err(config("exactly one id field is required".to_string()));
        }
        for role in [
            FieldRole::CreateTime,
            FieldRole::UpdateTime,
            FieldRole::Version,
            FieldRole::Visible,
            FieldRole::Discriminator,
        ] {
            if count(role) > 1 {
                return Err(config(format!("more than one {role:?} field")));
            }
        }

        match self.kind {
            TableKind::Single => {
                if count(FieldRole::Discriminator) > 0 {
                    return Err(config("only a parent table declares a discriminator".into()));
                }
            }
            TableKind::Parent => {
                if count(FieldRole::Discriminator) == 0 {
                    return Err(config("parent table requires a discriminator".into()));
                }
            }
            TableKind::Child => {
                let Some(parent) = &self.parent else {
                    return Err(config("child table requires a parent".into()));
                };
                if parent.kind != TableKind::Parent {
                    return Err(config(format!("'{}' is not a parent table", parent.name)));
                }
                if count(FieldRole::Discriminator) > 0 {
                    return Err(config("child table cannot declare a discriminator".into()));
                }
                let (id, _) = self
                    .fields
                    .iter()
                    .find(|(_, r)| *r == FieldRole::Id)
                    .ok_or_else(|| config("exactly one id field is required".into()))?;
                if id.generator != GeneratorKind::None {
                    return Err(config("child id always equals the parent id".into()));
                }
                if id.host != parent.id().host() {
                    return Err(config("child id host type differs from parent id".into()));
                }
            }
        }

        let fields: Vec<Arc<FieldMeta>> = self
            .fields
            .into_iter()
            .map(|(def, role)| Arc::new(def.build(&table, role)))
            .collect();
        let id = fields
            .iter()
            .find(|f| f.is_id())
            .cloned()
            .ok_or_else(|| config("exactly one id field is required".into()))?;

        Ok(Arc::new(TableMeta {
            name: table,
            kind: self.kind,
            fields,
            id,
            parent: self.parent,
            discriminator_value: self.discriminator_value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::HostType;

    fn animal() -> Arc<TableMeta> {
        TableMeta::root("animal", 0)
            .id(HostType::I64, GeneratorKind::Post)
            .discriminator("kind", HostType::I32)
            .build()
            .unwrap()
    }

    #[test]
    fn child_resolves_discriminator_from_parent() {
        let parent = animal();
        let dog = TableMeta::child("dog", &parent, 1)
            .id(HostType::I64, GeneratorKind::None)
            .field(FieldDef::new("breed", HostType::Text))
            .build()
            .unwrap();
        assert_eq!(dog.discriminator().unwrap().name(), "kind");
        assert_eq!(dog.discriminator_value(), Some(&Value::I32(1)));
        assert!(dog.owns(dog.field("breed").unwrap()));
        assert!(!dog.owns(parent.id()));
    }

    #[test]
    fn child_id_cannot_be_generated() {
        let parent = animal();
        let err = TableMeta::child("dog", &parent, 1)
            .id(HostType::I64, GeneratorKind::Post)
            .build()
            .unwrap_err();
        assert!(matches!(err, CompileError::Config(_)));
    }

    #[test]
    fn parent_requires_discriminator() {
        assert!(
            TableMeta::root("animal", 0)
                .id(HostType::I64, GeneratorKind::Post)
                .build()
                .is_err()
        );
    }

    #[test]
    fn rejects_duplicate_fields() {
        assert!(
            TableMeta::single("users")
                .id(HostType::I64, GeneratorKind::Post)
                .field(FieldDef::new("name", HostType::Text))
                .field(FieldDef::new("name", HostType::Text))
                .build()
                .is_err()
        );
    }
}
