use super::{Clock, GeneratorRegistry, ManagedValues};
use crate::error::{CompileError, CompileResult};
use crate::meta::{FieldMeta, FieldRole, GeneratorKind, TableKind, TableMeta};
use crate::row::RowAccessor;
use crate::stmt::StmtKind;
use crate::value::Value;
use chrono::{DateTime, FixedOffset};
use tracing::trace;

/// Fills and checks the library-supplied values of an inserted row.
///
/// For a child table the parent's fields are handled first; the row carries both halves and
/// the discriminator takes the child's code.
#[derive(Debug, Clone, Copy)]
pub struct FieldValueGenerator<'a> {
    managed: &'a ManagedValues,
    generators: &'a GeneratorRegistry,
    clock: &'a dyn Clock,
}

impl<'a> FieldValueGenerator<'a> {
    pub fn new(managed: &'a ManagedValues, generators: &'a GeneratorRegistry, clock: &'a dyn Clock) -> Self {
        Self {
            managed,
            generators,
            clock,
        }
    }

    /// Fill every managed or Precede value the row does not already hold.
    ///
    /// The discriminator is always set to the table's code. `visible` is filled only when
    /// `manage_visible` is set. A primary key without generator must be supplied.
    pub fn generate(&self, table: &TableMeta, manage_visible: bool, row: &mut dyn RowAccessor) -> CompileResult<()> {
        let now = self.clock.now();
        let code = table.discriminator_value();
        for half in halves(table) {
            for field in half.fields() {
                if half.kind() == TableKind::Child && field.is_id() {
                    continue;
                }
                let current = row.get(field.name())?;
                if field.role() != FieldRole::Discriminator && !current.is_null() {
                    continue;
                }
                let Some(value) = self.managed_value(field, code, manage_visible, now, &*row)? else {
                    continue;
                };
                trace!(
                    target: "armsql.sql",
                    table = %field.table_name(),
                    field = %field.name(),
                    "generated value"
                );
                row.set(field.name(), value)?;
            }
        }
        Ok(())
    }

    /// Value the library supplies for `field` of a new row, `None` when it supplies nothing.
    ///
    /// `code` is the discriminator of the inserted table. Precede generators may read `row`.
    pub(crate) fn managed_value(
        &self,
        field: &FieldMeta,
        code: Option<&Value>,
        manage_visible: bool,
        now: DateTime<FixedOffset>,
        row: &dyn RowAccessor,
    ) -> CompileResult<Option<Value>> {
        let value = match field.role() {
            FieldRole::Discriminator => match code {
                Some(code) => code.clone(),
                None => return Ok(None),
            },
            FieldRole::Id | FieldRole::Plain => match field.generator() {
                GeneratorKind::Precede(name) => self.precede(field, name, row)?,
                GeneratorKind::None if field.is_id() => return Err(null_required(field)),
                GeneratorKind::None | GeneratorKind::Post => return Ok(None),
            },
            FieldRole::CreateTime | FieldRole::UpdateTime => self.managed.now_for(field, now)?,
            FieldRole::Version => self.managed.zero_for(field)?,
            FieldRole::Visible if manage_visible => Value::Bool(true),
            FieldRole::Visible => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Check a migration row: every managed and non-nullable value present and well typed.
    pub fn validate(&self, table: &TableMeta, row: &dyn RowAccessor) -> CompileResult<()> {
        let code = table.discriminator_value();
        for half in halves(table) {
            for field in half.fields() {
                if half.kind() == TableKind::Child && field.is_id() {
                    continue;
                }
                let value = row.get(field.name())?;
                if value.is_null() {
                    if field.role() != FieldRole::Plain || !field.nullable() {
                        return Err(null_required(field));
                    }
                    continue;
                }
                if !value.matches_host(field.host()) {
                    return Err(CompileError::conversion(
                        field.name(),
                        format!("expected {}, found {}", field.host(), value.type_name()),
                    ));
                }
                if field.role() == FieldRole::Discriminator {
                    if let Some(code) = code.filter(|c| **c != value) {
                        return Err(CompileError::DiscriminatorMismatch {
                            table: table.name().to_string(),
                            expected: code.to_string(),
                            found: value.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn precede(&self, field: &FieldMeta, name: &str, row: &dyn RowAccessor) -> CompileResult<Value> {
        let generator = self
            .generators
            .get(name)
            .ok_or_else(|| CompileError::NoGenerator {
                table: field.table_name().to_string(),
                field: field.name().to_string(),
                generator: name.to_string(),
            })?;
        let value = generator.next(field, row)?;
        if value.is_null() || !value.matches_host(field.host()) {
            return Err(CompileError::GeneratorType {
                table: field.table_name().to_string(),
                field: field.name().to_string(),
                expected: field.host().to_string(),
                found: value.type_name().to_string(),
            });
        }
        Ok(value)
    }
}

/// Parent first, then the table itself.
fn halves(table: &TableMeta) -> impl Iterator<Item = &TableMeta> {
    table.parent().map(|p| p.as_ref()).into_iter().chain(std::iter::once(table))
}

fn null_required(field: &FieldMeta) -> CompileError {
    CompileError::NullRequired {
        kind: StmtKind::Insert,
        table: field.table_name().to_string(),
        field: field.name().to_string(),
    }
}
