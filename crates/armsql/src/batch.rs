//! Batch expansion of named parameters.
//!
//! A batch template is compiled once; each row then supplies the values of its named
//! parameters by property name. Positional parameters are shared by every row.

use crate::error::{CompileError, CompileResult};
use crate::row::RowAccessor;
use crate::stmt::Param;

/// Expand `template` into one parameter row per accessor row.
pub(crate) fn expand(template: &[Param], rows: &[&dyn RowAccessor]) -> CompileResult<Vec<Vec<Param>>> {
    if rows.is_empty() {
        return Err(CompileError::Config(
            "batch statement has no parameter rows".to_string(),
        ));
    }
    rows.iter().map(|row| expand_row(template, *row)).collect()
}

fn expand_row(template: &[Param], row: &dyn RowAccessor) -> CompileResult<Vec<Param>> {
    template
        .iter()
        .map(|param| match param {
            Param::Named { mapping, name } => Ok(Param::Value {
                mapping: *mapping,
                value: row.get(name)?,
            }),
            other => Ok(other.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MappingType;
    use crate::row::ValueRow;
    use crate::value::Value;

    #[test]
    fn named_params_take_row_values() {
        let template = vec![
            Param::Named {
                mapping: MappingType::Varchar,
                name: "name".to_string(),
            },
            Param::Value {
                mapping: MappingType::Integer,
                value: Value::I32(7),
            },
            Param::Named {
                mapping: MappingType::BigInt,
                name: "id".to_string(),
            },
        ];
        let a = ValueRow::new().with("id", 1i64).with("name", "a");
        let b = ValueRow::new().with("id", 2i64).with("name", "b");
        let rows = expand(&template, &[&a, &b]).unwrap();

        assert_eq!(rows.len(), 2);
        let values: Vec<Value> = rows[1].iter().map(|p| p.value().unwrap()).collect();
        assert_eq!(values, vec![Value::from("b"), Value::I32(7), Value::I64(2)]);
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(expand(&[], &[]).is_err());
    }
}
