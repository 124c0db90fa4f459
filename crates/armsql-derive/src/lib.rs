//! Derive macros for armsql
//!
//! Provides `#[derive(RowAccessor)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod row_accessor;

/// Derive `RowAccessor` for a struct, exposing each field as a named row property.
///
/// Field types must convert into `armsql::Value` (`From<T>`) and back (`FromValue`).
///
/// # Example
///
/// ```ignore
/// use armsql::RowAccessor;
///
/// #[derive(RowAccessor, Default)]
/// struct User {
///     id: Option<i64>,
///     #[orm(rename = "name")]
///     user_name: String,
///     version: Option<i32>,
///     #[orm(skip)]
///     cached: Vec<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(rename_all = "snake_case")]` - Container rule for property names (`snake_case`,
///   `camelCase`, `PascalCase`)
/// - `#[orm(rename = "name")]` - Property name of a field
/// - `#[orm(skip)]` - Not a row property
#[proc_macro_derive(RowAccessor, attributes(orm))]
pub fn derive_row_accessor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    row_accessor::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
