//! RowAccessor derive macro implementation

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

#[derive(Debug, Clone, Copy)]
enum RenameAll {
    Snake,
    Camel,
    Pascal,
}

impl RenameAll {
    fn parse(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "snake_case" => Ok(RenameAll::Snake),
            "camelCase" => Ok(RenameAll::Camel),
            "PascalCase" => Ok(RenameAll::Pascal),
            other => Err(syn::Error::new_spanned(
                lit,
                format!("unsupported rename_all rule {other:?}, expected snake_case, camelCase or PascalCase"),
            )),
        }
    }

    fn apply(self, name: &str) -> String {
        match self {
            RenameAll::Snake => name.to_snake_case(),
            RenameAll::Camel => name.to_lower_camel_case(),
            RenameAll::Pascal => name.to_upper_camel_case(),
        }
    }
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
}

fn container_rename_all(input: &DeriveInput) -> Result<Option<RenameAll>> {
    let mut rule = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let lit: LitStr = meta.value()?.parse()?;
                rule = Some(RenameAll::parse(&lit)?);
                Ok(())
            } else {
                Err(meta.error("unknown orm container attribute"))
            }
        })?;
    }
    Ok(rule)
}

fn field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.rename = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown orm field attribute"))
            }
        })?;
    }
    Ok(attrs)
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "RowAccessor can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "RowAccessor can only be derived for structs",
            ));
        }
    };

    let rename_all = container_rename_all(&input)?;
    let mut get_arms = Vec::new();
    let mut set_arms = Vec::new();
    for field in fields {
        let attrs = field_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let rust_name = ident.to_string();
        let property = attrs
            .rename
            .unwrap_or_else(|| rename_all.map_or_else(|| rust_name.clone(), |r| r.apply(&rust_name)));

        get_arms.push(quote! {
            #property => ::core::result::Result::Ok(
                ::armsql::Value::from(::core::clone::Clone::clone(&self.#ident))
            ),
        });
        set_arms.push(quote! {
            #property => {
                self.#ident = <#ty as ::armsql::FromValue>::from_value(value)
                    .map_err(|message| ::armsql::CompileError::conversion(property, message))?;
                ::core::result::Result::Ok(())
            }
        });
    }

    Ok(quote! {
        impl #impl_generics ::armsql::row::RowAccessor for #name #ty_generics #where_clause {
            fn get(&self, property: &str) -> ::armsql::CompileResult<::armsql::Value> {
                match property {
                    #(#get_arms)*
                    _ => ::core::result::Result::Err(
                        ::armsql::CompileError::conversion(property, "unknown property")
                    ),
                }
            }

            fn set(&mut self, property: &str, value: ::armsql::Value) -> ::armsql::CompileResult<()> {
                match property {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(
                        ::armsql::CompileError::conversion(property, "unknown property")
                    ),
                }
            }
        }
    })
}
