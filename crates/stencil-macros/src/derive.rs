//! Implementation of the `#[derive(Record)]` macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use crate::attrs::{parse_container_attrs, parse_field_attrs};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut property_names: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let property = match (attrs.rename, container.rename_all) {
            (Some(name), _) => name,
            (None, Some(rule)) => rule.apply(&field_name.to_string()),
            (None, None) => field_name.to_string().trim_start_matches("r#").to_string(),
        };

        if property_names.contains(&property) {
            return Err(Error::new(
                field.span(),
                format!("duplicate record property name: '{}'", property),
            ));
        }

        field_matches.push(quote! {
            #property => ::std::option::Option::Some(
                ::stencil_data::DataValue::from(::std::clone::Clone::clone(&self.#field_name))
            ),
        });
        property_names.push(property);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let record_impl = quote! {
        impl #impl_generics ::stencil_data::Record for #struct_name #ty_generics #where_clause {
            fn field(&self, name: &str) -> ::std::option::Option<::stencil_data::DataValue> {
                match name {
                    #(#field_matches)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };

    // Generic records need caller-chosen bounds to be wrapped; only plain
    // structs get the conversion.
    let conversion = if input.generics.params.is_empty() {
        quote! {
            impl ::std::convert::From<#struct_name> for ::stencil_data::DataValue {
                fn from(record: #struct_name) -> Self {
                    ::stencil_data::DataValue::record(record)
                }
            }
        }
    } else {
        TokenStream::new()
    };

    Ok(quote! {
        #record_impl
        #conversion
    })
}
