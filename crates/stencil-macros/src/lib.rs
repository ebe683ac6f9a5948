//! Derive macros for Stencil.
//!
//! - [`Record`] - Expose a struct's fields as template properties

mod attrs;
mod derive;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait from `stencil-data`.
///
/// Every named field becomes a property that templates can address by name
/// (`{{Person::Name}}`). Field types must be `Clone` and convertible into
/// `DataValue`; nested structs deriving `Record` qualify, as do `Vec`s of
/// them (which become collections).
///
/// # Attributes
///
/// | Attribute | Level | Description |
/// |-----------|-------|-------------|
/// | `rename_all = "PascalCase"` / `"camelCase"` | struct | Naming rule for all fields |
/// | `rename = "..."` | field | Explicit property name |
/// | `skip` | field | Leave the field out |
///
/// # Generated Code
///
/// 1. `impl Record for T`, matching property names to fields
/// 2. `impl From<T> for DataValue` (non-generic structs only)
///
/// # Example
///
/// ```ignore
/// use stencil_data::{DataSets, DataValue};
/// use stencil_macros::Record;
///
/// #[derive(Clone, Record)]
/// #[record(rename_all = "PascalCase")]
/// struct Person {
///     name: String,
///     age: u32,
///     #[record(skip)]
///     internal_id: u64,
/// }
///
/// let data = DataSets::new().with("P", Person {
///     name: "John".into(),
///     age: 30,
///     internal_id: 7,
/// });
///
/// assert_eq!(data.get("P").and_then(|p| p.path("Age")), Some(DataValue::from(30u32)));
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
