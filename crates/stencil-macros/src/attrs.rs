//! Attribute parsing for the Record derive macro.
//!
//! Container attributes: `#[record(rename_all = "...")]`.
//! Field attributes: `#[record(skip)]`, `#[record(rename = "...")]`.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, LitStr, Meta, Result, Token,
};

/// Naming convention applied to every field without an explicit rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// `first_name` becomes `FirstName`.
    PascalCase,
    /// `first_name` becomes `firstName`.
    CamelCase,
}

impl RenameRule {
    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        match s {
            "PascalCase" => Ok(RenameRule::PascalCase),
            "camelCase" => Ok(RenameRule::CamelCase),
            other => Err(Error::new(
                span,
                format!(
                    "unknown rename rule: '{}'. Expected one of: PascalCase, camelCase",
                    other
                ),
            )),
        }
    }

    pub fn apply(self, field: &str) -> String {
        let mut result = String::with_capacity(field.len());
        let mut upper_next = self == RenameRule::PascalCase;

        for c in field.trim_start_matches("r#").chars() {
            if c == '_' {
                upper_next = !result.is_empty();
                continue;
            }
            if upper_next {
                result.extend(c.to_uppercase());
                upper_next = false;
            } else {
                result.push(c);
            }
        }

        result
    }
}

/// Container-level attributes from `#[record(...)]` on the struct.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    pub rename_all: Option<RenameRule>,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    let s = string_literal(&nv.value, "rename_all")?;
                    attr.rename_all = Some(RenameRule::from_str(&s.value(), s.span())?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record container attribute. Expected: rename_all = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone, Default)]
pub struct FieldAttr {
    /// Leave the field out of the record.
    pub skip: bool,
    /// Property name used by templates (default: field name).
    pub rename: Option<String>,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => {
                    attr.skip = true;
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_literal(&nv.value, "rename")?.value());
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

fn string_literal<'a>(expr: &'a syn::Expr, name: &str) -> Result<&'a LitStr> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", name),
        )),
    }
}

/// Extract `#[record(...)]` attributes from a struct.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}

/// Extract `#[record(...)]` attributes from a field.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}
