//! Helpers shared by the `Dto` and `BackedEnum` derives.

pub mod syn_types;

use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Result, Token};

/// Every `key = value` / bare `key` entry inside `#[orm(...)]` attributes.
pub fn orm_metas(attrs: &[Attribute]) -> Result<Vec<Meta>> {
    let mut out = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let nested = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        out.extend(nested);
    }
    Ok(out)
}

/// String value of `key = "..."`, erroring on any other literal kind.
pub fn str_value(meta: &syn::MetaNameValue) -> Result<String> {
    match &meta.value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}
