//! `#[derive(BackedEnum)]` implementation
//!
//! Each variant maps to a string or int backing value. The generated impl
//! also submits an `EnumRegistration` so the enum type caster finds the enum
//! without explicit registration.

use crate::common::{orm_metas, str_value};
use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit, Meta, Result, UnOp};

enum BackingLit {
    Str(String),
    Int(i64),
}

impl BackingLit {
    fn to_tokens(&self) -> TokenStream {
        match self {
            BackingLit::Str(s) => quote! { ::rowcast::Backing::Str(#s) },
            BackingLit::Int(i) => quote! { ::rowcast::Backing::Int(#i) },
        }
    }
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(e) => &e.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "BackedEnum can only be derived for enums",
            ));
        }
    };
    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "BackedEnum needs at least one variant",
        ));
    }

    let type_name = match parse_type_name(&input)? {
        Some(type_name) => quote! { #type_name },
        None => {
            let ident = name.to_string();
            quote! { ::core::concat!(::core::module_path!(), "::", #ident) }
        }
    };

    let mut cases = Vec::new();
    for variant in variants {
        if !matches!(&variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "BackedEnum variants must be unit variants (no fields)",
            ));
        }
        let backing = parse_value(variant)?
            .unwrap_or_else(|| BackingLit::Str(variant.ident.to_string().to_snake_case()));
        cases.push((&variant.ident, backing));
    }

    let int_backed = matches!(cases[0].1, BackingLit::Int(_));
    if let Some((ident, _)) = cases
        .iter()
        .find(|(_, b)| matches!(b, BackingLit::Int(_)) != int_backed)
    {
        return Err(syn::Error::new_spanned(
            ident,
            "BackedEnum variants must all be string-backed or all int-backed",
        ));
    }

    let case_entries = cases.iter().map(|(ident, backing)| {
        let variant = ident.to_string();
        let backing = backing.to_tokens();
        quote! { (#variant, #backing) }
    });
    let backing_arms = cases.iter().map(|(ident, backing)| {
        let backing = backing.to_tokens();
        quote! { #name::#ident => #backing, }
    });
    let from_backing_arms = cases.iter().map(|(ident, backing)| {
        let backing = backing.to_tokens();
        quote! { #backing => ::core::option::Option::Some(#name::#ident), }
    });
    let variant_arms = cases.iter().map(|(ident, _)| {
        let variant = ident.to_string();
        quote! { #name::#ident => #variant, }
    });

    Ok(quote! {
        impl ::rowcast::BackedEnum for #name {
            const TYPE_NAME: &'static str = #type_name;
            const CASES: &'static [(&'static str, ::rowcast::Backing)] = &[#(#case_entries),*];

            fn backing(&self) -> ::rowcast::Backing {
                match self {
                    #(#backing_arms)*
                }
            }

            fn from_backing(backing: ::rowcast::Backing) -> ::core::option::Option<Self> {
                match backing {
                    #(#from_backing_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::rowcast::DtoValue for #name {
            const TYPE: ::rowcast::FieldType =
                ::rowcast::FieldType::named(<#name as ::rowcast::BackedEnum>::TYPE_NAME);

            fn to_value(&self) -> ::rowcast::Value {
                let variant = match self {
                    #(#variant_arms)*
                };
                ::rowcast::Value::Enum(::rowcast::EnumValue {
                    type_name: <#name as ::rowcast::BackedEnum>::TYPE_NAME,
                    variant,
                    backing: ::rowcast::BackedEnum::backing(self),
                })
            }

            fn from_value(value: ::rowcast::Value) -> ::rowcast::OrmResult<Self> {
                let type_name = <#name as ::rowcast::BackedEnum>::TYPE_NAME;
                let found = match &value {
                    ::rowcast::Value::Enum(e) if e.type_name == type_name => {
                        <#name as ::rowcast::BackedEnum>::from_backing(e.backing)
                    }
                    ::rowcast::Value::Enum(_) => ::core::option::Option::None,
                    raw => <#name as ::rowcast::BackedEnum>::try_from_value(raw),
                };
                found.ok_or_else(|| {
                    ::rowcast::OrmError::cast(::std::format!(
                        "{} is not a valid value for enum {}",
                        value,
                        type_name
                    ))
                })
            }
        }

        impl ::core::convert::From<#name> for ::rowcast::Value {
            fn from(member: #name) -> Self {
                ::rowcast::DtoValue::to_value(&member)
            }
        }

        ::rowcast::inventory::submit! {
            ::rowcast::EnumRegistration::new(
                <#name as ::rowcast::BackedEnum>::TYPE_NAME,
                <#name as ::rowcast::BackedEnum>::CASES,
            )
        }
    })
}

/// Parse `#[orm(type_name = "...")]` from the enum attributes.
fn parse_type_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut type_name = None;
    for meta in orm_metas(&input.attrs)? {
        match &meta {
            Meta::NameValue(nv) if nv.path.is_ident("type_name") => {
                type_name = Some(str_value(nv)?);
            }
            _ => return Err(syn::Error::new_spanned(meta, "unknown BackedEnum attribute")),
        }
    }
    Ok(type_name)
}

/// Parse `#[orm(value = "...")]` or `#[orm(value = 1)]` from a variant.
fn parse_value(variant: &syn::Variant) -> Result<Option<BackingLit>> {
    let mut value = None;
    for meta in orm_metas(&variant.attrs)? {
        let Meta::NameValue(nv) = &meta else {
            return Err(syn::Error::new_spanned(meta, "expected #[orm(value = ...)]"));
        };
        if !nv.path.is_ident("value") {
            return Err(syn::Error::new_spanned(nv, "unknown BackedEnum variant attribute"));
        }
        value = Some(backing_lit(&nv.value)?);
    }
    Ok(value)
}

fn backing_lit(expr: &Expr) -> Result<BackingLit> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(BackingLit::Str(s.value())),
        Expr::Lit(ExprLit {
            lit: Lit::Int(i), ..
        }) => Ok(BackingLit::Int(i.base10_parse()?)),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => match backing_lit(expr)? {
            BackingLit::Int(i) => Ok(BackingLit::Int(-i)),
            BackingLit::Str(_) => Err(syn::Error::new_spanned(expr, "expected an integer literal")),
        },
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string or integer literal",
        )),
    }
}
