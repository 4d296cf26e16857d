//! `#[derive(Dto)]` implementation

use crate::common::syn_types::{field_inner, option_inner};
use crate::common::{orm_metas, str_value};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Meta, Result};

struct MappedField<'a> {
    ident: &'a syn::Ident,
    property: String,
    inner: &'a syn::Type,
    types: Option<Vec<String>>,
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
    types: Option<Vec<String>>,
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
                    "Dto can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Dto can only be derived for structs",
            ));
        }
    };

    let table = parse_table(&input)?;
    let short_name = name.to_string();

    let mut mapped = Vec::new();
    let mut skipped = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            skipped.push(ident);
            continue;
        }
        let inner = field_inner(&field.ty).ok_or_else(|| {
            syn::Error::new_spanned(
                &field.ty,
                "Dto properties must be `Field<T>`; use #[orm(skip)] for other fields",
            )
        })?;
        if attrs.types.is_some() && !is_value_type(option_inner(inner).unwrap_or(inner)) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "#[orm(types = \"...\")] requires a `Field<Value>` property",
            ));
        }
        mapped.push(MappedField {
            ident,
            property: attrs
                .rename
                .unwrap_or_else(|| ident.unraw().to_string()),
            inner,
            types: attrs.types,
        });
    }

    let table_const = table.map(|table| {
        quote! {
            const TABLE: ::core::option::Option<&'static str> = ::core::option::Option::Some(#table);
        }
    });

    let field_defs = mapped.iter().map(|f| {
        let property = &f.property;
        let inner = f.inner;
        let ty = match &f.types {
            Some(types) => quote! { ::rowcast::FieldType::Union(&[#(#types),*]) },
            None => quote! { <#inner as ::rowcast::DtoValue>::TYPE },
        };
        quote! { ::rowcast::FieldDef::new(#property, #ty) }
    });

    let blank_mapped = mapped.iter().map(|f| {
        let ident = f.ident;
        quote! { #ident: ::rowcast::Field::Unset }
    });
    let blank_skipped = skipped.iter().map(|ident| {
        quote! { #ident: ::core::default::Default::default() }
    });

    let get_arms = mapped.iter().map(|f| {
        let ident = f.ident;
        let property = &f.property;
        let inner = f.inner;
        quote! {
            #property => ::core::option::Option::Some(
                self.#ident.as_ref().map(<#inner as ::rowcast::DtoValue>::to_value)
            ),
        }
    });

    let set_arms = mapped.iter().map(|f| {
        let ident = f.ident;
        let property = &f.property;
        let inner = f.inner;
        quote! {
            #property => {
                self.#ident = ::rowcast::Field::Set(
                    <#inner as ::rowcast::DtoValue>::from_value(value)?
                );
                ::core::result::Result::Ok(())
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::rowcast::Dto for #name #ty_generics #where_clause {
            const SHORT_NAME: &'static str = #short_name;
            #table_const
            const FIELDS: &'static [::rowcast::FieldDef] = &[#(#field_defs),*];

            fn blank() -> Self {
                Self {
                    #(#blank_mapped,)*
                    #(#blank_skipped,)*
                }
            }

            fn get_field(
                &self,
                property: &str,
            ) -> ::core::option::Option<::rowcast::Field<::rowcast::Value>> {
                match property {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_field(
                &mut self,
                property: &str,
                value: ::rowcast::Value,
            ) -> ::rowcast::OrmResult<()> {
                match property {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(
                        ::rowcast::OrmError::unknown_property(#short_name, property)
                    ),
                }
            }
        }
    })
}

fn is_value_type(ty: &syn::Type) -> bool {
    let syn::Type::Path(type_path) = ty else {
        return false;
    };
    type_path
        .path
        .segments
        .last()
        .is_some_and(|seg| seg.ident == "Value")
}

/// Parse `#[orm(table = "...")]` from the struct attributes.
fn parse_table(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for meta in orm_metas(&input.attrs)? {
        match &meta {
            Meta::NameValue(nv) if nv.path.is_ident("table") => table = Some(str_value(nv)?),
            _ => return Err(syn::Error::new_spanned(meta, "unknown Dto attribute")),
        }
    }
    Ok(table)
}

fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for meta in orm_metas(&field.attrs)? {
        match &meta {
            Meta::Path(path) if path.is_ident("skip") => attrs.skip = true,
            Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                attrs.rename = Some(str_value(nv)?);
            }
            Meta::NameValue(nv) if nv.path.is_ident("types") => {
                let types: Vec<String> = str_value(nv)?
                    .split('|')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
                if types.is_empty() {
                    return Err(syn::Error::new_spanned(nv, "types must name at least one type"));
                }
                attrs.types = Some(types);
            }
            _ => return Err(syn::Error::new_spanned(meta, "unknown Dto field attribute")),
        }
    }
    Ok(attrs)
}
