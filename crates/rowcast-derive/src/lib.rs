//! Derive macros for rowcast
//!
//! Provides `#[derive(Dto)]` and `#[derive(BackedEnum)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod backed_enum;
mod common;
mod dto;

/// Derive the `Dto` descriptor for a struct of `Field<T>` properties.
///
/// # Example
///
/// ```ignore
/// use rowcast::{Dto, Field, Value};
///
/// #[derive(Debug, Dto)]
/// #[orm(table = "users")]
/// struct User {
///     id: Field<i64>,
///     #[orm(rename = "createdAt")]
///     created_at: Field<chrono::NaiveDateTime>,
///     email: Field<Option<String>>,
///     #[orm(types = "int|string")]
///     reference: Field<Value>,
///     #[orm(skip)]
///     cached: Vec<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table used when none is given explicitly
/// - `#[orm(rename = "name")]` - Property name seen by name converters and mappings
/// - `#[orm(types = "a|b")]` - Union-typed property; raw values are assigned uncast
/// - `#[orm(skip)]` - Not a mapped property (must implement `Default`)
#[proc_macro_derive(Dto, attributes(orm))]
pub fn derive_dto(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    dto::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `BackedEnum` (and `DtoValue`) for a unit-only enum.
///
/// # Example
///
/// ```ignore
/// use rowcast::BackedEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, BackedEnum)]
/// enum UserStatus {
///     Active,
///     #[orm(value = "disabled")]
///     Inactive,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq, BackedEnum)]
/// #[orm(type_name = "priority")]
/// enum Priority {
///     #[orm(value = 1)]
///     Low,
///     #[orm(value = 2)]
///     High,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(type_name = "name")]` - Type descriptor (default: module path + enum name)
/// - `#[orm(value = "text")]` / `#[orm(value = 1)]` - Backing value (default: snake_case variant name)
#[proc_macro_derive(BackedEnum, attributes(orm))]
pub fn derive_backed_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    backed_enum::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
