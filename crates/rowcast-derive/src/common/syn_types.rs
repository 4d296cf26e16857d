//! Type helper utilities for syn type analysis.

/// Extract `T` from a single-argument generic named `wrapper` (`Field<T>`, `Option<T>`).
fn generic_inner<'a>(ty: &'a syn::Type, wrapper: &str) -> Option<&'a syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

/// Extract the inner type T from `Field<T>` (also `rowcast::Field<T>`).
pub fn field_inner(ty: &syn::Type) -> Option<&syn::Type> {
    generic_inner(ty, "Field")
}

/// Extract the inner type T from `Option<T>`.
pub fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    generic_inner(ty, "Option")
}
