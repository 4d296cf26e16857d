//! Property ↔ column name conversion.

/// Maps DTO property names to column names and back.
pub trait NameConverter: Send + Sync {
    fn to_column_name(&self, property: &str) -> String;

    fn to_property_name(&self, column: &str) -> String;
}

/// Uses property names as column names unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl NameConverter for IdentityConverter {
    fn to_column_name(&self, property: &str) -> String {
        property.to_string()
    }

    fn to_property_name(&self, column: &str) -> String {
        column.to_string()
    }
}

/// camelCase properties ↔ snake_case columns.
///
/// `createdAt` ↔ `created_at`. Properties that are already snake_case map to
/// themselves, so plain Rust field names work without renaming.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseConverter;

impl NameConverter for SnakeCaseConverter {
    fn to_column_name(&self, property: &str) -> String {
        let mut out = String::with_capacity(property.len() + 4);
        for ch in property.chars() {
            if ch.is_ascii_uppercase() {
                if !out.is_empty() && !out.ends_with('_') {
                    out.push('_');
                }
                out.push(ch.to_ascii_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }

    fn to_property_name(&self, column: &str) -> String {
        let mut out = String::with_capacity(column.len());
        for (i, segment) in column.split('_').enumerate() {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if i > 0 => {
                    out.push(first.to_ascii_uppercase());
                    out.push_str(chars.as_str());
                }
                Some(_) => out.push_str(segment),
                None => {}
            }
        }
        lowercase_first(out)
    }
}

fn lowercase_first(mut s: String) -> String {
    if let Some(first) = s.chars().next() {
        if first.is_ascii_uppercase() {
            s.replace_range(..1, &first.to_ascii_lowercase().to_string());
        }
    }
    s
}

/// Default table name for a type: `UserProfile` → `user_profiles`.
pub fn table_name_for(short_name: &str) -> String {
    let mut out = String::with_capacity(short_name.len() + 4);
    for (i, ch) in short_name.chars().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
    }
    out.push('s');
    out
}
