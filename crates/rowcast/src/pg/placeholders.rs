//! `:name` / `?` placeholders → Postgres `$N`.
//!
//! Placeholders inside string literals, quoted identifiers, dollar-quoted
//! bodies and comments are left alone, as are `::type` casts. A `?` that is
//! meant as a jsonb operator must be avoided in statements run through here.

use crate::error::{OrmError, OrmResult};
use crate::qb::{ParamKey, Params};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Statement text with `$N` placeholders and the values to bind, in order.
#[derive(Debug)]
pub(crate) struct PreparedSql<'a> {
    pub sql: String,
    pub values: Vec<&'a Value>,
}

pub(crate) fn rewrite<'a>(sql: &str, params: &'a Params) -> OrmResult<PreparedSql<'a>> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut out = String::with_capacity(len + 8);
    let mut values: Vec<&'a Value> = Vec::new();
    let mut named: HashMap<&str, usize> = HashMap::new();
    let mut positional = 0usize;
    let mut copied = 0usize;
    let mut i = 0usize;

    while i < len {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b'$' => i = skip_dollar_quoted(bytes, i),
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).is_some_and(|b| is_ident_start(*b)) => {
                let start = i + 1;
                let mut end = start;
                while end < len && is_ident_char(bytes[end]) {
                    end += 1;
                }
                let name = &sql[start..end];
                let index = match named.get(name) {
                    Some(index) => *index,
                    None => {
                        let value = params
                            .get(&ParamKey::Named(name.to_string()))
                            .ok_or_else(|| {
                                OrmError::logic(format!("no value bound for parameter :{name}"))
                            })?;
                        values.push(value);
                        named.insert(name, values.len());
                        values.len()
                    }
                };
                out.push_str(&sql[copied..i]);
                let _ = write!(out, "${index}");
                copied = end;
                i = end;
            }
            b'?' => {
                let value = params
                    .get(&ParamKey::Positional(positional))
                    .ok_or_else(|| {
                        OrmError::logic(format!("no value bound for positional parameter {positional}"))
                    })?;
                positional += 1;
                values.push(value);
                out.push_str(&sql[copied..i]);
                let _ = write!(out, "${}", values.len());
                copied = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    out.push_str(&sql[copied..]);

    Ok(PreparedSql { sql: out, values })
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

// 'it''s' and "a""b": a doubled quote is an escaped quote.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |p| start + p + 1)
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |p| start + 2 + p + 2)
}

// $$ body $$ or $tag$ body $tag$; `$1` style placeholders are passed through.
fn skip_dollar_quoted(bytes: &[u8], start: usize) -> usize {
    let mut end = start + 1;
    while end < bytes.len() && is_ident_char(bytes[end]) {
        end += 1;
    }
    let is_tag = bytes.get(end) == Some(&b'$')
        && bytes
            .get(start + 1)
            .is_some_and(|b| *b == b'$' || is_ident_start(*b));
    if !is_tag {
        return start + 1;
    }
    let tag = &bytes[start..=end];
    let body = end + 1;
    bytes[body..]
        .windows(tag.len())
        .position(|w| w == tag)
        .map_or(bytes.len(), |p| body + p + tag.len())
}
