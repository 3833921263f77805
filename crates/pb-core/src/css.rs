//! Inline CSS declarations ↔ style maps.
//!
//! Property editors submit free-form declaration text such as
//! `font-size: 14px; color: #333`. Keys are stored camelCase in the style
//! map (`fontSize`) and rendered back to kebab-case for export.

use crate::model::StyleMap;
use serde_json::Value;
use winnow::ascii::space0;
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Malformed declaration text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed declaration at byte {offset}: `{fragment}`")]
pub struct CssParseError {
    pub offset: usize,
    pub fragment: String,
}

/// Parse `name: value; name: value` into `(camelCaseName, value)` pairs.
///
/// Empty declarations (`;;`) are skipped. Values are trimmed but otherwise
/// kept verbatim.
pub fn parse_declarations(input: &str) -> Result<Vec<(String, String)>, CssParseError> {
    let mut rest = input;
    let mut out = Vec::new();

    loop {
        skip_separators(&mut rest);
        if rest.is_empty() {
            break;
        }
        let offset = input.len() - rest.len();
        let (name, value) = parse_declaration
            .parse_next(&mut rest)
            .map_err(|_| CssParseError {
                offset,
                fragment: input[offset..]
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            })?;
        let value = value.trim();
        if value.is_empty() {
            return Err(CssParseError {
                offset,
                fragment: name.to_string(),
            });
        }
        out.push((kebab_to_camel(name), value.to_string()));
    }

    Ok(out)
}

/// Parse declaration text straight into a style map (later keys win).
pub fn to_style_map(input: &str) -> Result<StyleMap, CssParseError> {
    let mut map = StyleMap::new();
    for (key, value) in parse_declarations(input)? {
        map.insert(key, Value::String(value));
    }
    Ok(map)
}

/// Render a style map as inline declaration text (`font-size: 14px; ...`).
///
/// Bare numbers are emitted as-is; `null` values are skipped.
pub fn inline_css(style: &StyleMap) -> String {
    style
        .iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(format!("{}: {}", camel_to_kebab(key), rendered))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn parse_declaration<'a>(input: &mut &'a str) -> ModalResult<(&'a str, &'a str)> {
    let name = parse_property_name.parse_next(input)?;
    let _ = (space0, ':', space0).parse_next(input)?;
    let value = take_till(0.., ';').parse_next(input)?;
    Ok((name, value))
}

fn parse_property_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-').parse_next(input)
}

fn skip_separators(input: &mut &str) {
    *input = input.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
}

/// `font-size` → `fontSize`, `-webkit-line-clamp` → `WebkitLineClamp`.
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, c) in name.chars().enumerate() {
        if c == '-' {
            upper_next = i > 0 || name.len() > 1;
            continue;
        }
        if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `fontSize` → `font-size`, `WebkitLineClamp` → `-webkit-line-clamp`.
pub fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
