//! Name resolution: matches a declared product-type field
//! name against a JSON object's keys under snake_case/camelCase
//! equivalence.
//!
//! JSON producers following a camelCase convention (Java/Kotlin-style
//! field names) are the common case this resolves against; this codec's
//! `#[derive(Json)]` targets are plain Rust structs, whose field names
//! are already snake_case by
//! convention. The three-candidate name-resolution order collapses
//! to: try the field name verbatim, then its camelCase spelling (the
//! common case of JSON produced by a camelCase-convention host), then
//! fall back to scanning every key for one whose own snake_case form
//! matches the field — covering any other camelCase spelling that
//! doesn't happen to equal candidate two.

use indexmap::IndexMap;

use crate::value::JsonValue;

/// Inserts `_` before each ASCII uppercase letter and lowercases it, e.g.
/// `"birthDate"` -> `"birth_date"`.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Strips `_` and uppercases the character that followed it, e.g.
/// `"birth_date"` -> `"birthDate"`.
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Finds the JSON object entry that `field` resolves to, using name
/// resolution precedence: exact match first, then field's camelCase form,
/// then any key whose snake_case form equals `field`. Returns `None` when
/// no candidate is present, letting the caller apply the field's own
/// missing-value default.
pub fn resolve_field<'v>(entries: &'v IndexMap<String, JsonValue>, field: &str) -> Option<&'v JsonValue> {
    if let Some(v) = entries.get(field) {
        return Some(v);
    }
    let camel = to_camel_case(field);
    if camel != field {
        if let Some(v) = entries.get(&camel) {
            return Some(v);
        }
    }
    entries
        .iter()
        .find(|(k, _)| to_snake_case(k) == field)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("birthDate"), "birth_date");
        assert_eq!(to_snake_case("name"), "name");
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(to_camel_case("birth_date"), "birthDate");
        assert_eq!(to_camel_case("name"), "name");
    }

    #[test]
    fn resolves_exact_match_first() {
        let mut entries = IndexMap::new();
        entries.insert("birth_date".to_string(), JsonValue::Null);
        assert!(resolve_field(&entries, "birth_date").is_some());
    }

    #[test]
    fn resolves_camel_case_json_key() {
        let mut entries = IndexMap::new();
        entries.insert("birthDate".to_string(), JsonValue::Null);
        assert!(resolve_field(&entries, "birth_date").is_some());
    }

    #[test]
    fn missing_field_resolves_to_none() {
        let entries = IndexMap::new();
        assert!(resolve_field(&entries, "birth_date").is_none());
    }
}
