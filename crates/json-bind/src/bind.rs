//! The type-directed binder: projects a [`JsonValue`] tree
//! into a native Rust value, applying the coercion lattice.
//!
//! A type-erased runtime type descriptor has no Rust counterpart:
//! generics here are reified at the call site, so `FromJson` is
//! implemented once per concrete type and the compiler picks the right
//! impl — coercion precedence becomes "which `FromJson` impl exists for
//! `T`" rather than a runtime dispatch chain (see DESIGN.md).

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::error::{Error, Result};
use crate::path::{with_field, with_index, JsonPath};
use crate::value::{JsonValue, Number};

/// Type-directed projection from a [`JsonValue`] to a native instance.
///
/// The `path` parameter is the accumulator from [`crate::path`]; callers
/// at the top level start with an empty path (see [`bind`]), and each
/// nested bind pushes a frame for the duration of the recursive call so
/// errors carry a JSON path breadcrumb back to the caller.
pub trait FromJson: Sized {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self>;
}

/// Binds a parsed [`JsonValue`] to `T`, starting with an empty path.
pub fn bind<T: FromJson>(value: &JsonValue) -> Result<T> {
    let mut path = JsonPath::new();
    T::from_json(value, &mut path)
}

/// Parses `text` and binds it to `T` in one step.
pub fn parse<T: FromJson>(text: &str) -> Result<T> {
    let value = crate::parser::Parser::parse(text)?;
    bind(&value)
}

fn null_to_primitive(path: &JsonPath) -> Error {
    Error::NullToPrimitive { path: path.clone() }
}

fn cannot_bind(value: &JsonValue, target: &'static str, path: &JsonPath) -> Error {
    Error::CannotBind {
        value_kind: value.kind_name(),
        target,
        path: path.clone(),
    }
}

// Raw `JsonValue` target: binding into it is the identity projection,
// so arbitrary-precision numbers and nested containers survive untouched.
impl FromJson for JsonValue {
    fn from_json(value: &JsonValue, _path: &mut JsonPath) -> Result<Self> {
        Ok(value.clone())
    }
}

// Boolean target.
impl FromJson for bool {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Err(null_to_primitive(path)),
            JsonValue::Boolean(b) => Ok(*b),
            JsonValue::Number(n) => Ok(!n.is_zero()),
            JsonValue::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(cannot_bind(value, "boolean", path)),
            },
            _ => Err(cannot_bind(value, "boolean", path)),
        }
    }
}

// Single-character target.
impl FromJson for char {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Err(null_to_primitive(path)),
            JsonValue::String(s) if s.chars().count() == 1 => Ok(s.chars().next().unwrap()),
            JsonValue::Number(n) => n
                .to_string()
                .chars()
                .next()
                .ok_or_else(|| cannot_bind(value, "char", path)),
            _ => Err(cannot_bind(value, "char", path)),
        }
    }
}

/// Rule 7's "From JsonString: re-lex the string as a number and retry."
/// `Number::from_lexeme` trusts its input is already a lexer-validated
/// number lexeme (its own doc comment says so); a string bound from
/// JSON at large is arbitrary caller text, so this actually runs it
/// through the lexer's number grammar first and fails the bind instead
/// of silently falling through to `Number::from_lexeme`'s `0.0` fallback
/// for unparseable text.
fn relex_number(s: &str, path: &JsonPath) -> Result<Number> {
    let tokens = crate::lexer::Lexer::tokenize(s)
        .ok()
        .filter(|tokens| tokens.len() == 2 && tokens[0].kind == crate::lexer::TokenKind::Number)
        .ok_or_else(|| Error::CannotBind {
            value_kind: "string",
            target: "number",
            path: path.clone(),
        })?;
    Ok(Number::from_lexeme(tokens[0].text.as_deref().unwrap_or("")))
}

// Numeric target, narrowing/widening with overflow detection.
macro_rules! impl_int_from_json {
    ($($ty:ty),* $(,)?) => {$(
        impl FromJson for $ty {
            fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
                match value {
                    JsonValue::Null => Err(null_to_primitive(path)),
                    JsonValue::Number(n) => number_to_int(n, path),
                    JsonValue::String(s) => {
                        // "From JsonString: re-lex the string as a number and retry."
                        let relexed = relex_number(s, path)?;
                        number_to_int(&relexed, path)
                    }
                    _ => Err(cannot_bind(value, stringify!($ty), path)),
                }
            }
        }
    )*};
}

fn number_to_int<T>(n: &Number, path: &JsonPath) -> Result<T>
where
    T: TryFrom<i64> + TryFrom<i128>,
{
    match n {
        Number::Int(i) => T::try_from(*i).map_err(|_| Error::NumericOverflow {
            message: format!("{i} does not fit in target integer type"),
            path: path.clone(),
        }),
        Number::BigInt(b) => {
            let as_i128: i128 = b
                .try_into()
                .map_err(|_| Error::NumericOverflow {
                    message: format!("{b} does not fit in target integer type"),
                    path: path.clone(),
                })?;
            T::try_from(as_i128).map_err(|_| Error::NumericOverflow {
                message: format!("{b} does not fit in target integer type"),
                path: path.clone(),
            })
        }
        Number::Float(f) => {
            if f.trunc() != *f {
                return Err(Error::NumericOverflow {
                    message: format!("{f} has a fractional part and cannot bind to an integer"),
                    path: path.clone(),
                });
            }
            T::try_from(*f as i128).map_err(|_| Error::NumericOverflow {
                message: format!("{f} does not fit in target integer type"),
                path: path.clone(),
            })
        }
        Number::BigDecimal(d) => {
            let as_i128 = d
                .to_string()
                .parse::<i128>()
                .map_err(|_| Error::NumericOverflow {
                    message: format!("{d} does not fit in target integer type"),
                    path: path.clone(),
                })?;
            T::try_from(as_i128).map_err(|_| Error::NumericOverflow {
                message: format!("{d} does not fit in target integer type"),
                path: path.clone(),
            })
        }
    }
}

impl_int_from_json!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl FromJson for i128 {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Err(null_to_primitive(path)),
            JsonValue::Number(n) => number_to_int(n, path),
            JsonValue::String(s) => number_to_int(&relex_number(s, path)?, path),
            _ => Err(cannot_bind(value, "i128", path)),
        }
    }
}

impl FromJson for u128 {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        let as_i128 = i128::from_json(value, path)?;
        u128::try_from(as_i128).map_err(|_| Error::NumericOverflow {
            message: format!("{as_i128} does not fit in u128"),
            path: path.clone(),
        })
    }
}

impl FromJson for f64 {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Err(null_to_primitive(path)),
            JsonValue::Number(n) => Ok(number_to_f64(n)),
            JsonValue::String(s) => Ok(number_to_f64(&relex_number(s, path)?)),
            _ => Err(cannot_bind(value, "f64", path)),
        }
    }
}

impl FromJson for f32 {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        f64::from_json(value, path).map(|f| f as f32)
    }
}

fn number_to_f64(n: &Number) -> f64 {
    match n {
        Number::Int(i) => *i as f64,
        Number::BigInt(b) => b.to_string().parse().unwrap_or(f64::NAN),
        Number::Float(f) => *f,
        Number::BigDecimal(d) => d.to_string().parse().unwrap_or(f64::NAN),
    }
}

impl FromJson for BigInt {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Err(null_to_primitive(path)),
            JsonValue::Number(Number::Int(i)) => Ok(BigInt::from(*i)),
            JsonValue::Number(Number::BigInt(b)) => Ok(b.clone()),
            _ => Err(cannot_bind(value, "BigInt", path)),
        }
    }
}

impl FromJson for BigDecimal {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Err(null_to_primitive(path)),
            JsonValue::Number(Number::Float(f)) => {
                BigDecimal::try_from(*f).map_err(|e| Error::NumericOverflow {
                    message: e.to_string(),
                    path: path.clone(),
                })
            }
            JsonValue::Number(Number::BigDecimal(d)) => Ok(d.clone()),
            JsonValue::Number(Number::Int(i)) => Ok(BigDecimal::from(*i)),
            JsonValue::Number(Number::BigInt(b)) => Ok(BigDecimal::from(b.clone())),
            _ => Err(cannot_bind(value, "BigDecimal", path)),
        }
    }
}

// String target.
impl FromJson for String {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Err(null_to_primitive(path)),
            JsonValue::String(s) => Ok(s.clone()),
            JsonValue::Number(n) => Ok(n.to_string()),
            JsonValue::Boolean(b) => Ok(b.to_string()),
            _ => Err(cannot_bind(value, "String", path)),
        }
    }
}

// Sequence target, including single-to-many promotion.
impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(with_index(path, i, |p| T::from_json(item, p))?);
                }
                Ok(out)
            }
            other => Ok(vec![T::from_json(other, path)?]),
        }
    }
}

// A standalone `Option<T>` (not a product field — those get
// presence-vs-nullity handling from the derive macro) maps `JsonNull`
// to `None`: Rust has no separate "present-but-null" marker outside of
// a struct's field map.
impl<T: FromJson> FromJson for Option<T> {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Ok(None),
            other => Ok(Some(T::from_json(other, path)?)),
        }
    }
}

// Mapping target, String keys (the common case: JSON object keys are
// always strings, so `IndexMap<String, V>` is direct).
impl<V: FromJson> FromJson for IndexMap<String, V> {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Object(entries) => {
                let mut out = IndexMap::with_capacity(entries.len());
                for (key, v) in entries {
                    let bound = with_field(path, key, |p| V::from_json(v, p))?;
                    out.insert(key.clone(), bound);
                }
                Ok(out)
            }
            _ => Err(cannot_bind(value, "map", path)),
        }
    }
}

impl<V: FromJson> FromJson for HashMap<String, V> {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        IndexMap::<String, V>::from_json(value, path).map(|m| m.into_iter().collect())
    }
}

impl<V: FromJson> FromJson for BTreeMap<String, V> {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        IndexMap::<String, V>::from_json(value, path).map(|m| m.into_iter().collect())
    }
}

/// Keys that can appear on either side of a non-string-keyed mapping:
/// key-stringify applied in reverse on bind, a JSON object key is a
/// string, decoded back into `K` via the binder's own scalar rules.
pub trait MapKey: Sized + Eq + Hash {
    fn from_key(key: &str) -> Result<Self>;
}

macro_rules! impl_map_key_int {
    ($($ty:ty),* $(,)?) => {$(
        impl MapKey for $ty {
            fn from_key(key: &str) -> Result<Self> {
                let mut path = JsonPath::new();
                <$ty as FromJson>::from_json(&JsonValue::String(key.to_string()), &mut path)
            }
        }
    )*};
}
impl_map_key_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl MapKey for bool {
    fn from_key(key: &str) -> Result<Self> {
        match key {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Error::CannotBind {
                value_kind: "string",
                target: "bool",
                path: JsonPath::new(),
            }),
        }
    }
}

impl MapKey for String {
    fn from_key(key: &str) -> Result<Self> {
        Ok(key.to_string())
    }
}

/// A mapping keyed by a non-string-able-but-stringified type such as
/// `f64` (scenario 7: `stringify(Map.of(3.14, "pi"))`), which can't
/// implement `MapKey`/`Hash`+`Eq` directly. Preserves insertion order
/// like every other mapping in this codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonMap<K, V>(pub Vec<(K, V)>);

impl<V: FromJson> FromJson for JsonMap<f64, V> {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Object(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, v) in entries {
                    let k: f64 = key.parse().map_err(|_| Error::CannotBind {
                        value_kind: "string",
                        target: "f64",
                        path: path.clone(),
                    })?;
                    let bound = with_field(path, key, |p| V::from_json(v, p))?;
                    out.push((k, bound));
                }
                Ok(Self(out))
            }
            _ => Err(cannot_bind(value, "map", path)),
        }
    }
}

/// A byte array, bound from and written as a base64 string (the
/// writer's "byte array" row). Kept as a newtype rather than a
/// direct `impl FromJson for Vec<u8>` because the blanket `Vec<T>`
/// impl above already covers `Vec<u8>` as a JSON array of numbers —
/// Rust's coherence rules don't let both exist for the same type, so
/// callers opt into the base64 scalar form by naming `Bytes` instead of
/// `Vec<u8>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bytes(pub Vec<u8>);

impl FromJson for Bytes {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Err(null_to_primitive(path)),
            JsonValue::String(s) => {
                use base64::Engine;
                base64::engine::general_purpose::STANDARD
                    .decode(s)
                    .map(Self)
                    .map_err(|e| Error::Adapter {
                        message: format!("invalid base64: {e}"),
                        path: path.clone(),
                    })
            }
            _ => Err(cannot_bind(value, "Bytes", path)),
        }
    }
}

/// Rule §4.5.3: a target that should be bound lazily, yielding each
/// element on demand rather than eagerly realizing the whole sequence.
/// This is the only lazy operation the binder performs.
pub struct LazySeq<T> {
    items: std::vec::IntoIter<JsonValue>,
    _marker: PhantomData<T>,
}

impl<T: FromJson> Iterator for LazySeq<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next()?;
        let mut path = JsonPath::new();
        Some(T::from_json(&item, &mut path))
    }
}

/// Builds a [`LazySeq`] from a parsed value, applying the same
/// single-to-many promotion as the eager `Vec<T>` binding.
pub fn bind_lazy<T: FromJson>(value: JsonValue) -> LazySeq<T> {
    let items = match value {
        JsonValue::Array(items) => items,
        other => vec![other],
    };
    LazySeq {
        items: items.into_iter(),
        _marker: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_numbers_binds_to_vec() {
        let v = crate::parser::Parser::parse("[1,2,3]").unwrap();
        let bound: Vec<i32> = bind(&v).unwrap();
        assert_eq!(bound, vec![1, 2, 3]);
    }

    #[test]
    fn non_numeric_string_fails_instead_of_defaulting_to_zero() {
        let v = JsonValue::String("not a number".to_string());
        let err = bind::<i32>(&v).unwrap_err();
        assert!(matches!(err, Error::CannotBind { .. }));
        let err = bind::<f64>(&v).unwrap_err();
        assert!(matches!(err, Error::CannotBind { .. }));
    }

    #[test]
    fn numeric_string_re_lexes_and_binds() {
        let v = JsonValue::String("42".to_string());
        assert_eq!(bind::<i32>(&v).unwrap(), 42);
        let v = JsonValue::String("3.5".to_string());
        assert_eq!(bind::<f64>(&v).unwrap(), 3.5);
    }

    #[test]
    fn null_to_primitive_fails() {
        let v = crate::parser::Parser::parse("null").unwrap();
        let err = bind::<i32>(&v).unwrap_err();
        assert!(matches!(err, Error::NullToPrimitive { .. }));
    }

    #[test]
    fn single_value_promotes_to_one_element_sequence() {
        let v = crate::parser::Parser::parse("\"str\"").unwrap();
        let bound: Vec<String> = bind(&v).unwrap();
        assert_eq!(bound, vec!["str".to_string()]);
    }

    #[test]
    fn raw_object_target_preserves_bigint() {
        let v = crate::parser::Parser::parse("9999999999999999999999999").unwrap();
        let bound: JsonValue = bind(&v).unwrap();
        assert!(matches!(bound, JsonValue::Number(Number::BigInt(_))));
    }

    #[test]
    fn lazy_sequence_materializes_preserving_order_and_kind() {
        let v = crate::parser::Parser::parse(r#"[null,1,"str",true,{"name":"Alice"}]"#).unwrap();
        let bound: Vec<JsonValue> = bind_lazy::<JsonValue>(v).collect::<Result<_>>().unwrap();
        assert_eq!(bound.len(), 5);
        assert_eq!(bound[0], JsonValue::Null);
        assert_eq!(bound[2], JsonValue::String("str".into()));
    }

    #[test]
    fn name_resolution_handles_both_directions() {
        #[derive(json_bind_derive::Json, Debug, PartialEq)]
        struct Person {
            birth_date: String,
        }
        let v = crate::parser::Parser::parse(r#"{"birthDate":"1993-05-15"}"#).unwrap();
        let bound: Person = bind(&v).unwrap();
        assert_eq!(bound.birth_date, "1993-05-15");
    }
}
