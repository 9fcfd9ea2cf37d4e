//! The reflective writer: projects a native Rust value
//! into a [`JsonValue`] tree, which is then rendered to text.
//!
//! [`Writer`] threads an in-flight container stack through the
//! recursion, used for cycle detection ("must not
//! stack-overflow or loop forever on a cyclic native value").

use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::bind::{Bytes, JsonMap, MapKey};
use crate::error::{Error, Result};
use crate::path::JsonPath;
use crate::value::{JsonValue, Number};

/// Threaded through a single top-level [`stringify`] call. Carries the
/// identity (raw address) of every container currently being written,
/// so a reference cycle built through `Rc`/`Arc` sharing is rejected
/// instead of recursing forever.
#[derive(Default)]
pub struct Writer {
    in_flight: Vec<usize>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with `ptr`'s address pushed onto the in-flight stack,
    /// failing with [`Error::CycleDetected`] if that address is already
    /// being written higher up the same call chain.
    pub fn guard<T, F>(&mut self, ptr: *const T, f: F) -> Result<JsonValue>
    where
        F: FnOnce(&mut Self) -> Result<JsonValue>,
    {
        let addr = ptr as usize;
        if self.in_flight.contains(&addr) {
            return Err(Error::CycleDetected {
                path: JsonPath::new(),
            });
        }
        self.in_flight.push(addr);
        let result = f(self);
        self.in_flight.pop();
        result
    }
}

/// Type-directed projection from a native instance to a [`JsonValue`].
pub trait ToJson {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue>;
}

/// Serializes `value` to its compact canonical JSON text.
pub fn stringify<T: ToJson>(value: &T) -> Result<String> {
    let mut w = Writer::new();
    let v = value.to_json(&mut w)?;
    Ok(v.to_compact_string())
}

/// Serializes `value` directly to a [`JsonValue`] tree, without
/// flattening to text — used by adapters and by callers that want to
/// keep composing before rendering.
pub fn to_value<T: ToJson>(value: &T) -> Result<JsonValue> {
    let mut w = Writer::new();
    value.to_json(&mut w)
}

impl ToJson for JsonValue {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(self.clone())
    }
}

impl ToJson for bool {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(JsonValue::Boolean(*self))
    }
}

impl ToJson for char {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(JsonValue::String(self.to_string()))
    }
}

macro_rules! impl_int_to_json {
    ($($ty:ty),* $(,)?) => {$(
        impl ToJson for $ty {
            fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
                Ok(JsonValue::Number(Number::Int(*self as i64)))
            }
        }
    )*};
}
impl_int_to_json!(i8, i16, i32, i64, u8, u16, u32, isize);

impl ToJson for usize {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        (*self as u64).to_json(_w)
    }
}

impl ToJson for u64 {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        if let Ok(i) = i64::try_from(*self) {
            Ok(JsonValue::Number(Number::Int(i)))
        } else {
            Ok(JsonValue::Number(Number::BigInt(BigInt::from(*self))))
        }
    }
}

impl ToJson for i128 {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        if let Ok(i) = i64::try_from(*self) {
            Ok(JsonValue::Number(Number::Int(i)))
        } else {
            Ok(JsonValue::Number(Number::BigInt(BigInt::from(*self))))
        }
    }
}

impl ToJson for u128 {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        if let Ok(i) = i64::try_from(*self) {
            Ok(JsonValue::Number(Number::Int(i)))
        } else {
            Ok(JsonValue::Number(Number::BigInt(BigInt::from(*self))))
        }
    }
}

impl ToJson for BigInt {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(JsonValue::Number(Number::BigInt(self.clone())))
    }
}

impl ToJson for BigDecimal {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(JsonValue::Number(Number::BigDecimal(self.clone())))
    }
}

fn float_to_json(f: f64, path: &JsonPath) -> Result<JsonValue> {
    if !f.is_finite() {
        return Err(Error::Adapter {
            message: format!("{f} is not a finite number and has no JSON representation"),
            path: path.clone(),
        });
    }
    Ok(JsonValue::Number(Number::Float(f)))
}

impl ToJson for f64 {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        float_to_json(*self, &JsonPath::new())
    }
}

impl ToJson for f32 {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        float_to_json(*self as f64, &JsonPath::new())
    }
}

impl ToJson for String {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(JsonValue::String(self.clone()))
    }
}

impl ToJson for str {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(JsonValue::String(self.to_string()))
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        w.guard(self.as_ptr(), |w| {
            let mut out = Vec::with_capacity(self.len());
            for item in self {
                out.push(item.to_json(w)?);
            }
            Ok(JsonValue::Array(out))
        })
    }
}

impl<T: ToJson> ToJson for [T] {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        w.guard(self.as_ptr(), |w| {
            let mut out = Vec::with_capacity(self.len());
            for item in self {
                out.push(item.to_json(w)?);
            }
            Ok(JsonValue::Array(out))
        })
    }
}

// An `Optional`-typed field omits itself entirely when empty (field
// order rules); a standalone `Option<T>` outside of product-field context
// has no "omit the key" option available, so `None` writes `null` and
// `Some(v)` writes `v` (mirrors the reverse of the bind-side rule 12
// collapse documented in bind.rs).
impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        match self {
            None => Ok(JsonValue::Null),
            Some(v) => v.to_json(w),
        }
    }
}

impl<V: ToJson> ToJson for BTreeMap<String, V> {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        w.guard(self as *const Self, |w| {
            let mut out = IndexMap::with_capacity(self.len());
            for (k, v) in self {
                out.insert(k.clone(), v.to_json(w)?);
            }
            Ok(JsonValue::Object(out))
        })
    }
}

/// Key-stringify: a non-string map key is rendered as
/// its own scalar writer output, unwrapped back to a bare string rather
/// than a quoted JSON scalar (a boolean key becomes the three-letter
/// object key `true`, not the JSON literal `true`). `String` itself
/// implements `MapKey` as the identity conversion, so these are the only
/// `IndexMap`/`HashMap` impls this crate needs — a separate `String`-keyed
/// specialization would conflict with these generic ones (E0119).
fn stringify_key<K: MapKey + ToJson>(key: &K, w: &mut Writer) -> Result<String> {
    match key.to_json(w)? {
        JsonValue::String(s) => Ok(s),
        other => Ok(other.to_compact_string()),
    }
}

impl<K: MapKey + ToJson, V: ToJson> ToJson for IndexMap<K, V> {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        w.guard(self as *const Self, |w| {
            let mut out = IndexMap::with_capacity(self.len());
            for (k, v) in self {
                let key = stringify_key(k, w)?;
                out.insert(key, v.to_json(w)?);
            }
            Ok(JsonValue::Object(out))
        })
    }
}

impl<K: MapKey + ToJson, V: ToJson> ToJson for HashMap<K, V> {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        w.guard(self as *const Self, |w| {
            let mut out = IndexMap::with_capacity(self.len());
            for (k, v) in self {
                let key = stringify_key(k, w)?;
                out.insert(key, v.to_json(w)?);
            }
            Ok(JsonValue::Object(out))
        })
    }
}

impl ToJson for Bytes {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        use base64::Engine;
        Ok(JsonValue::String(
            base64::engine::general_purpose::STANDARD.encode(&self.0),
        ))
    }
}

impl<V: ToJson> ToJson for JsonMap<f64, V> {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        let mut out = IndexMap::with_capacity(self.0.len());
        for (k, v) in &self.0 {
            out.insert(k.to_string(), v.to_json(w)?);
        }
        Ok(JsonValue::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_round_trip_through_writer() {
        assert_eq!(stringify(&true).unwrap(), "true");
        assert_eq!(stringify(&42i32).unwrap(), "42");
        assert_eq!(stringify(&"hi".to_string()).unwrap(), "\"hi\"");
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let err = stringify(&f64::NAN).unwrap_err();
        assert!(matches!(err, Error::Adapter { .. }));
    }

    #[test]
    fn option_none_writes_null_standalone() {
        let v: Option<i32> = None;
        assert_eq!(stringify(&v).unwrap(), "null");
    }

    #[test]
    fn float_keyed_map_stringifies_keys() {
        let mut m = JsonMap::<f64, String>::default();
        m.0.push((3.14, "pi".to_string()));
        assert_eq!(stringify(&m).unwrap(), r#"{"3.14":"pi"}"#);
    }

    #[test]
    fn sequence_preserves_order() {
        let v = vec![1, 2, 3];
        assert_eq!(stringify(&v).unwrap(), "[1,2,3]");
    }

    #[test]
    fn byte_array_writes_as_base64() {
        let bytes = Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(stringify(&bytes).unwrap(), "\"3q2+7w==\"");
        let v = crate::parser::Parser::parse("\"3q2+7w==\"").unwrap();
        let back: Bytes = crate::bind::bind(&v).unwrap();
        assert_eq!(back, bytes);
    }

    #[test]
    fn string_keyed_map_preserves_insertion_order() {
        let mut m = IndexMap::new();
        m.insert("z".to_string(), 1);
        m.insert("a".to_string(), 2);
        assert_eq!(stringify(&m).unwrap(), r#"{"z":1,"a":2}"#);
    }
}
