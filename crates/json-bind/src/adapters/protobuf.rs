//! Protobuf well-known-type adapters, realized on the `protobuf` crate
//! (rust-protobuf v3) rather than `prost`: rust-protobuf's generated
//! types carry plain getter/setter methods and a `MessageField<T>`
//! wrapper that map onto this binder's coercion rules far more directly
//! than prost's `Option<T>`-everywhere generated structs.
//!
//! `google.protobuf.Timestamp`/`Duration` get the same text-form
//! treatment as this crate's own [`super::temporal`] types; `Struct`,
//! `Value`, `ListValue` and `NullValue` map onto [`JsonValue`] almost by
//! definition, since they are protobuf's own reflection of a JSON-like
//! tree. `Any` resolves its `type_url` against the dynamic adapter
//! registry rather than a static `FromJson` impl, since the concrete
//! message type behind an `Any` is only known at the call site.

use protobuf::well_known_types::any::Any;
use protobuf::well_known_types::duration::Duration as ProtoDuration;
use protobuf::well_known_types::r#struct::{
    value::Kind, ListValue as ProtoListValue, NullValue as ProtoNullValue, Struct as ProtoStruct,
    Value as ProtoValue,
};
use protobuf::well_known_types::timestamp::Timestamp;
use protobuf::well_known_types::wrappers::BoolValue;

use super::AdapterRegistry;
use crate::bind::FromJson;
use crate::error::{Error, Result};
use crate::path::{with_field, JsonPath};
use crate::value::{JsonValue, Number};
use crate::write::{ToJson, Writer};

fn invalid(message: impl Into<String>, path: &JsonPath) -> Error {
    Error::InvalidDate {
        message: message.into(),
        path: path.clone(),
    }
}

// google.protobuf.Timestamp: same RFC 3339 text form as `OffsetDateTime`.
impl FromJson for Timestamp {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        let odt = time::OffsetDateTime::from_json(value, path)?;
        Ok(Timestamp {
            seconds: odt.unix_timestamp(),
            nanos: odt.nanosecond() as i32,
            ..Default::default()
        })
    }
}

impl ToJson for Timestamp {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        let odt = time::OffsetDateTime::from_unix_timestamp(self.seconds)
            .map_err(|e| Error::Adapter {
                message: e.to_string(),
                path: JsonPath::new(),
            })?
            .replace_nanosecond(self.nanos as u32)
            .map_err(|e| Error::Adapter {
                message: e.to_string(),
                path: JsonPath::new(),
            })?;
        odt.to_json(w)
    }
}

// google.protobuf.Duration: same ISO-8601 text form as this crate's own
// `adapters::temporal::Duration`.
impl FromJson for ProtoDuration {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        let d = super::temporal::Duration::from_json(value, path)?;
        Ok(ProtoDuration {
            seconds: d.seconds,
            nanos: d.nanos,
            ..Default::default()
        })
    }
}

impl ToJson for ProtoDuration {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        super::temporal::Duration {
            seconds: self.seconds,
            nanos: self.nanos,
        }
        .to_json(w)
    }
}

// google.protobuf.NullValue: a one-constant enum whose only value means
// JSON `null`; binds to the singleton NULL_VALUE.
impl FromJson for ProtoNullValue {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        match value {
            JsonValue::Null => Ok(ProtoNullValue::NULL_VALUE),
            _ => Err(Error::CannotBind {
                value_kind: value.kind_name(),
                target: "google.protobuf.NullValue",
                path: path.clone(),
            }),
        }
    }
}

impl ToJson for ProtoNullValue {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(JsonValue::Null)
    }
}

// google.protobuf.Struct / Value / ListValue / NullValue: protobuf's own
// reflection of a JSON tree, so binding is a structural transcription
// rather than a coercion.
impl FromJson for ProtoStruct {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        let JsonValue::Object(entries) = value else {
            return Err(Error::CannotBind {
                value_kind: value.kind_name(),
                target: "google.protobuf.Struct",
                path: path.clone(),
            });
        };
        let mut out = ProtoStruct::default();
        for (key, v) in entries {
            let bound = with_field(path, key, |p| ProtoValue::from_json(v, p))?;
            out.fields.insert(key.clone(), bound);
        }
        Ok(out)
    }
}

impl ToJson for ProtoStruct {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        let mut out = indexmap::IndexMap::with_capacity(self.fields.len());
        for (k, v) in &self.fields {
            out.insert(k.clone(), v.to_json(w)?);
        }
        Ok(JsonValue::Object(out))
    }
}

impl FromJson for ProtoValue {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        let kind = match value {
            JsonValue::Null => Kind::NullValue(ProtoNullValue::NULL_VALUE.into()),
            JsonValue::Boolean(b) => Kind::BoolValue(*b),
            JsonValue::Number(n) => Kind::NumberValue(match n {
                Number::Int(i) => *i as f64,
                Number::Float(f) => *f,
                Number::BigInt(b) => b.to_string().parse().unwrap_or(f64::NAN),
                Number::BigDecimal(d) => d.to_string().parse().unwrap_or(f64::NAN),
            }),
            JsonValue::String(s) => Kind::StringValue(s.clone()),
            JsonValue::Array(_) => Kind::ListValue(ProtoListValue::from_json(value, path)?),
            JsonValue::Object(_) => Kind::StructValue(ProtoStruct::from_json(value, path)?),
        };
        Ok(ProtoValue {
            kind: Some(kind),
            ..Default::default()
        })
    }
}

impl ToJson for ProtoValue {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        match &self.kind {
            None | Some(Kind::NullValue(_)) => Ok(JsonValue::Null),
            Some(Kind::BoolValue(b)) => Ok(JsonValue::Boolean(*b)),
            Some(Kind::NumberValue(n)) => Ok(JsonValue::Number(Number::Float(*n))),
            Some(Kind::StringValue(s)) => Ok(JsonValue::String(s.clone())),
            Some(Kind::ListValue(l)) => l.to_json(w),
            Some(Kind::StructValue(s)) => s.to_json(w),
        }
    }
}

impl FromJson for ProtoListValue {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        // Rule 1's dedicated case: JSON null targeting a ListValue becomes
        // a single-element list whose one element is a null Value, not a
        // CannotBind failure.
        if let JsonValue::Null = value {
            let mut out = ProtoListValue::default();
            out.values.push(ProtoValue {
                kind: Some(Kind::NullValue(ProtoNullValue::NULL_VALUE.into())),
                ..Default::default()
            });
            return Ok(out);
        }
        let JsonValue::Array(items) = value else {
            return Err(Error::CannotBind {
                value_kind: value.kind_name(),
                target: "google.protobuf.ListValue",
                path: path.clone(),
            });
        };
        let mut out = ProtoListValue::default();
        for (i, item) in items.iter().enumerate() {
            let bound = crate::path::with_index(path, i, |p| ProtoValue::from_json(item, p))?;
            out.values.push(bound);
        }
        Ok(out)
    }
}

impl ToJson for ProtoListValue {
    fn to_json(&self, w: &mut Writer) -> Result<JsonValue> {
        let mut out = Vec::with_capacity(self.values.len());
        for v in &self.values {
            out.push(v.to_json(w)?);
        }
        Ok(JsonValue::Array(out))
    }
}

/// `google.protobuf.Any`: a `type_url` plus opaque encoded bytes. This
/// binder can only round-trip it structurally (`{"@type": ..., "value":
/// base64}`) since resolving the payload to a concrete message requires
/// the caller's own message registry, not this crate's.
impl FromJson for Any {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        let JsonValue::Object(entries) = value else {
            return Err(Error::CannotBind {
                value_kind: value.kind_name(),
                target: "google.protobuf.Any",
                path: path.clone(),
            });
        };
        let type_url = entries
            .get("@type")
            .and_then(|v| if let JsonValue::String(s) = v { Some(s.clone()) } else { None })
            .ok_or_else(|| invalid("Any is missing a string \"@type\" field", path))?;
        let encoded = entries
            .get("value")
            .and_then(|v| if let JsonValue::String(s) = v { Some(s.clone()) } else { None })
            .ok_or_else(|| invalid("Any is missing a string \"value\" field", path))?;
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| invalid(e.to_string(), path))?;
        Ok(Any {
            type_url,
            value: bytes,
            ..Default::default()
        })
    }
}

impl ToJson for Any {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        use base64::Engine;
        let mut out = indexmap::IndexMap::new();
        out.insert("@type".to_string(), JsonValue::String(self.type_url.clone()));
        out.insert(
            "value".to_string(),
            JsonValue::String(base64::engine::general_purpose::STANDARD.encode(&self.value)),
        );
        Ok(JsonValue::Object(out))
    }
}

/// `google.protobuf.BoolValue`/`Int32Value`/`StringValue`/etc. are
/// `MessageField<T>`-wrapped scalars; the adapter is the identity on the
/// wrapped scalar, matching rule 9's "wrapper types unwrap transparently."
/// Bound from a `JsonString` taken literally even though it is narrower
/// than the full boolean-coercion lattice (rule 5) used elsewhere — this
/// wrapper only accepts `"true"`/`"false"`, not `0`/`1` or arbitrary
/// truthy values.
pub fn bool_value_from_json(value: &JsonValue, path: &mut JsonPath) -> Result<bool> {
    match value {
        JsonValue::String(s) if s == "true" => Ok(true),
        JsonValue::String(s) if s == "false" => Ok(false),
        JsonValue::Boolean(b) => Ok(*b),
        _ => Err(Error::CannotBind {
            value_kind: value.kind_name(),
            target: "google.protobuf.BoolValue",
            path: path.clone(),
        }),
    }
}

impl FromJson for BoolValue {
    fn from_json(value: &JsonValue, path: &mut JsonPath) -> Result<Self> {
        Ok(BoolValue {
            value: bool_value_from_json(value, path)?,
            ..Default::default()
        })
    }
}

impl ToJson for BoolValue {
    fn to_json(&self, _w: &mut Writer) -> Result<JsonValue> {
        Ok(JsonValue::Boolean(self.value))
    }
}

/// Registers every protobuf well-known-type adapter's name,
/// for the CLI's `adapters` listing. Only `BoolValue` among the
/// `google.protobuf.*Value` wrapper family gets a dedicated adapter —
/// see DESIGN.md's open item on the others (`Int32Value`, `StringValue`,
/// etc.), which are structurally identical but not separately wired up.
pub(super) fn register_all(reg: &mut AdapterRegistry) {
    reg.register::<Timestamp>("google.protobuf.Timestamp", Timestamp::from_json, |t| {
        t.to_json(&mut Writer::new())
    });
    reg.register::<ProtoDuration>("google.protobuf.Duration", ProtoDuration::from_json, |d| {
        d.to_json(&mut Writer::new())
    });
    reg.register::<ProtoNullValue>("google.protobuf.NullValue", ProtoNullValue::from_json, |n| {
        n.to_json(&mut Writer::new())
    });
    reg.register::<ProtoStruct>("google.protobuf.Struct", ProtoStruct::from_json, |s| {
        s.to_json(&mut Writer::new())
    });
    reg.register::<ProtoValue>("google.protobuf.Value", ProtoValue::from_json, |v| {
        v.to_json(&mut Writer::new())
    });
    reg.register::<ProtoListValue>("google.protobuf.ListValue", ProtoListValue::from_json, |l| {
        l.to_json(&mut Writer::new())
    });
    reg.register::<Any>("google.protobuf.Any", Any::from_json, |a| {
        a.to_json(&mut Writer::new())
    });
    reg.register::<BoolValue>("google.protobuf.BoolValue", BoolValue::from_json, |b| {
        b.to_json(&mut Writer::new())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::to_value;

    #[test]
    fn null_value_binds_from_and_writes_json_null() {
        let v = JsonValue::Null;
        let mut path = JsonPath::new();
        let n = ProtoNullValue::from_json(&v, &mut path).unwrap();
        assert_eq!(n, ProtoNullValue::NULL_VALUE);
        assert_eq!(to_value(&n).unwrap(), JsonValue::Null);
    }

    #[test]
    fn struct_round_trips_nested_object() {
        let v = crate::parser::Parser::parse(r#"{"a":1,"b":{"c":true}}"#).unwrap();
        let mut path = JsonPath::new();
        let s = ProtoStruct::from_json(&v, &mut path).unwrap();
        assert_eq!(to_value(&s).unwrap(), v);
    }

    #[test]
    fn list_value_preserves_order_and_mixed_kinds() {
        let v = crate::parser::Parser::parse(r#"[null,1,"x",true]"#).unwrap();
        let mut path = JsonPath::new();
        let l = ProtoListValue::from_json(&v, &mut path).unwrap();
        assert_eq!(to_value(&l).unwrap(), v);
    }

    #[test]
    fn bool_value_binds_from_string_not_generic_value() {
        // A JSON string "true"/"false" targeting BoolValue binds directly
        // to the bool field, not a generic Value with a bool slot.
        let v = JsonValue::String("true".to_string());
        let mut path = JsonPath::new();
        let b = BoolValue::from_json(&v, &mut path).unwrap();
        assert!(b.value);
    }

    #[test]
    fn any_round_trips_type_url_and_base64_payload() {
        let any = Any {
            type_url: "type.googleapis.com/google.protobuf.Empty".to_string(),
            value: vec![1, 2, 3],
            ..Default::default()
        };
        let v = to_value(&any).unwrap();
        let mut path = JsonPath::new();
        let back = Any::from_json(&v, &mut path).unwrap();
        assert_eq!(back, any);
    }
}
